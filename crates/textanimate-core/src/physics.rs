//! Particle physics for the particle reveal
//!
//! Text is decomposed into swarms of glyph particles that start scattered on
//! a ring around their target and are pulled back by a damped spring.

use std::f64::consts::TAU;

use rand::Rng;
use serde::Serialize;

use crate::host::Size;
use crate::text::GLYPH_ASPECT;

/// Fraction of the remaining distance added to velocity each tick
pub const DEFAULT_ATTRACTION: f64 = 0.08;

/// Velocity retained after each tick
pub const DAMPING: f64 = 0.85;

/// Distance below which a particle counts as arrived
pub const DEFAULT_TOLERANCE: f64 = 2.0;

const EXPLOSION_RADIUS: std::ops::Range<f64> = 50.0..150.0;
const LAUNCH_SPEED: std::ops::Range<f64> = 2.0..7.0;

/// A glyph particle in flight toward its target
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Particle {
    pub x: f64,
    pub y: f64,
    pub target_x: f64,
    pub target_y: f64,
    pub vx: f64,
    pub vy: f64,
    pub glyph: char,
    pub size: f64,
    pub color: String,
}

impl Particle {
    /// Euclidean distance to the target
    #[inline]
    pub fn distance_to_target(&self) -> f64 {
        (self.target_x - self.x).hypot(self.target_y - self.y)
    }
}

/// Particles spawned for each character
///
/// At least one per character, so the total is only approximately the
/// requested count.
pub fn particles_per_char(requested: usize, char_count: usize) -> usize {
    if char_count == 0 {
        return 0;
    }
    (requested / char_count).max(1)
}

/// Decompose text into particles laid out on one centered baseline
pub fn decompose<R: Rng + ?Sized>(
    text: &str,
    surface: Size,
    particle_count: usize,
    particle_size: f64,
    color: &str,
    rng: &mut R,
) -> Vec<Particle> {
    let chars: Vec<char> = text.chars().collect();
    let per_char = particles_per_char(particle_count, chars.len());

    let char_width = particle_size * GLYPH_ASPECT;
    let total_width = chars.len() as f64 * char_width;
    let start_x = (surface.width - total_width) / 2.0;
    let center_y = surface.height / 2.0;

    let mut particles = Vec::with_capacity(chars.len() * per_char);
    for (i, &glyph) in chars.iter().enumerate() {
        let target_x = start_x + i as f64 * char_width;
        let target_y = center_y;

        for _ in 0..per_char {
            let angle = rng.random_range(0.0..TAU);
            let speed = rng.random_range(LAUNCH_SPEED);
            let radius = rng.random_range(EXPLOSION_RADIUS);

            particles.push(Particle {
                x: target_x + angle.cos() * radius,
                y: target_y + angle.sin() * radius,
                target_x,
                target_y,
                vx: angle.cos() * speed,
                vy: angle.sin() * speed,
                glyph,
                size: particle_size,
                color: color.to_string(),
            });
        }
    }
    particles
}

/// Advance one particle by one tick
///
/// Move by the current velocity, then pull toward the target, then damp.
/// Pulling after moving is what makes particles overshoot and settle
/// instead of snapping into place.
#[inline]
pub fn integrate(particle: &mut Particle, attraction: f64) {
    particle.x += particle.vx;
    particle.y += particle.vy;

    let dx = particle.target_x - particle.x;
    let dy = particle.target_y - particle.y;
    particle.vx += dx * attraction;
    particle.vy += dy * attraction;

    particle.vx *= DAMPING;
    particle.vy *= DAMPING;
}

/// True when every particle is within `tolerance` of its target
///
/// An empty batch is settled.
pub fn is_settled(particles: &[Particle], tolerance: f64) -> bool {
    particles.iter().all(|p| p.distance_to_target() < tolerance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn at_rest(x: f64, y: f64, target_x: f64, target_y: f64) -> Particle {
        Particle {
            x,
            y,
            target_x,
            target_y,
            vx: 0.0,
            vy: 0.0,
            glyph: 'a',
            size: 16.0,
            color: "white".into(),
        }
    }

    #[test]
    fn test_particles_per_char() {
        assert_eq!(particles_per_char(100, 5), 20);
        assert_eq!(particles_per_char(3, 10), 1);
        assert_eq!(particles_per_char(0, 4), 1);
        assert_eq!(particles_per_char(100, 0), 0);
    }

    #[test]
    fn test_decompose_counts_and_targets() {
        let mut rng = StdRng::seed_from_u64(1);
        let surface = Size::new(200.0, 40.0);
        let particles = decompose("Hi!", surface, 30, 10.0, "red", &mut rng);
        assert_eq!(particles.len(), 30);

        // Each char gets 10 particles, all sharing one target
        let char_width = 10.0 * GLYPH_ASPECT;
        let start_x = (200.0 - 3.0 * char_width) / 2.0;
        for (i, chunk) in particles.chunks(10).enumerate() {
            for p in chunk {
                assert!((p.target_x - (start_x + i as f64 * char_width)).abs() < 1e-9);
                assert!((p.target_y - 20.0).abs() < 1e-9);
                assert_eq!(p.glyph, "Hi!".chars().nth(i).unwrap());
                assert_eq!(p.color, "red");
            }
        }
    }

    #[test]
    fn test_decompose_scatters_on_ring() {
        let mut rng = StdRng::seed_from_u64(2);
        let particles = decompose("abc", Size::new(100.0, 50.0), 60, 16.0, "red", &mut rng);
        for p in &particles {
            let d = p.distance_to_target();
            assert!((50.0..=150.0).contains(&d), "radius {d}");
            let speed = p.vx.hypot(p.vy);
            assert!((2.0..=7.0).contains(&speed), "speed {speed}");
        }
    }

    #[test]
    fn test_decompose_minimum_one_per_char() {
        let mut rng = StdRng::seed_from_u64(3);
        let particles = decompose("hello world", Size::new(300.0, 30.0), 2, 16.0, "red", &mut rng);
        assert_eq!(particles.len(), 11);
    }

    #[test]
    fn test_decompose_empty_text() {
        let mut rng = StdRng::seed_from_u64(4);
        let particles = decompose("", Size::new(300.0, 30.0), 100, 16.0, "red", &mut rng);
        assert!(particles.is_empty());
        assert!(is_settled(&particles, DEFAULT_TOLERANCE));
    }

    #[test]
    fn test_integrate_order() {
        let mut p = at_rest(0.0, 0.0, 10.0, 0.0);
        p.vx = 1.0;
        integrate(&mut p, 0.1);
        // Moved first, then pulled by (10 - 1) * 0.1, then damped
        assert!((p.x - 1.0).abs() < 1e-9);
        assert!((p.vx - (1.0 + 0.9) * DAMPING).abs() < 1e-9);
    }

    #[test]
    fn test_integrate_converges() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut particles = decompose("converge", Size::new(400.0, 60.0), 80, 16.0, "red", &mut rng);
        let mut ticks = 0;
        while !is_settled(&particles, DEFAULT_TOLERANCE) {
            for p in particles.iter_mut() {
                integrate(p, DEFAULT_ATTRACTION);
            }
            ticks += 1;
            assert!(ticks < 1000, "particles never settled");
        }

        // Once settled the swarm stays settled
        for _ in 0..200 {
            for p in particles.iter_mut() {
                integrate(p, DEFAULT_ATTRACTION);
            }
        }
        assert!(is_settled(&particles, DEFAULT_TOLERANCE));
    }

    #[test]
    fn test_integrate_overshoots() {
        let mut p = at_rest(0.0, 0.0, 100.0, 0.0);
        let mut max_x = f64::MIN;
        for _ in 0..200 {
            integrate(&mut p, DEFAULT_ATTRACTION);
            max_x = max_x.max(p.x);
        }
        assert!(max_x > 100.0, "expected overshoot past target");
        assert!(p.distance_to_target() < DEFAULT_TOLERANCE);
    }

    #[test]
    fn test_is_settled_single_counterexample() {
        let mut particles = vec![
            at_rest(0.0, 0.0, 0.5, 0.5),
            at_rest(10.0, 10.0, 10.0, 11.0),
            at_rest(3.0, 3.0, 3.0, 3.0),
        ];
        assert!(is_settled(&particles, DEFAULT_TOLERANCE));

        particles.push(at_rest(0.0, 0.0, 2.0, 0.0));
        assert!(!is_settled(&particles, DEFAULT_TOLERANCE));
    }
}
