//! Particle reassembly driven by the physics engine

use std::time::Duration;

use rand::rngs::StdRng;
use tracing::{debug, trace, warn};

use super::{rng_for, Completion, Renderer, Visual};
use crate::handles::HandleSet;
use crate::host::{Host, Size, Wakeup};
use crate::physics::{decompose, integrate, is_settled, Particle, DEFAULT_ATTRACTION, DEFAULT_TOLERANCE};
use crate::request::{AnimationKind, AnimationRequest, ParticleParams};

/// Color used when the request leaves it to the host
pub const INHERIT_COLOR: &str = "currentColor";

#[derive(Debug)]
pub struct ParticleRenderer {
    text: String,
    bounds: Size,
    delay: Duration,
    params: ParticleParams,
    particles: Vec<Particle>,
    frames: u64,
    revealed: bool,
    settled: bool,
    rng: StdRng,
    handles: HandleSet,
    completion: Completion,
}

impl ParticleRenderer {
    pub fn new(request: &AnimationRequest, bounds: Size) -> Self {
        Self {
            text: request.text.clone(),
            bounds,
            delay: request.delay(),
            params: request.particle.clone(),
            particles: Vec::new(),
            frames: 0,
            revealed: false,
            settled: false,
            rng: rng_for(request.seed),
            handles: HandleSet::new(),
            completion: Completion::new(request.on_complete.clone()),
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Frames simulated so far
    pub fn frames(&self) -> u64 {
        self.frames
    }

    fn spawn(&mut self, host: &mut dyn Host) {
        let color = self.params.color.as_deref().unwrap_or(INHERIT_COLOR);
        self.particles = decompose(
            &self.text,
            self.bounds,
            self.params.count,
            self.params.size,
            color,
            &mut self.rng,
        );
        debug!(particles = self.particles.len(), "Particles spawned");
        self.handles.frame(host);
    }

    fn step(&mut self, host: &mut dyn Host) {
        let Some(surface) = self.handles.surface() else {
            return;
        };
        self.frames += 1;

        host.clear_surface(surface);
        for particle in &mut self.particles {
            integrate(particle, DEFAULT_ATTRACTION);
        }
        for particle in &self.particles {
            host.draw_particle(surface, particle);
        }

        if is_settled(&self.particles, DEFAULT_TOLERANCE) {
            self.settle(host);
        } else {
            trace!(frame = self.frames, "Particles in flight");
            self.handles.frame(host);
        }
    }

    fn settle(&mut self, host: &mut dyn Host) {
        debug!(frames = self.frames, "Particles settled");
        self.settled = true;
        self.revealed = true;
        self.particles.clear();
        self.completion.fire_once();
        self.handles.remove_surface(host);
    }
}

impl Renderer for ParticleRenderer {
    fn kind(&self) -> AnimationKind {
        AnimationKind::Particle
    }

    fn start(&mut self, host: &mut dyn Host) {
        if self.text.is_empty() {
            self.settled = true;
            self.revealed = true;
            self.completion.fire_once();
            return;
        }

        match host.create_surface(self.bounds) {
            Some(surface) => self.handles.attach_surface(surface),
            None => {
                warn!("No drawing context for particle surface, showing plain text");
                self.revealed = true;
                return;
            }
        }
        self.handles.timeout(host, self.delay);
    }

    fn on_wakeup(&mut self, wakeup: Wakeup, host: &mut dyn Host) -> bool {
        match wakeup {
            Wakeup::Timer(id) if self.handles.claim_timer(id) => self.spawn(host),
            Wakeup::Frame(id) if self.handles.claim_frame(id) => self.step(host),
            _ => return false,
        }
        true
    }

    fn visual(&self) -> Visual {
        Visual::Particles {
            text: self.text.clone(),
            surface: self.handles.surface(),
            revealed: self.revealed,
        }
    }

    fn is_complete(&self) -> bool {
        self.settled
    }

    fn teardown(&mut self, host: &mut dyn Host) {
        self.particles.clear();
        self.handles.release(host);
    }
}
