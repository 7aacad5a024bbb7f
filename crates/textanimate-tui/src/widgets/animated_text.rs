use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{canvas::Canvas, Paragraph},
    Frame,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use textanimate_core::render::Cursor;
use textanimate_core::Visual;

use crate::app::App;
use crate::interpolate::{cell_effect, sample, Visibility};
use crate::theme::parse_color;

pub struct AnimatedTextWidget;

impl AnimatedTextWidget {
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let theme = &app.theme;
        let normal = Style::default().fg(theme.fg0);
        let (x, y) = app.text_origin();

        match app.view() {
            Visual::Plain { text } => {
                render_line(frame, area, x, y, vec![Span::styled(text, normal)]);
            }
            Visual::Text { text, cursor } => {
                let x = if app.request().reverse {
                    x + (app.request().text.width() as i32 - text.width() as i32).max(0)
                } else {
                    x
                };
                let mut spans = vec![Span::styled(text, normal)];
                if let Some(Cursor { glyph, visible: true }) = cursor {
                    spans.push(Span::styled(glyph.to_string(), Style::default().fg(theme.accent)));
                }
                render_line(frame, area, x, y, spans);
            }
            Visual::Morph { text, fading, .. } => {
                let x = area.x as i32 + (area.width as i32 - text.width() as i32).max(0) / 2;
                let (y, style) = if fading {
                    (y - 1, Style::default().fg(theme.grey0).add_modifier(Modifier::DIM))
                } else {
                    (y, normal)
                };
                render_line(frame, area, x, y, vec![Span::styled(text, style)]);
            }
            Visual::Particles { text, revealed: true, .. } => {
                render_line(frame, area, x, y, vec![Span::styled(text, normal)]);
            }
            Visual::Particles { surface, .. } => {
                let Some(surface) = surface.and_then(|id| app.runtime.surface(id)) else {
                    return;
                };
                let (_, cell_h) = app.cell_size();
                let width = surface.size.width;
                let height = surface.size.height;
                let shift = app.scroll as f64 * cell_h;
                let fallback = theme.fg0;
                let canvas = Canvas::default()
                    .x_bounds([0.0, width])
                    .y_bounds([0.0, height])
                    .paint(move |ctx| {
                        for g in &surface.glyphs {
                            let color = parse_color(&g.color).unwrap_or(fallback);
                            let span = Span::styled(g.glyph.to_string(), Style::default().fg(color));
                            ctx.print(g.x, height - (g.y + shift), span);
                        }
                    });
                frame.render_widget(canvas, area);
            }
            Visual::Timeline { started_at_ms, units } => {
                let elapsed = app.now_ms() - started_at_ms;
                let dim = Style::default().fg(theme.grey0).add_modifier(Modifier::DIM);
                let buf = frame.buffer_mut();
                let mut col = 0i32;
                for unit in &units {
                    let cell_x = x + col;
                    col += unit.glyph.width().unwrap_or(0) as i32;

                    let effect = cell_effect(&sample(unit, elapsed));
                    let style = match effect.visibility {
                        Visibility::Hidden => continue,
                        Visibility::Dim => dim,
                        Visibility::Normal => normal,
                    };
                    let (cx, cy) = (cell_x + effect.dx as i32, y + effect.dy as i32);
                    if contains(area, cx, cy) {
                        buf.set_string(cx as u16, cy as u16, unit.glyph.to_string(), style);
                    }
                }
            }
        }
    }
}

fn contains(area: Rect, x: i32, y: i32) -> bool {
    x >= area.x as i32 && x < area.right() as i32 && y >= area.y as i32 && y < area.bottom() as i32
}

/// Draw one row of spans starting at column `x`, clipped to `area`
fn render_line(frame: &mut Frame, area: Rect, x: i32, y: i32, mut spans: Vec<Span<'static>>) {
    if y < area.y as i32 || y >= area.bottom() as i32 {
        return;
    }
    let pad = (x - area.x as i32).max(0) as usize;
    spans.insert(0, Span::raw(" ".repeat(pad)));
    let row = Rect {
        y: y as u16,
        height: 1,
        ..area
    };
    frame.render_widget(Paragraph::new(Line::from(spans)), row);
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use ratatui::{backend::TestBackend, Terminal};
    use textanimate_core::{AnimationKind, AnimationRequest, AppConfig};

    use super::*;
    use crate::theme::Theme;

    fn app(request: AnimationRequest) -> App {
        let mut app = App::new(request, AppConfig::default(), Theme::default());
        app.resize(Rect::new(0, 0, 20, 6));
        app.mount();
        app
    }

    fn draw(app: &App) -> Vec<String> {
        let mut terminal = Terminal::new(TestBackend::new(20, 5)).unwrap();
        terminal
            .draw(|f| AnimatedTextWidget::render(f, f.area(), app))
            .unwrap();
        let buffer = terminal.backend().buffer();
        buffer
            .content
            .chunks(buffer.area.width as usize)
            .map(|row| row.iter().map(|c| c.symbol()).collect::<String>())
            .collect()
    }

    #[test]
    fn test_plain_text_is_centered() {
        let mut app = app(AnimationRequest::new("hello", AnimationKind::Typewriter));
        app.shutdown();
        let rows = draw(&app);
        assert_eq!(rows[2], "       hello        ");
    }

    #[test]
    fn test_typewriter_shows_prefix_and_cursor() {
        let mut app = app(AnimationRequest::new("hello", AnimationKind::Typewriter).duration_ms(500));
        app.advance(Duration::from_millis(0));
        let rows = draw(&app);
        assert_eq!(rows[2], "       h|           ");
    }

    #[test]
    fn test_fade_in_hides_characters_before_their_delay() {
        let mut app = app(
            AnimationRequest::new("abc", AnimationKind::FadeIn)
                .duration_ms(100)
                .stagger_ms(1000),
        );
        app.advance(Duration::from_millis(500));
        let rows = draw(&app);
        assert_eq!(rows[2].trim(), "a");

        app.advance(Duration::from_millis(2500));
        let rows = draw(&app);
        assert_eq!(rows[2].trim(), "abc");
    }

    #[test]
    fn test_text_scrolled_out_of_view_is_not_drawn() {
        let mut app = app(AnimationRequest::new("gone", AnimationKind::Scramble));
        app.shutdown();
        app.scroll = 5;
        let rows = draw(&app);
        assert!(rows.iter().all(|r| r.trim().is_empty()));
    }
}
