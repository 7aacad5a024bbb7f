use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use unicode_width::UnicodeWidthStr;

use textanimate_core::Phase;

use crate::app::App;

pub struct StatusBarWidget;

impl StatusBarWidget {
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let theme = &app.theme;
        let phase = app.animator.phase();
        let (phase_str, phase_color) = match phase {
            Phase::Idle => ("IDLE", theme.grey2),
            Phase::Armed => ("ARMED", theme.armed),
            Phase::Running => ("RUNNING", theme.running),
            Phase::Settled => ("SETTLED", theme.settled),
        };

        let phase_text = format!(" {} ", phase_str);
        let status_text = if let Some(msg) = &app.status_message {
            format!(" {}", msg)
        } else {
            let request = app.request();
            format!(
                " {} | {} | runs: {} | {:.2}s",
                request.kind,
                request.trigger,
                app.animator.runs(),
                app.now_ms() / 1000.0
            )
        };

        let help_hint = " q:quit j/k:scroll 0:center r:remount ";
        let used = phase_text.width() + status_text.width() + help_hint.width();
        let padding_len = (area.width as usize).saturating_sub(used);

        let line = Line::from(vec![
            Span::styled(phase_text, Style::default().fg(theme.bg0).bg(phase_color)),
            Span::styled(status_text, Style::default().fg(theme.fg0).bg(theme.bg2)),
            Span::styled(" ".repeat(padding_len), Style::default().bg(theme.bg2)),
            Span::styled(help_hint, Style::default().fg(theme.grey2).bg(theme.bg2)),
        ]);

        let paragraph = Paragraph::new(line);
        frame.render_widget(paragraph, area);
    }
}
