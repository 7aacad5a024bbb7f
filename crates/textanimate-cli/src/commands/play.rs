use std::io;

use anyhow::Result;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen, SetTitle},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout, Rect},
    Terminal,
};
use tracing::info;

use textanimate_core::{AnimationRequest, AppConfig};
use textanimate_tui::{
    event::{AppEvent, EventHandler},
    input::{handle_key_event, handle_mouse_event},
    widgets::{AnimatedTextWidget, StatusBarWidget},
    App, Theme,
};

pub fn run(request: AnimationRequest, config: AppConfig) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture, SetTitle("textanimate"))?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let theme = Theme::with_accent(&config.ui.accent);
    let event_handler = EventHandler::new(config.ui.tick_rate_ms);

    info!(kind = %request.kind, trigger = %request.trigger, "Starting player");
    let mut app = App::new(request, config, theme);
    let size = terminal.size()?;
    app.resize(Rect::new(0, 0, size.width, size.height));
    app.mount();

    let result = run_loop(&mut terminal, &mut app, &event_handler);
    app.shutdown();
    info!(stats = ?app.runtime.stats(), "Player stopped");

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    event_handler: &EventHandler,
) -> Result<()> {
    loop {
        app.tick();

        // Draw UI
        terminal.draw(|frame| {
            let main_layout = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(1), Constraint::Length(1)])
                .split(frame.area());

            AnimatedTextWidget::render(frame, main_layout[0], app);
            StatusBarWidget::render(frame, main_layout[1], app);
        })?;

        let wait = app
            .until_next_wakeup()
            .unwrap_or_else(|| event_handler.tick_rate());
        if let Some(event) = event_handler.next_within(wait)? {
            match event {
                AppEvent::Key(key) => {
                    app.clear_status();
                    app.handle_action(handle_key_event(key));
                }
                AppEvent::Mouse(mouse) => app.handle_action(handle_mouse_event(mouse)),
                AppEvent::Resize(width, height) => app.resize(Rect::new(0, 0, width, height)),
                AppEvent::Tick => {}
            }
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}
