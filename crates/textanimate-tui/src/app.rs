use std::time::{Duration, Instant};

use ratatui::layout::Rect;
use tracing::debug;
use unicode_width::UnicodeWidthStr;

use textanimate_core::host::Host;
use textanimate_core::text::{GLYPH_ASPECT, LINE_HEIGHT};
use textanimate_core::timing::as_millis_f64;
use textanimate_core::visibility::Rect as LayoutRect;
use textanimate_core::{AnimationRequest, AppConfig, Runtime, Signal, Size, TextAnimate, Visual};

use crate::input::Action;
use crate::theme::Theme;

/// Application state for the terminal player
pub struct App {
    pub config: AppConfig,
    pub theme: Theme,
    pub runtime: Runtime,
    pub animator: TextAnimate,
    /// Area the text is laid out in (terminal minus status bar)
    pub viewport: Rect,
    /// Rows the text is moved away from the middle of the viewport
    pub scroll: i32,
    pub hovered: bool,
    pub should_quit: bool,
    pub status_message: Option<String>,
    origin: Instant,
}

impl App {
    pub fn new(request: AnimationRequest, config: AppConfig, theme: Theme) -> Self {
        let runtime = Runtime::new().with_frame_interval(Duration::from_millis(config.ui.frame_interval_ms));
        Self {
            config,
            theme,
            runtime,
            animator: TextAnimate::new(request),
            viewport: Rect::default(),
            scroll: 0,
            hovered: false,
            should_quit: false,
            status_message: None,
            origin: Instant::now(),
        }
    }

    pub fn request(&self) -> &AnimationRequest {
        self.animator.request()
    }

    pub fn view(&self) -> Visual {
        self.animator.view()
    }

    /// Host clock in milliseconds
    pub fn now_ms(&self) -> f64 {
        as_millis_f64(self.runtime.now())
    }

    /// Width of a character cell and height of a row in layout units
    pub fn cell_size(&self) -> (f64, f64) {
        let size = self.request().particle.size;
        (size * GLYPH_ASPECT, size * LINE_HEIGHT)
    }

    /// Lay out for a terminal of `area`; the last row is the status bar
    pub fn resize(&mut self, area: Rect) {
        self.viewport = Rect {
            height: area.height.saturating_sub(1),
            ..area
        };
        let (cell_w, cell_h) = self.cell_size();
        self.animator.set_bounds(Size::new(
            self.viewport.width as f64 * cell_w,
            self.viewport.height as f64 * cell_h,
        ));
        let limit = self.scroll_limit();
        self.scroll = self.scroll.clamp(-limit, limit);
        self.report_visibility();
    }

    pub fn mount(&mut self) {
        self.animator.mount(&mut self.runtime);
        self.report_visibility();
    }

    /// Unmount and release every host resource
    pub fn shutdown(&mut self) {
        self.animator.unmount(&mut self.runtime);
    }

    /// Advance the host clock to wall-clock time
    pub fn tick(&mut self) {
        self.advance(self.origin.elapsed());
    }

    /// Wall-clock time until the next scheduled wakeup, if any
    pub fn until_next_wakeup(&self) -> Option<Duration> {
        self.runtime
            .next_due()
            .map(|due| due.saturating_sub(self.origin.elapsed()))
    }

    /// Advance the host clock to `now`, delivering due wakeups
    pub fn advance(&mut self, now: Duration) {
        let animator = &mut self.animator;
        self.runtime.advance_to(now, |wakeup, runtime| {
            animator.on_wakeup(wakeup, runtime);
        });
    }

    pub fn handle_action(&mut self, action: Action) {
        match action {
            Action::Quit => self.should_quit = true,
            Action::ScrollUp => self.scroll_by(-1),
            Action::ScrollDown => self.scroll_by(1),
            Action::PageUp => self.scroll_by(-(self.viewport.height.max(1) as i32)),
            Action::PageDown => self.scroll_by(self.viewport.height.max(1) as i32),
            Action::Recenter => self.scroll_by(-self.scroll),
            Action::Remount => self.remount(),
            Action::PointerAt(col, row) => self.pointer_at(col, row),
            Action::ClickAt(col, row) => {
                if self.hit(col, row) {
                    self.animator.handle(Signal::Click, &mut self.runtime);
                }
            }
            Action::None => {}
        }
    }

    /// Top-left cell of the text, possibly outside the viewport
    pub fn text_origin(&self) -> (i32, i32) {
        let width = self.text_width() as i32;
        let x = self.viewport.x as i32 + (self.viewport.width as i32 - width).max(0) / 2;
        let y = self.viewport.y as i32 + self.viewport.height as i32 / 2 + self.scroll;
        (x, y)
    }

    /// Cells taken by the widest text the animation can show
    pub fn text_width(&self) -> u16 {
        self.request()
            .morph_cycle()
            .iter()
            .map(|t| t.width())
            .chain(std::iter::once(self.request().text.width()))
            .max()
            .unwrap_or(0) as u16
    }

    fn hit(&self, col: u16, row: u16) -> bool {
        let (x, y) = self.text_origin();
        let (col, row) = (col as i32, row as i32);
        row == y && col >= x && col < x + self.text_width().max(1) as i32
    }

    fn pointer_at(&mut self, col: u16, row: u16) {
        let inside = self.hit(col, row);
        if inside == self.hovered {
            return;
        }
        self.hovered = inside;
        let signal = if inside { Signal::PointerEnter } else { Signal::PointerLeave };
        self.animator.handle(signal, &mut self.runtime);
    }

    fn scroll_limit(&self) -> i32 {
        self.viewport.height as i32 / 2 + 2
    }

    fn scroll_by(&mut self, delta: i32) {
        let limit = self.scroll_limit();
        self.scroll = (self.scroll + delta).clamp(-limit, limit);
        self.report_visibility();
    }

    fn remount(&mut self) {
        self.animator.unmount(&mut self.runtime);
        self.hovered = false;
        self.animator.mount(&mut self.runtime);
        self.report_visibility();
        debug!(runs = self.animator.runs(), "Remounted");
        self.set_status("Remounted");
    }

    /// Tell the controller where the text sits relative to the viewport
    fn report_visibility(&mut self) {
        if self.viewport.area() == 0 || !self.animator.is_mounted() {
            return;
        }
        let (x, y) = self.text_origin();
        let target = LayoutRect::new(x as f64, y as f64, self.text_width().max(1) as f64, 1.0);
        let root = LayoutRect::new(
            self.viewport.x as f64,
            self.viewport.y as f64,
            self.viewport.width as f64,
            self.viewport.height as f64,
        );
        self.animator.handle(Signal::Viewport { target, root }, &mut self.runtime);
    }

    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some(msg.into());
    }

    pub fn clear_status(&mut self) {
        self.status_message = None;
    }
}
