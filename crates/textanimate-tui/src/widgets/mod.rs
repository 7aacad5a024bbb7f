mod animated_text;
mod status_bar;

pub use animated_text::AnimatedTextWidget;
pub use status_bar::StatusBarWidget;
