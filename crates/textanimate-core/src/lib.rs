pub mod config;
pub mod controller;
pub mod easing;
pub mod error;
pub mod handles;
pub mod host;
pub mod physics;
pub mod render;
pub mod request;
pub mod runtime;
pub mod schedule;
pub mod text;
pub mod timing;
pub mod visibility;

pub use config::{AnimationConfig, AppConfig};
pub use controller::{Phase, Signal, TextAnimate};
pub use easing::EasingType;
pub use error::{Error, Result};
pub use host::{Host, Size, Wakeup};
pub use render::Visual;
pub use request::{AnimationKind, AnimationRequest, Repeat, TriggerMode};
pub use runtime::Runtime;
