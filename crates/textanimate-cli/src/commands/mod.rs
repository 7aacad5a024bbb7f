pub mod config;
pub mod play;
pub mod trace;
