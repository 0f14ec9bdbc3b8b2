// Domain layer - Chart viewport engine and dashboard models
pub mod dashboard;
pub mod gesture;
pub mod range;
pub mod sample;
pub mod ticks;
pub mod window;
