// Library surface for headless/integration tests and reuse.
// Keep this lean to avoid coupling to bin-only types in main.rs.
pub mod app;
pub mod app_dirs;
pub mod clock;
pub mod config;
pub mod metrics;
pub mod phase;
pub mod replay;
pub mod runtime;
pub mod sampler;
pub mod schedule;
pub mod session;
pub mod surface;
pub mod survey;
pub mod ui;
pub mod util;
