// Library surface for headless/integration tests and reuse.
// Keep this lean to avoid coupling to bin-only types in main.rs.
pub mod audio;
pub mod config;
pub mod generator;
pub mod runtime;
pub mod session;
pub mod summary;

/// Tick granularity of the event loop; phase timers advance in these steps.
pub const TICK_RATE_MS: u64 = 100;
