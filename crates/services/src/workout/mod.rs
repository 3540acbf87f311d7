mod clocks;
mod runtime;
mod session;

// Public API of the guided workout subsystem.
pub use clocks::{ClockScheduler, ClockSource, ClockTick};
pub use runtime::WorkoutRuntime;
pub use session::{WorkoutCommand, WorkoutSession};
