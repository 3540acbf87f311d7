#![forbid(unsafe_code)]

pub mod app_services;
pub mod error;
pub mod notify;
pub mod persistence;
pub mod workout;

pub use app_services::WorkoutServices;
pub use error::{WorkoutError, WorkoutServicesError};
pub use notify::{Notifier, NoopNotifier, NotifyError};
pub use persistence::{DEFAULT_SNAPSHOT_KEY, SnapshotService};
pub use workout::{ClockScheduler, ClockSource, ClockTick, WorkoutCommand, WorkoutRuntime, WorkoutSession};
