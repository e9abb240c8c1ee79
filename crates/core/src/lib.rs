#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! Green-phase allocation for a four-way signalized intersection.
//!
//! The [`scheduler::SignalScheduler`] owns the latest vehicle counts and the
//! memory of which approach was served last; every call to
//! [`scheduler::SignalScheduler::compute_schedule`] picks the next approach
//! and how long it stays green.

pub mod api;
pub mod error;
pub mod model;
pub mod parse;
pub mod scheduler;
pub mod simulation;

pub use error::{ConfigError, ParseDirectionError, UpdateError};
pub use model::{CountSnapshot, Direction, GreenTiming, SchedulerStatus, SignalPlan};
pub use scheduler::{select_next, SignalScheduler};
