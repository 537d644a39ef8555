//! Account management: registration, profile reads and updates.

pub mod forms;
pub mod service;

pub use service::{RegisterOutcome, UpdateOutcome, UserService};
