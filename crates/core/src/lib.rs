#![forbid(unsafe_code)]

pub mod error;
pub mod model;
pub mod store;
pub mod time;

pub use error::Error;
pub use store::{ProgressCount, ProgressState, ProgressStats, ProgressStore};
pub use time::Clock;
