pub mod clock;
pub mod config;
pub mod db;
pub mod error;
pub mod export;
pub mod models;
pub mod session;
pub mod stats;
pub mod tracker;
pub mod workers;

pub use error::{Rejection, StorageError, TrackerResult};
pub use session::TrackerSession;
pub use tracker::MatchTracker;
