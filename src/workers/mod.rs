pub mod persist;
pub mod ticker;

pub use persist::{FlushReport, PersistRequest, PersistWorker};
pub use ticker::{ClockTick, MatchTicker};
