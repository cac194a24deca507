/// Analysis history - Gateway
mod store;
mod types;

pub use store::HistoryLog;
pub use types::{DateRange, HistoryEntry, HistoryStats, Location, ResultSummary};
