pub mod analysis;
pub mod app;
pub mod cache;
pub mod cli;
pub mod constants;
pub mod history;
pub mod search;
pub mod utils;

pub use analysis::{analyze, AnalysisResult, BusinessType, SiteAnalyzer, SiteRequest};
pub use app::{load_config, AppState, Config};
pub use cache::{AnalysisParams, KeyedCache};
pub use history::HistoryLog;
pub use search::{RelevanceRanker, Suggestion};
pub use utils::SiteError;
