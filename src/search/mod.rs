/// Place search ranking - Gateway
mod ranker;
mod types;

pub use ranker::{base_score, is_excluded, name_match_bonus, RankerConfig, RelevanceRanker};
pub use types::{RankedCandidate, SearchCandidate, Suggestion};
