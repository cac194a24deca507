mod keyed_cache;
mod types;

pub use keyed_cache::KeyedCache;
pub use types::{AnalysisParams, CacheEntry, CacheKey, CacheStats};
