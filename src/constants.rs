/// Constants module to avoid magic numbers in the codebase

// Cache
pub const DEFAULT_CACHE_TTL_HOURS: u64 = 24;
pub const DEFAULT_CACHE_DIR_NAME: &str = "cache";
pub const CACHE_FILE_EXTENSION: &str = "json";
pub const CACHE_KEY_COORD_DIGITS: i32 = 4; // ~11m, reduces near-duplicate misses

// History
pub const DEFAULT_HISTORY_FILE_NAME: &str = "analysis_history.json";
pub const HISTORY_MAX_ENTRIES: usize = 100;
pub const HISTORY_COORD_DIGITS: i32 = 6;
pub const DEFAULT_HISTORY_LIMIT: usize = 10;
pub const DEFAULT_LOCATION_TOLERANCE: f64 = 0.01;

// Analysis
pub const DEFAULT_RADIUS_METERS: u32 = 1000;
pub const MAX_DISPLAY_DEMAND_POINTS: usize = 1000;
pub const SCORE_DIGITS: i32 = 2;
pub const HIGH_POTENTIAL_SCORE: f64 = 5.0;
pub const BALANCED_SCORE: f64 = 2.0;
pub const BOOMING_CONSTRUCTION: usize = 5;
pub const GROWING_CONSTRUCTION: usize = 2;
pub const UNKNOWN_PLACE_NAME: &str = "Unknown";

// Search ranking
pub const MAX_SUGGESTIONS: usize = 8;
pub const IMPORTANCE_WEIGHT: f64 = 20.0;
pub const PREFIX_MATCH_BONUS: f64 = 30.0;
pub const FIRST_SEGMENT_MATCH_BONUS: f64 = 20.0;
pub const ANYWHERE_MATCH_BONUS: f64 = 10.0;
pub const UNKNOWN_CLASS_SCORE: f64 = 40.0;
pub const UNKNOWN_PLACE_TYPE_SCORE: f64 = 30.0;
pub const EXCLUDED_PLACE_TYPES: &[&str] = &["sea", "ocean", "continent"];
