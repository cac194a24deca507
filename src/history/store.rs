use parking_lot::Mutex;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

use super::types::{DateRange, HistoryEntry, HistoryStats, Location, ResultSummary};
use crate::analysis::{AnalysisResult, BusinessType};
use crate::constants::{HISTORY_MAX_ENTRIES, SCORE_DIGITS};
use crate::utils::{round_to, Clock, SiteError, SystemClock};

/// Append-only, capped log of past analyses persisted as one JSON array.
///
/// Every load-modify-save cycle runs under the writer lock, so two appends
/// through the same handle can't lose each other's entry. Share one handle
/// per process.
pub struct HistoryLog {
    path: PathBuf,
    max_entries: usize,
    clock: Arc<dyn Clock>,
    writer: Mutex<()>,
}

impl HistoryLog {
    /// Open (or initialize) the log at `path` with the default cap of 100
    pub fn new(path: impl Into<PathBuf>) -> Result<Self, SiteError> {
        Self::with_options(path, HISTORY_MAX_ENTRIES, Arc::new(SystemClock))
    }

    pub fn with_options(
        path: impl Into<PathBuf>,
        max_entries: usize,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, SiteError> {
        let log = Self {
            path: path.into(),
            max_entries,
            clock,
            writer: Mutex::new(()),
        };

        if let Some(parent) = log.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        if !log.path.exists() {
            log.save(&[])?;
        }

        Ok(log)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Record an analysis, then evict the oldest entries beyond the cap
    pub fn append(
        &self,
        lat: f64,
        lon: f64,
        business_type: BusinessType,
        radius: u32,
        result: &AnalysisResult,
    ) {
        if let Err(e) = self.try_append(lat, lon, business_type, radius, result) {
            warn!("Error saving history: {}", e);
        }
    }

    pub fn try_append(
        &self,
        lat: f64,
        lon: f64,
        business_type: BusinessType,
        radius: u32,
        result: &AnalysisResult,
    ) -> Result<(), SiteError> {
        let _guard = self.writer.lock();
        // Stamped under the lock so log order and timestamp order agree
        let entry = HistoryEntry {
            timestamp: self.clock.now(),
            location: Location::rounded(lat, lon),
            business_type,
            radius,
            result: ResultSummary::from(result),
        };

        let mut history = self.load_or_empty();
        history.push(entry);

        if history.len() > self.max_entries {
            let excess = history.len() - self.max_entries;
            history.drain(..excess);
        }

        self.save(&history)
    }

    /// The `limit` most recent entries, newest first, optionally for one business type
    pub fn query(&self, limit: usize, business_type: Option<BusinessType>) -> Vec<HistoryEntry> {
        let history = self
            .load_or_empty()
            .into_iter()
            .filter(|entry| business_type.map_or(true, |bt| entry.business_type == bt))
            .collect();

        newest_first(history).into_iter().take(limit).collect()
    }

    /// Entries inside the `tolerance` box around (lat, lon), newest first
    pub fn query_near(&self, lat: f64, lon: f64, tolerance: f64) -> Vec<HistoryEntry> {
        let history = self
            .load_or_empty()
            .into_iter()
            .filter(|entry| entry.location.is_within(lat, lon, tolerance))
            .collect();

        newest_first(history)
    }

    /// Get overall statistics
    pub fn statistics(&self) -> HistoryStats {
        summarize(&self.load_or_empty())
    }

    /// Empty the log, returning how many entries it held
    pub fn clear(&self) -> usize {
        match self.try_clear() {
            Ok(count) => count,
            Err(e) => {
                warn!("Error clearing history: {}", e);
                0
            }
        }
    }

    pub fn try_clear(&self) -> Result<usize, SiteError> {
        let _guard = self.writer.lock();
        let count = self.load_or_empty().len();
        self.save(&[])?;
        Ok(count)
    }

    pub fn try_load(&self) -> Result<Vec<HistoryEntry>, SiteError> {
        let json = fs::read_to_string(&self.path)?;
        serde_json::from_str(&json).map_err(|e| SiteError::CorruptRecord {
            path: self.path.display().to_string(),
            reason: e.to_string(),
        })
    }

    fn load_or_empty(&self) -> Vec<HistoryEntry> {
        self.try_load().unwrap_or_else(|e| {
            warn!("Error loading history: {}", e);
            Vec::new()
        })
    }

    /// Write through a sibling temp file so readers never see a torn array
    fn save(&self, history: &[HistoryEntry]) -> Result<(), SiteError> {
        let json = serde_json::to_string_pretty(history)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        debug!("Saved {} history entries", history.len());
        Ok(())
    }
}

/// Sort by timestamp descending; equal timestamps keep newest-inserted first
fn newest_first(history: Vec<HistoryEntry>) -> Vec<HistoryEntry> {
    let mut entries: Vec<HistoryEntry> = history.into_iter().rev().collect();
    entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    entries
}

fn summarize(history: &[HistoryEntry]) -> HistoryStats {
    if history.is_empty() {
        return HistoryStats::default();
    }

    let mut stats = HistoryStats {
        total_analyses: history.len(),
        date_range: DateRange {
            first: history.first().map(|e| e.timestamp),
            last: history.last().map(|e| e.timestamp),
        },
        ..HistoryStats::default()
    };

    let mut first_seen: HashMap<BusinessType, usize> = HashMap::new();
    let mut total_score = 0.0;
    for (index, entry) in history.iter().enumerate() {
        *stats.business_types.entry(entry.business_type).or_insert(0) += 1;
        first_seen.entry(entry.business_type).or_insert(index);
        total_score += entry.result.score;
    }

    // Ties go to the type that appeared earliest in the log
    stats.most_analyzed_type = stats
        .business_types
        .iter()
        .max_by(|(a_type, a_count), (b_type, b_count)| {
            a_count
                .cmp(b_count)
                .then_with(|| first_seen[b_type].cmp(&first_seen[a_type]))
        })
        .map(|(business_type, _)| *business_type);

    stats.average_score = round_to(total_score / history.len() as f64, SCORE_DIGITS);
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{DemandBreakdown, GrowthStatus, Verdict};
    use crate::utils::MockClock;
    use chrono::{Duration, Local, TimeZone};
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicI64, Ordering};
    use tempfile::TempDir;

    /// Clock that advances one minute per reading
    fn ticking_clock() -> Arc<dyn Clock> {
        let start = Local.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        let ticks = AtomicI64::new(0);
        let mut clock = MockClock::new();
        clock
            .expect_now()
            .returning(move || start + Duration::minutes(ticks.fetch_add(1, Ordering::SeqCst)));
        Arc::new(clock)
    }

    fn open_log(temp_dir: &TempDir) -> HistoryLog {
        HistoryLog::with_options(
            temp_dir.path().join("analysis_history.json"),
            HISTORY_MAX_ENTRIES,
            ticking_clock(),
        )
        .unwrap()
    }

    fn result_with_score(score: f64) -> AnalysisResult {
        AnalysisResult {
            score,
            verdict: Verdict::Balanced,
            verdict_color: Verdict::Balanced.color().to_string(),
            supply_count: 4,
            demand_count: 12,
            demand_breakdown: DemandBreakdown::default(),
            growth_status: GrowthStatus::Stable,
            construction_count: 1,
            supply_points: Vec::new(),
            demand_points: Vec::new(),
        }
    }

    #[test]
    fn test_missing_file_is_initialized_empty() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("history.json");
        let log = HistoryLog::new(&path).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap().trim(), "[]");
        assert!(log.query(10, None).is_empty());
    }

    #[test]
    fn test_append_rounds_location_and_summarizes() {
        let temp_dir = TempDir::new().unwrap();
        let log = open_log(&temp_dir);

        log.append(13.756331234, 100.501765432, BusinessType::Cafe, 1000, &result_with_score(3.0));

        let entries = log.query(10, None);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].location, Location { lat: 13.756331, lon: 100.501765 });
        assert_eq!(entries[0].result.score, 3.0);
        assert_eq!(entries[0].result.supply_count, 4);
        assert_eq!(entries[0].radius, 1000);
    }

    #[test]
    fn test_cap_keeps_most_recent_entries() {
        let temp_dir = TempDir::new().unwrap();
        let log = open_log(&temp_dir);

        for i in 0..130 {
            log.append(0.0, 0.0, BusinessType::Cafe, 100 + i, &result_with_score(1.0));
            assert!(log.try_load().unwrap().len() <= HISTORY_MAX_ENTRIES);
        }

        let stored = log.try_load().unwrap();
        let radii: Vec<u32> = stored.iter().map(|e| e.radius).collect();
        let expected: Vec<u32> = (30..130).map(|i| 100 + i).collect();
        assert_eq!(radii, expected);
    }

    #[test]
    fn test_query_filters_and_orders_newest_first() {
        let temp_dir = TempDir::new().unwrap();
        let log = open_log(&temp_dir);

        log.append(1.0, 1.0, BusinessType::Cafe, 500, &result_with_score(1.0));
        log.append(1.0, 1.0, BusinessType::Pharmacy, 600, &result_with_score(1.0));
        log.append(1.0, 1.0, BusinessType::Cafe, 700, &result_with_score(1.0));
        log.append(1.0, 1.0, BusinessType::Cafe, 800, &result_with_score(1.0));

        let cafes: Vec<u32> = log
            .query(2, Some(BusinessType::Cafe))
            .iter()
            .map(|e| e.radius)
            .collect();
        assert_eq!(cafes, vec![800, 700]);

        let all: Vec<u32> = log.query(10, None).iter().map(|e| e.radius).collect();
        assert_eq!(all, vec![800, 700, 600, 500]);
    }

    #[test]
    fn test_query_near_uses_tolerance_box() {
        let temp_dir = TempDir::new().unwrap();
        let log = open_log(&temp_dir);

        log.append(13.7563, 100.5018, BusinessType::Cafe, 1000, &result_with_score(2.5));
        log.append(14.0, 101.0, BusinessType::Cafe, 1000, &result_with_score(2.5));

        let near = log.query_near(13.7560, 100.5020, 0.01);
        assert_eq!(near.len(), 1);
        assert_eq!(near[0].location, Location { lat: 13.7563, lon: 100.5018 });

        assert!(log.query_near(13.7560, 100.5020, 0.0001).is_empty());
    }

    #[test]
    fn test_statistics() {
        let temp_dir = TempDir::new().unwrap();
        let log = open_log(&temp_dir);

        log.append(1.0, 1.0, BusinessType::Pharmacy, 500, &result_with_score(1.0));
        log.append(1.0, 1.0, BusinessType::Cafe, 500, &result_with_score(2.0));
        log.append(1.0, 1.0, BusinessType::Cafe, 500, &result_with_score(4.0));

        let stats = log.statistics();
        assert_eq!(stats.total_analyses, 3);
        assert_eq!(stats.business_types[&BusinessType::Cafe], 2);
        assert_eq!(stats.business_types[&BusinessType::Pharmacy], 1);
        assert_eq!(stats.average_score, 2.33);
        assert_eq!(stats.most_analyzed_type, Some(BusinessType::Cafe));
        assert!(stats.date_range.first < stats.date_range.last);
    }

    #[test]
    fn test_statistics_tie_goes_to_first_seen() {
        let temp_dir = TempDir::new().unwrap();
        let log = open_log(&temp_dir);

        log.append(1.0, 1.0, BusinessType::Restaurant, 500, &result_with_score(1.0));
        log.append(1.0, 1.0, BusinessType::Cafe, 500, &result_with_score(1.0));

        assert_eq!(log.statistics().most_analyzed_type, Some(BusinessType::Restaurant));
    }

    #[test]
    fn test_statistics_on_empty_log() {
        let temp_dir = TempDir::new().unwrap();
        let log = open_log(&temp_dir);

        let stats = log.statistics();
        assert_eq!(stats, HistoryStats::default());
        assert_eq!(stats.most_analyzed_type, None);
        assert_eq!(stats.date_range.first, None);
    }

    #[test]
    fn test_clear_returns_prior_length() {
        let temp_dir = TempDir::new().unwrap();
        let log = open_log(&temp_dir);

        log.append(1.0, 1.0, BusinessType::Cafe, 500, &result_with_score(1.0));
        log.append(1.0, 1.0, BusinessType::Cafe, 500, &result_with_score(1.0));

        assert_eq!(log.clear(), 2);
        assert_eq!(log.clear(), 0);
        assert!(log.query(10, None).is_empty());
    }

    #[test]
    fn test_corrupt_file_degrades_to_empty() {
        let temp_dir = TempDir::new().unwrap();
        let log = open_log(&temp_dir);
        fs::write(log.path(), "{ broken").unwrap();

        assert!(log.query(10, None).is_empty());
        assert!(matches!(log.try_load(), Err(SiteError::CorruptRecord { .. })));

        // The next append starts over from an empty log
        log.append(1.0, 1.0, BusinessType::Cafe, 500, &result_with_score(1.0));
        assert_eq!(log.try_load().unwrap().len(), 1);
    }

    #[test]
    fn test_concurrent_appends_are_not_lost() {
        let temp_dir = TempDir::new().unwrap();
        let log = Arc::new(open_log(&temp_dir));

        let handles: Vec<_> = (0..4)
            .map(|t| {
                let log = log.clone();
                std::thread::spawn(move || {
                    for i in 0..10 {
                        log.append(1.0, 1.0, BusinessType::Cafe, t * 100 + i, &result_with_score(1.0));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let stored = log.try_load().unwrap();
        assert_eq!(stored.len(), 40);
        assert!(stored.windows(2).all(|w| w[0].timestamp < w[1].timestamp));

        let newest: Vec<u32> = log.query(40, None).iter().map(|e| e.radius).collect();
        let inserted: Vec<u32> = stored.iter().rev().map(|e| e.radius).collect();
        assert_eq!(newest, inserted);
    }
}
