use anyhow::{Context, Result};
use chrono::Duration;
use std::sync::Arc;

use crate::analysis::SiteAnalyzer;
use crate::app::Config;
use crate::cache::KeyedCache;
use crate::history::HistoryLog;
use crate::search::{RankerConfig, RelevanceRanker};
use crate::utils::SystemClock;

/// Process-wide handles, built once at startup and passed by reference
pub struct AppState {
    pub config: Config,
    pub analyzer: SiteAnalyzer,
    pub ranker: RelevanceRanker,
}

impl AppState {
    /// Open the stores named by `config`
    pub fn new(config: Config) -> Result<Self> {
        let ttl_hours = i64::try_from(config.cache.ttl_hours)
            .context("cache.ttl_hours is out of range")?;
        let cache = KeyedCache::new(&config.cache.dir, Duration::hours(ttl_hours))
            .with_context(|| format!("Failed to open cache at {}", config.cache.dir.display()))?;

        let history = HistoryLog::with_options(
            &config.history.file,
            config.history.max_entries,
            Arc::new(SystemClock),
        )
        .with_context(|| format!("Failed to open history at {}", config.history.file.display()))?;

        let ranker = RelevanceRanker::new(RankerConfig {
            max_results: config.search.max_results,
        });

        Ok(Self {
            analyzer: SiteAnalyzer::new(cache, history),
            ranker,
            config,
        })
    }

    pub fn cache(&self) -> &KeyedCache {
        self.analyzer.cache()
    }

    pub fn history(&self) -> &HistoryLog {
        self.analyzer.history()
    }
}
