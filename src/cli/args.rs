use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::analysis::BusinessType;
use crate::constants::{DEFAULT_HISTORY_LIMIT, DEFAULT_LOCATION_TOLERANCE, DEFAULT_RADIUS_METERS};

#[derive(Parser, Debug)]
#[command(name = "market-gap")]
#[command(version)]
#[command(about = "Site viability scoring: competing supply vs. nearby demand", long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Score a site from a pre-fetched geodata snapshot
    Analyze {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
        /// One of the names printed by `business-types`
        #[arg(short, long)]
        business_type: BusinessType,
        /// Search radius in meters
        #[arg(short, long, default_value_t = DEFAULT_RADIUS_METERS)]
        radius: u32,
        /// JSON snapshot with `supply`, `demand` and `construction_count`
        #[arg(short, long)]
        input: PathBuf,
    },
    /// Rank a saved geocoder response for a query
    Search {
        #[arg(short, long)]
        query: String,
        /// JSON array of geocoder results
        #[arg(long)]
        candidates: PathBuf,
    },
    /// Inspect or clear the result cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
    /// Inspect or clear the analysis history
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },
    /// List supported business types
    BusinessTypes,
    /// Initialize configuration
    Init,
}

#[derive(Subcommand, Debug)]
pub enum CacheAction {
    /// Show cache statistics
    Stats,
    /// Remove expired entries (or everything with --all)
    Clear {
        #[arg(long)]
        all: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum HistoryAction {
    /// Most recent analyses, newest first
    List {
        #[arg(short, long, default_value_t = DEFAULT_HISTORY_LIMIT)]
        limit: usize,
        #[arg(short, long)]
        business_type: Option<BusinessType>,
    },
    /// Analyses near a location
    Near {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
        #[arg(short, long, default_value_t = DEFAULT_LOCATION_TOLERANCE)]
        tolerance: f64,
    },
    /// Aggregate statistics
    Stats,
    /// Delete all history
    Clear,
}
