use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;
use std::path::Path;

use crate::analysis::{
    BusinessType, SiteRequest, SnapshotSource, CONSTRUCTION_QUERY_TAG, DEMAND_QUERY_TAGS,
};
use crate::app::{init_config, AppState};

use super::{CacheAction, Commands, HistoryAction};

/// Handle CLI subcommands that need the stores
pub fn handle_command(command: &Commands, state: &AppState) -> Result<()> {
    match command {
        Commands::Analyze {
            lat,
            lon,
            business_type,
            radius,
            input,
        } => analyze(state, SiteRequest::new(*lat, *lon, *business_type, *radius), input),
        Commands::Search { query, candidates } => search(state, query, candidates),
        Commands::Cache { action } => handle_cache(state, action),
        Commands::History { action } => handle_history(state, action),
        Commands::BusinessTypes => {
            list_business_types();
            Ok(())
        }
        Commands::Init => {
            let path = init_config()?;
            println!("Configuration at: {}", path.display().to_string().green());
            Ok(())
        }
    }
}

fn analyze(state: &AppState, request: SiteRequest, input: &Path) -> Result<()> {
    let source = SnapshotSource::load(input)
        .with_context(|| format!("Failed to read snapshot {}", input.display()))?;
    let result = state.analyzer.analyze(&request, &source);
    print_json(&result)
}

fn search(state: &AppState, query: &str, candidates: &Path) -> Result<()> {
    // An unreadable file is the caller's mistake; an unparseable body just ranks to nothing
    let body = std::fs::read_to_string(candidates)
        .with_context(|| format!("Failed to read {}", candidates.display()))?;
    print_json(&state.ranker.rank_response(query, &body))
}

fn handle_cache(state: &AppState, action: &CacheAction) -> Result<()> {
    match action {
        CacheAction::Stats => print_json(&state.cache().stats()),
        CacheAction::Clear { all: false } => {
            let cleared = state.cache().clear_expired();
            println!("Cleared {} expired cache files", cleared.to_string().yellow());
            Ok(())
        }
        CacheAction::Clear { all: true } => {
            let cleared = state.cache().clear_all();
            println!("Cleared all {} cache files", cleared.to_string().yellow());
            Ok(())
        }
    }
}

fn handle_history(state: &AppState, action: &HistoryAction) -> Result<()> {
    let history = state.history();
    match action {
        HistoryAction::List {
            limit,
            business_type,
        } => print_json(&history.query(*limit, *business_type)),
        HistoryAction::Near {
            lat,
            lon,
            tolerance,
        } => print_json(&history.query_near(*lat, *lon, *tolerance)),
        HistoryAction::Stats => print_json(&history.statistics()),
        HistoryAction::Clear => {
            let cleared = history.clear();
            println!("Cleared {} history entries", cleared.to_string().yellow());
            Ok(())
        }
    }
}

/// List supported business types with the supply tags they match, plus the shared queries
pub fn list_business_types() {
    println!("Business types:");
    for business_type in BusinessType::ALL {
        println!("  • {} ({})", business_type.name().green(), business_type.supply_tags());
    }

    println!("\nDemand queries:");
    for filter in DEMAND_QUERY_TAGS {
        println!("  • {}", filter);
    }
    println!("\nConstruction query: {}", CONSTRUCTION_QUERY_TAG);
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
