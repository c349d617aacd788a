// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::fmt::Display;
use std::fmt::Formatter;

use clap::ValueEnum;
use serde::Serialize;

use crate::collection::Collection;
use crate::db::Database;
use crate::error::Fallible;
use crate::hours::DailyMinutes;
use crate::hours::daily_minutes;
use crate::hours::total_ms;
use crate::streak::StreakSummary;
use crate::streak::calculate_streaks;
use crate::types::session::format_duration;
use crate::types::timestamp::Timestamp;

#[derive(ValueEnum, Clone)]
pub enum StatsFormat {
    /// Human-readable output.
    Text,
    /// JSON output.
    Json,
}

impl Display for StatsFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StatsFormat::Text => write!(f, "text"),
            StatsFormat::Json => write!(f, "json"),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    streaks: StreakSummary,
    session_count: usize,
    total_study_ms: i64,
    last_week: Vec<DailyMinutes>,
}

/// Compute streak and study-hours statistics, persisting a new longest
/// streak when one is observed.
pub fn compute_stats(db: &Database, now: Timestamp) -> Fallible<Stats> {
    let sessions = db.all_sessions()?;
    let stored = db.longest_streak()?;
    let streaks = calculate_streaks(&sessions, stored, now);
    if streaks.highest_streak > stored {
        log::debug!("New longest streak: {}", streaks.highest_streak);
        db.set_longest_streak(streaks.highest_streak)?;
    }
    Ok(Stats {
        streaks,
        session_count: sessions.len(),
        total_study_ms: total_ms(&sessions),
        last_week: daily_minutes(&sessions, now.utc_date()),
    })
}

pub fn print_stats(directory: Option<String>, format: StatsFormat) -> Fallible<()> {
    let coll = Collection::new(directory)?;
    let stats = compute_stats(&coll.db, Timestamp::now())?;
    match format {
        StatsFormat::Text => {
            println!("Current streak:  {} days", stats.streaks.current_streak);
            println!("Longest streak:  {} days", stats.streaks.highest_streak);
            println!("Sessions:        {}", stats.session_count);
            println!("Total study:     {}", format_duration(stats.total_study_ms));
            println!();
            println!("Last 7 days:");
            for day in &stats.last_week {
                println!("  {}  {:>4} min", day.date.day_month(), day.minutes);
            }
        }
        StatsFormat::Json => {
            let stats_json = serde_json::to_string_pretty(&stats)?;
            println!("{}", stats_json);
        }
    }
    Ok(())
}
