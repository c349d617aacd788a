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

use std::collections::BTreeSet;

use serde::Serialize;

use crate::types::date::Date;
use crate::types::session::StudySession;
use crate::types::timestamp::Timestamp;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakSummary {
    /// Consecutive study days ending at the most recent session date. Zero
    /// if the chain is broken as of yesterday.
    pub current_streak: u32,
    /// The longest streak ever observed, reconciled against the stored
    /// value. Monotonic: never less than `stored_longest`.
    pub highest_streak: u32,
}

/// Compute streak statistics from a set of study sessions.
///
/// Session timestamps are projected to UTC calendar dates; multiple sessions
/// on the same date collapse to one. The sorted dates are walked once,
/// incrementing a running streak on each consecutive day and resetting it to
/// one across a gap.
///
/// The current streak is forced to zero when there is no session dated
/// yesterday (relative to `now`). A session logged today with none yesterday
/// therefore reports a current streak of zero; kept as-is pending a product
/// decision.
///
/// If `highest_streak` exceeds `stored_longest`, the caller is expected to
/// persist the new value; this function performs no writes.
pub fn calculate_streaks(
    sessions: &[StudySession],
    stored_longest: u32,
    now: Timestamp,
) -> StreakSummary {
    let dates: BTreeSet<Date> = sessions.iter().map(|s| s.started_at.utc_date()).collect();

    let mut current: u32 = 0;
    let mut highest: u32 = 0;
    let mut prev: Option<Date> = None;
    for date in &dates {
        match prev {
            None => current = 1,
            Some(prev) => {
                // The gap is at least one day, since dates are deduplicated.
                if date.days_since(prev) == 1 {
                    current += 1;
                } else {
                    current = 1;
                }
            }
        }
        highest = highest.max(current);
        prev = Some(*date);
    }

    let yesterday = now.utc_date().pred();
    if !dates.contains(&yesterday) {
        current = 0;
    }

    StreakSummary {
        current_streak: current,
        highest_streak: highest.max(stored_longest),
    }
}
