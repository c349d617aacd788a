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

use serde::Serialize;

use crate::types::date::Date;
use crate::types::session::StudySession;

/// Number of days shown in the study-hours chart.
pub const CHART_DAYS: i64 = 7;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyMinutes {
    pub date: Date,
    pub minutes: i64,
}

/// Minutes studied per day over the last `CHART_DAYS` days, oldest first.
/// Days without sessions are present with zero minutes. Sessions outside the
/// window are ignored.
pub fn daily_minutes(sessions: &[StudySession], today: Date) -> Vec<DailyMinutes> {
    let mut days: Vec<DailyMinutes> = Vec::with_capacity(CHART_DAYS as usize);
    for offset in (0..CHART_DAYS).rev() {
        let mut date = today;
        for _ in 0..offset {
            date = date.pred();
        }
        days.push(DailyMinutes { date, minutes: 0 });
    }
    for session in sessions {
        let date = session.started_at.utc_date();
        if let Some(day) = days.iter_mut().find(|d| d.date == date) {
            day.minutes += session.minutes();
        }
    }
    days
}

/// Total time studied across all sessions, in milliseconds.
pub fn total_ms(sessions: &[StudySession]) -> i64 {
    sessions.iter().map(|s| s.duration_ms).sum()
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use chrono::TimeZone;
    use chrono::Utc;

    use super::*;
    use crate::types::timestamp::Timestamp;

    fn date(y: i32, m: u32, d: u32) -> Date {
        Date::new(NaiveDate::from_ymd_opt(y, m, d).unwrap())
    }

    fn session(y: i32, m: u32, d: u32, minutes: i64) -> StudySession {
        StudySession {
            started_at: Timestamp::new(Utc.with_ymd_and_hms(y, m, d, 9, 0, 0).unwrap()),
            duration_ms: minutes * 60_000,
        }
    }

    #[test]
    fn test_empty_window() {
        let days = daily_minutes(&[], date(2024, 1, 7));
        assert_eq!(days.len(), 7);
        assert_eq!(days[0].date, date(2024, 1, 1));
        assert_eq!(days[6].date, date(2024, 1, 7));
        assert!(days.iter().all(|d| d.minutes == 0));
    }

    #[test]
    fn test_sessions_bucketed_by_day() {
        let sessions = [
            session(2024, 1, 5, 30),
            session(2024, 1, 5, 15),
            session(2024, 1, 7, 45),
        ];
        let days = daily_minutes(&sessions, date(2024, 1, 7));
        assert_eq!(days[4].minutes, 45);
        assert_eq!(days[5].minutes, 0);
        assert_eq!(days[6].minutes, 45);
    }

    #[test]
    fn test_sessions_outside_window_ignored() {
        let sessions = [session(2023, 12, 1, 120), session(2024, 1, 8, 10)];
        let days = daily_minutes(&sessions, date(2024, 1, 7));
        assert!(days.iter().all(|d| d.minutes == 0));
    }

    #[test]
    fn test_sub_minute_sessions_floor_to_zero() {
        let sessions = [StudySession {
            started_at: Timestamp::new(Utc.with_ymd_and_hms(2024, 1, 7, 9, 0, 0).unwrap()),
            duration_ms: 59_999,
        }];
        let days = daily_minutes(&sessions, date(2024, 1, 7));
        assert_eq!(days[6].minutes, 0);
    }

    #[test]
    fn test_total_ms() {
        let sessions = [session(2024, 1, 1, 30), session(2024, 1, 2, 60)];
        assert_eq!(total_ms(&sessions), 90 * 60_000);
    }
}
