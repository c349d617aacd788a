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

use crate::types::timestamp::Timestamp;

/// A single timed study interval. Immutable once persisted.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct StudySession {
    pub started_at: Timestamp,
    pub duration_ms: i64,
}

impl StudySession {
    /// Whole minutes studied, rounded down.
    pub fn minutes(&self) -> i64 {
        self.duration_ms / 60_000
    }
}

/// Format a duration in milliseconds as `HH:MM:SS`.
pub fn format_duration(ms: i64) -> String {
    let total_sec = ms / 1000;
    let hours = total_sec / 3600;
    let minutes = (total_sec % 3600) / 60;
    let seconds = total_sec % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minutes() {
        let session = StudySession {
            started_at: Timestamp::from_epoch_ms(0).unwrap(),
            duration_ms: 119_999,
        };
        assert_eq!(session.minutes(), 1);
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "00:00:00");
        assert_eq!(format_duration(59_000), "00:00:59");
        assert_eq!(format_duration(61_000), "00:01:01");
        assert_eq!(format_duration(3_600_000 + 62_000), "01:01:02");
    }
}
