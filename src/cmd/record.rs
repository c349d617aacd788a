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

use crate::collection::Collection;
use crate::error::Fallible;
use crate::error::fail;
use crate::types::session::StudySession;
use crate::types::timestamp::Timestamp;

/// Record a study session of the given length directly, without running the
/// timer. The session is stamped with the current time.
pub fn record_session(directory: Option<String>, minutes: i64) -> Fallible<()> {
    if minutes <= 0 {
        return fail("session length must be positive.");
    }
    let coll = Collection::new(directory)?;
    let session = StudySession {
        started_at: Timestamp::now(),
        duration_ms: minutes * 60_000,
    };
    coll.db.add_session(session)?;
    println!("Recorded a {minutes}-minute session.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;
    use crate::collection::Collection;

    #[test]
    fn test_record_session() {
        let dir = tempdir().unwrap();
        let path = dir.path().display().to_string();
        record_session(Some(path.clone()), 25).unwrap();
        let coll = Collection::new(Some(path)).unwrap();
        let sessions = coll.db.all_sessions().unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].duration_ms, 25 * 60_000);
    }

    #[test]
    fn test_rejects_non_positive_length() {
        let dir = tempdir().unwrap();
        let path = dir.path().display().to_string();
        assert!(record_session(Some(path), 0).is_err());
    }
}
