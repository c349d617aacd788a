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

use std::error::Error;
use std::fmt::Display;
use std::fmt::Formatter;

/// The error type used throughout: a human-readable message.
#[derive(Debug)]
pub struct ErrorReport {
    message: String,
}

impl ErrorReport {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

pub type Fallible<T> = Result<T, ErrorReport>;

/// Shorthand to construct an error result.
pub fn fail<T>(message: &str) -> Fallible<T> {
    Err(ErrorReport::new(message))
}

impl Display for ErrorReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "error: {}", self.message)
    }
}

impl Error for ErrorReport {}

impl From<std::io::Error> for ErrorReport {
    fn from(e: std::io::Error) -> Self {
        Self {
            message: format!("{e}"),
        }
    }
}

impl From<rusqlite::Error> for ErrorReport {
    fn from(e: rusqlite::Error) -> Self {
        Self {
            message: format!("{e}"),
        }
    }
}

impl From<serde_json::Error> for ErrorReport {
    fn from(e: serde_json::Error) -> Self {
        Self {
            message: format!("{e}"),
        }
    }
}

impl From<reqwest::Error> for ErrorReport {
    fn from(e: reqwest::Error) -> Self {
        Self {
            message: format!("{e}"),
        }
    }
}

impl From<toml::de::Error> for ErrorReport {
    fn from(e: toml::de::Error) -> Self {
        Self {
            message: format!("{e}"),
        }
    }
}

impl From<walkdir::Error> for ErrorReport {
    fn from(e: walkdir::Error) -> Self {
        Self {
            message: format!("{e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = ErrorReport::new("something went wrong.");
        assert_eq!(err.to_string(), "error: something went wrong.");
    }

    #[test]
    fn test_fail() {
        let result: Fallible<()> = fail("nope.");
        assert!(result.is_err());
    }
}
