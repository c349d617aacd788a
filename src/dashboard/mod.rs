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

mod get;
pub mod server;
mod state;
mod template;

#[cfg(test)]
mod tests {
    use std::fs::create_dir_all;
    use std::fs::write;
    use std::time::Duration;

    use reqwest::StatusCode;
    use tempfile::tempdir;
    use tokio::net::TcpStream;
    use tokio::spawn;
    use tokio::time::sleep;

    use crate::dashboard::server::start_server;
    use crate::db::Database;
    use crate::error::Fallible;
    use crate::types::session::StudySession;
    use crate::types::timestamp::Timestamp;

    #[tokio::test]
    async fn test_start_server_on_non_existent_directory() -> Fallible<()> {
        let result = start_server(Some("./derpherp".to_string()), 8123, false).await;
        assert!(result.is_err());
        let err = result.err().unwrap();
        assert_eq!(err.to_string(), "error: directory does not exist.");
        Ok(())
    }

    #[tokio::test]
    async fn test_e2e() -> Fallible<()> {
        let dir = tempdir()?;
        create_dir_all(dir.path().join("calculus"))?;
        write(
            dir.path().join("calculus/limits.md"),
            "# Limits\n\nA limit is...",
        )?;
        let db = Database::new(dir.path().join("studylog.db").to_str().unwrap())?;
        db.add_session(StudySession {
            started_at: Timestamp::now(),
            duration_ms: 30 * 60_000,
        })?;
        drop(db);

        let port = portpicker::pick_unused_port().unwrap();
        let directory = dir.path().display().to_string();
        spawn(async move {
            let _ = start_server(Some(directory), port, false).await;
        });

        // Wait for the server to come up.
        let bind = format!("0.0.0.0:{port}");
        loop {
            if let Ok(stream) = TcpStream::connect(&bind).await {
                drop(stream);
                break;
            }
            sleep(Duration::from_millis(1)).await;
        }

        // Hit the `style.css` endpoint.
        let response = reqwest::get(format!("http://{bind}/style.css")).await?;
        assert!(response.status().is_success());
        assert_eq!(response.headers().get("content-type").unwrap(), "text/css");

        // Hit the root endpoint.
        let response = reqwest::get(format!("http://{bind}/")).await?;
        assert!(response.status().is_success());
        let html = response.text().await?;
        assert!(html.contains("longest streak"));
        assert!(html.contains("/notes/calculus/limits"));

        // Hit the notes endpoint.
        let response = reqwest::get(format!("http://{bind}/notes/calculus/limits")).await?;
        assert!(response.status().is_success());
        let html = response.text().await?;
        assert!(html.contains("<h1>Limits</h1>"));

        // Hit a non-existent topic.
        let response = reqwest::get(format!("http://{bind}/notes/calculus/derp")).await?;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        // Hit the not found endpoint.
        let response = reqwest::get(format!("http://{bind}/herp-derp")).await?;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        Ok(())
    }
}
