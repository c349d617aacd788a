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

use std::time::Duration;

use axum::Router;
use axum::http::HeaderName;
use axum::http::StatusCode;
use axum::http::header::CACHE_CONTROL;
use axum::http::header::CONTENT_TYPE;
use axum::response::Html;
use axum::routing::get;
use tokio::net::TcpListener;
use tokio::net::TcpStream;
use tokio::time::sleep;

use crate::collection::Collection;
use crate::dashboard::get::dashboard_handler;
use crate::dashboard::get::notes_handler;
use crate::dashboard::state::ServerState;
use crate::error::Fallible;

pub async fn start_server(
    directory: Option<String>,
    port: u16,
    open_browser: bool,
) -> Fallible<()> {
    let coll = Collection::new(directory)?;
    let state = ServerState {
        db: coll.db,
        topics: coll.topics,
    };

    let app = Router::new();
    let app = app.route("/", get(dashboard_handler));
    let app = app.route("/notes/{module}/{name}", get(notes_handler));
    let app = app.route("/style.css", get(stylesheet));
    let app = app.fallback(not_found_handler);
    let app = app.with_state(state);
    let bind = format!("0.0.0.0:{port}");

    if open_browser {
        // Start a separate task to open the browser once the server is up.
        let probe = bind.clone();
        let url = format!("http://{probe}/");
        tokio::spawn(async move {
            loop {
                if let Ok(stream) = TcpStream::connect(&probe).await {
                    drop(stream);
                    break;
                }
                sleep(Duration::from_millis(1)).await;
            }
            let _ = open::that(url);
        });
    }

    log::debug!("Starting server on {bind}");
    let listener = TcpListener::bind(&bind).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn stylesheet() -> (StatusCode, [(HeaderName, &'static str); 2], &'static [u8]) {
    let bytes = include_bytes!("style.css");
    (
        StatusCode::OK,
        [
            (CONTENT_TYPE, "text/css"),
            (CACHE_CONTROL, "public, max-age=604800, immutable"),
        ],
        bytes,
    )
}

async fn not_found_handler() -> (StatusCode, Html<String>) {
    (StatusCode::NOT_FOUND, Html("Not Found".to_string()))
}
