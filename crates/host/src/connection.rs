// Copyright (C) 2025 Ryan Daum <ryan.daum@gmail.com> This program is free
// software: you can redistribute it and/or modify it under the terms of the GNU
// General Public License as published by the Free Software Foundation, version
// 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

//! §4.6: the single HTTP entry point a world's listener dispatches every
//! request through. There is deliberately one route table entry (the
//! fallback) rather than one per endpoint: non-`POST` methods must 404 with
//! an empty body regardless of path, which axum's per-method routers don't
//! express directly.

use axum::body::{to_bytes, Body};
use axum::extract::{ConnectInfo, Request, State};
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use axum::Router;
use gridrunner_common::wire::{
    ConnectRequest, ConnectResponse, ErrorResponse, MoveRequest, MoveResponse,
    IDENTIFIER_RESERVED_MESSAGE, INVALID_IDENTIFIER_MESSAGE, NO_LIVING_AGENT_MESSAGE,
    UNKNOWN_REQUEST_MESSAGE,
};
use gridrunner_common::{
    is_reserved_for_map, sanitize_username, sanitize_vsid_text, IdentifierError,
    VisualIdentifier,
};
use gridrunner_world::{MoveError, World};
use std::net::SocketAddr;
use std::time::Duration;
use tracing::{debug, info, warn};

const BODY_READ_TIMEOUT: Duration = Duration::from_secs(2);
const MAX_BODY_BYTES: usize = 64 * 1024;

pub fn router(world: World) -> Router {
    Router::new().fallback(dispatch).with_state(world)
}

async fn dispatch(
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    State(world): State<World>,
    request: Request<Body>,
) -> Response {
    if request.method() != Method::POST {
        return StatusCode::NOT_FOUND.into_response();
    }

    let path = request.uri().path().to_string();
    let bytes = match tokio::time::timeout(
        BODY_READ_TIMEOUT,
        to_bytes(request.into_body(), MAX_BODY_BYTES),
    )
    .await
    {
        Ok(Ok(bytes)) => bytes,
        Ok(Err(err)) => return json_response(ErrorResponse::exception(err)),
        Err(_) => return json_response(ErrorResponse::exception("body read timed out")),
    };

    match path.as_str() {
        "/connect" => handle_connect(world, addr, &bytes).await,
        "/move" => handle_move(world, &bytes).await,
        _ => json_response(ErrorResponse::new(UNKNOWN_REQUEST_MESSAGE)),
    }
}

async fn handle_connect(world: World, addr: SocketAddr, bytes: &[u8]) -> Response {
    let raw: ConnectRequest = match serde_json::from_slice(bytes) {
        Ok(raw) => raw,
        Err(err) => return json_response(ErrorResponse::exception(err)),
    };

    let client_id = addr.to_string();
    let username = sanitize_username(&raw.username);

    let identifier = match raw.vsid {
        None => None,
        Some(candidate) => {
            let sanitized_text = sanitize_vsid_text(&candidate.text);
            match VisualIdentifier::new(sanitized_text, candidate.color) {
                Ok(id) => {
                    if world.config().visualize
                        && is_reserved_for_map(&id.text, id.color, &world.trap_glyphs())
                    {
                        warn!(%client_id, text = %id.text, ?id.color, "rejected vsid reserved by map");
                        return json_response(ConnectResponse::failure(IDENTIFIER_RESERVED_MESSAGE));
                    }
                    Some(id)
                }
                // A ConnectRejected, not a caught exception: shape/reservation
                // failures get their own literal messages rather than the
                // generic exception wrapper (see INVALID_IDENTIFIER_MESSAGE /
                // IDENTIFIER_RESERVED_MESSAGE doc comments).
                Err(IdentifierError::WrongLength) => {
                    warn!(%client_id, "rejected vsid: wrong length");
                    return json_response(ConnectResponse::failure(INVALID_IDENTIFIER_MESSAGE));
                }
                Err(IdentifierError::Reserved) => {
                    warn!(%client_id, "rejected vsid: reserved");
                    return json_response(ConnectResponse::failure(IDENTIFIER_RESERVED_MESSAGE));
                }
            }
        }
    };

    match world.connect(client_id.clone(), identifier.clone()) {
        Ok(sid) => {
            info!(%sid, %client_id, "session connected");
            world.notify_connected(sid.clone(), client_id, username, identifier);
            json_response(ConnectResponse::success(sid))
        }
        Err(err) => {
            warn!(%client_id, %err, "connect rejected");
            json_response(ConnectResponse::failure(err.to_string()))
        }
    }
}

async fn handle_move(world: World, bytes: &[u8]) -> Response {
    let req: MoveRequest = match serde_json::from_slice(bytes) {
        Ok(req) => req,
        Err(err) => return json_response(ErrorResponse::exception(err)),
    };

    debug!(sid = %req.sid, dx = req.dx, dy = req.dy, "move requested");
    match world.move_session(&req.sid, req.dx, req.dy).await {
        Ok(reply) => json_response(MoveResponse::executed(reply.moved, reply.alive, reply.discovered)),
        Err(MoveError::UnknownSid) => json_response(MoveResponse::failure(NO_LIVING_AGENT_MESSAGE)),
    }
}

fn json_response<T: serde::Serialize>(body: T) -> Response {
    Json(body).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridrunner_world::world::WorldConfig;
    use gridrunner_world::{Cell, Grid};
    use tokio::net::TcpListener;

    fn test_world(visualize: bool) -> World {
        let grid = Grid::from_cells(3, 3, vec![Cell::Empty; 9]);
        let config = WorldConfig {
            max_sessions_per_client: 2,
            idle_timeout: Duration::from_secs(5),
            action_cooldown: Duration::from_millis(1),
            visualize,
        };
        World::new(grid, config)
    }

    /// Bind an ephemeral port, serve `world` on it, and return the base URL.
    /// The server task is detached; it lives for the process lifetime of the
    /// test binary, which is fine for these short-lived assertions.
    async fn spawn_test_server(world: World) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = router(world);
        tokio::spawn(async move {
            axum::serve(
                listener,
                app.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await
            .unwrap();
        });
        format!("http://{addr}")
    }

    async fn post(base: &str, path: &str, body: &str) -> (reqwest::StatusCode, serde_json::Value) {
        let client = reqwest::Client::new();
        let resp = client
            .post(format!("{base}{path}"))
            .header("content-type", "application/json")
            .body(body.to_string())
            .send()
            .await
            .unwrap();
        let status = resp.status();
        let text = resp.text().await.unwrap();
        let value = if text.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_str(&text).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn non_post_method_returns_empty_404() {
        let base = spawn_test_server(test_world(false)).await;
        let resp = reqwest::Client::new()
            .get(format!("{base}/connect"))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::NOT_FOUND);
        assert!(resp.text().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_path_reports_unknown_request() {
        let base = spawn_test_server(test_world(false)).await;
        let (status, value) = post(&base, "/nope", "{}").await;
        assert_eq!(status, reqwest::StatusCode::OK);
        assert_eq!(value["success"], false);
        assert_eq!(value["message"], UNKNOWN_REQUEST_MESSAGE);
    }

    #[tokio::test]
    async fn connect_requires_vsid_on_visualized_world() {
        let base = spawn_test_server(test_world(true)).await;
        let (_, value) = post(&base, "/connect", r#"{"vsid":null,"username":"alice"}"#).await;
        assert_eq!(value["success"], false);
        assert_eq!(
            value["message"],
            "This server requires VSID to connect. None present."
        );
    }

    #[tokio::test]
    async fn connect_rejects_statically_reserved_vsid_with_its_own_message() {
        let base = spawn_test_server(test_world(false)).await;
        let (_, value) = post(
            &base,
            "/connect",
            r#"{"vsid":{"identifierStr":"EE","color":"Red"},"username":"alice"}"#,
        )
        .await;
        assert_eq!(value["success"], false);
        assert_eq!(value["message"], IDENTIFIER_RESERVED_MESSAGE);
    }

    #[tokio::test]
    async fn connect_rejects_overlong_vsid_text() {
        let base = spawn_test_server(test_world(false)).await;
        let (_, value) = post(
            &base,
            "/connect",
            r#"{"vsid":{"identifierStr":"abc","color":"Blue"},"username":"alice"}"#,
        )
        .await;
        assert_eq!(value["success"], false);
        assert_eq!(value["message"], INVALID_IDENTIFIER_MESSAGE);
    }

    #[tokio::test]
    async fn connect_and_move_round_trip() {
        let base = spawn_test_server(test_world(false)).await;
        let (_, connect_value) =
            post(&base, "/connect", r#"{"vsid":null,"username":"alice"}"#).await;
        assert_eq!(connect_value["success"], true);
        let sid = connect_value["sid"].as_str().unwrap().to_string();

        let move_body = format!(r#"{{"sid":"{sid}","dx":0,"dy":1}}"#);
        let (_, move_value) = post(&base, "/move", &move_body).await;
        assert_eq!(move_value["success"], true);
        assert_eq!(move_value["moved"], true);
        assert_eq!(move_value["alive"], true);
        assert_eq!(move_value["discovered"], serde_json::Value::Null);
    }

    #[tokio::test]
    async fn move_with_unknown_sid_is_rejected() {
        let base = spawn_test_server(test_world(false)).await;
        let (_, value) = post(&base, "/move", r#"{"sid":"does-not-exist","dx":0,"dy":1}"#).await;
        assert_eq!(value["success"], false);
        assert_eq!(value["message"], NO_LIVING_AGENT_MESSAGE);
    }

    #[tokio::test]
    async fn malformed_json_reports_uniform_exception_shape() {
        let base = spawn_test_server(test_world(false)).await;
        let (_, value) = post(&base, "/connect", "not json").await;
        assert_eq!(value["success"], false);
        assert!(value["message"]
            .as_str()
            .unwrap()
            .starts_with("Exception occured during request processing:"));
    }
}
