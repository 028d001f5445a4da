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

//! End-to-end HTTP scenarios driven over a real socket, mirroring the
//! concrete walkthroughs in the spec's testable-properties section: a
//! visualized 3x3 world with a single trap at (1,0).

use gridrunner_world::world::WorldConfig;
use gridrunner_world::{Cell, Grid, World};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;

async fn spawn_world(world: World) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = gridrunner_host::connection::router(world);
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

fn trap_world(config: WorldConfig) -> World {
    let mut cells = vec![Cell::Empty; 9];
    cells[1] = Cell::Trap(gridrunner_common::Tile::trap());
    let grid = Grid::from_cells(3, 3, cells);
    World::new(grid, config)
}

async fn post(base: &str, path: &str, body: serde_json::Value) -> serde_json::Value {
    let resp = reqwest::Client::new()
        .post(format!("{base}{path}"))
        .json(&body)
        .send()
        .await
        .unwrap();
    resp.json().await.unwrap()
}

#[tokio::test]
async fn visualized_world_walkthrough_matches_spec_scenarios() {
    let config = WorldConfig {
        max_sessions_per_client: 20,
        idle_timeout: Duration::from_secs(5),
        action_cooldown: Duration::from_millis(1),
        visualize: true,
    };
    let base = spawn_world(trap_world(config)).await;

    // 1. Connect without VSID is rejected on a visualized world.
    let resp = post(
        &base,
        "/connect",
        serde_json::json!({"vsid": null, "username": "alice"}),
    )
    .await;
    assert_eq!(resp["success"], false);
    assert_eq!(
        resp["message"],
        "This server requires VSID to connect. None present."
    );

    // 2. Connect with a vsid succeeds; a duplicate vsid from anyone is rejected.
    let resp = post(
        &base,
        "/connect",
        serde_json::json!({"vsid": {"identifierStr": "[]", "color": "Magenta"}, "username": "alice"}),
    )
    .await;
    assert_eq!(resp["success"], true);
    let sid = resp["sid"].as_str().unwrap().to_string();

    let dup = post(
        &base,
        "/connect",
        serde_json::json!({"vsid": {"identifierStr": "[]", "color": "Magenta"}, "username": "bob"}),
    )
    .await;
    assert_eq!(dup["success"], false);
    assert_eq!(dup["message"], "Identifier already in use");

    // 3. A safe move succeeds.
    let resp = post(
        &base,
        "/move",
        serde_json::json!({"sid": sid, "dx": 0, "dy": 1}),
    )
    .await;
    assert_eq!(resp["success"], true);
    assert_eq!(resp["moved"], true);
    assert_eq!(resp["alive"], true);
    assert_eq!(resp["discovered"], serde_json::Value::Null);

    // 4. An inadmissible vector is rejected without moving the agent.
    let resp = post(
        &base,
        "/move",
        serde_json::json!({"sid": sid, "dx": 1, "dy": -1}),
    )
    .await;
    assert_eq!(resp["moved"], false);
    assert_eq!(resp["alive"], true);

    // 5. Return to (0,0), then step onto the trap at (1,0) and die.
    let resp = post(
        &base,
        "/move",
        serde_json::json!({"sid": sid, "dx": 0, "dy": -1}),
    )
    .await;
    assert_eq!(resp["alive"], true);

    let resp = post(
        &base,
        "/move",
        serde_json::json!({"sid": sid, "dx": 1, "dy": 0}),
    )
    .await;
    assert_eq!(resp["moved"], true);
    assert_eq!(resp["alive"], false);
    assert_eq!(resp["discovered"]["str"], "##");

    let resp = post(
        &base,
        "/move",
        serde_json::json!({"sid": sid, "dx": 0, "dy": 0}),
    )
    .await;
    assert_eq!(resp["success"], false);
    assert_eq!(
        resp["message"],
        "No living agent with requested session ID"
    );
}

#[tokio::test]
async fn headless_world_enforces_per_client_quota_of_twenty() {
    let config = WorldConfig {
        max_sessions_per_client: 20,
        idle_timeout: Duration::from_secs(5),
        action_cooldown: Duration::from_millis(1),
        visualize: false,
    };
    let base = spawn_world(trap_world(config)).await;

    for _ in 0..20 {
        let resp = post(
            &base,
            "/connect",
            serde_json::json!({"vsid": null, "username": "grinder"}),
        )
        .await;
        assert_eq!(resp["success"], true);
    }

    let resp = post(
        &base,
        "/connect",
        serde_json::json!({"vsid": null, "username": "grinder"}),
    )
    .await;
    assert_eq!(resp["success"], false);
    assert_eq!(resp["message"], "Too many sessions");
}

#[tokio::test]
async fn idle_session_is_evicted_after_timeout() {
    let config = WorldConfig {
        max_sessions_per_client: 20,
        idle_timeout: Duration::from_millis(100),
        action_cooldown: Duration::from_millis(1),
        visualize: false,
    };
    let world = trap_world(config);
    let base = spawn_world(world.clone()).await;

    let resp = post(
        &base,
        "/connect",
        serde_json::json!({"vsid": null, "username": "idler"}),
    )
    .await;
    let sid = resp["sid"].as_str().unwrap().to_string();

    tokio::time::sleep(Duration::from_millis(250)).await;
    world.sweep_idle();
    tokio::time::sleep(Duration::from_millis(50)).await;

    let resp = post(
        &base,
        "/move",
        serde_json::json!({"sid": sid, "dx": 0, "dy": 0}),
    )
    .await;
    assert_eq!(resp["success"], false);
    assert_eq!(
        resp["message"],
        "No living agent with requested session ID"
    );
}
