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

//! §4.7: boots one `ConnectionHandler` (HTTP listener) plus one idle sweeper
//! and one logging sink per configured world, and coordinates their shutdown
//! through a single shared [`CancellationToken`].

use crate::config::WorldSpec;
use crate::connection;
use crate::logging_sink;
use gridrunner_world::world::WorldConfig;
use gridrunner_world::{Grid, World};
use std::net::SocketAddr;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::info;

#[derive(Debug, thiserror::Error)]
pub enum WorldHostError {
    #[error("failed to load map for world {name:?}: {source}")]
    MapLoad {
        name: String,
        #[source]
        source: gridrunner_world::GridError,
    },
    #[error("failed to bind listener for world {name:?} on port {port}: {source}")]
    Bind {
        name: String,
        port: u16,
        #[source]
        source: std::io::Error,
    },
}

/// Tunables shared by every world (the per-client/idle/cooldown defaults),
/// as distinct from the per-world `WorldSpec` (name/port/map/visualize).
#[derive(Debug, Clone, Copy)]
pub struct HostDefaults {
    pub max_sessions_per_client: usize,
    pub idle_timeout: Duration,
    pub action_cooldown: Duration,
}

/// Boot every configured world and return once all of their listeners are
/// bound (so the caller knows startup either fully succeeded or failed
/// before any socket was opened). Runs until `shutdown` is cancelled.
pub async fn run(
    specs: Vec<WorldSpec>,
    defaults: HostDefaults,
    shutdown: CancellationToken,
) -> Result<(), WorldHostError> {
    let mut join_handles = Vec::new();

    for spec in specs {
        let grid = Grid::load_from_image(&spec.map_path).map_err(|source| WorldHostError::MapLoad {
            name: spec.name.clone(),
            source,
        })?;

        let config = WorldConfig {
            max_sessions_per_client: defaults.max_sessions_per_client,
            idle_timeout: defaults.idle_timeout,
            action_cooldown: defaults.action_cooldown,
            visualize: spec.visualize,
        };
        let world = World::new(grid, config);

        let addr: SocketAddr = ([0, 0, 0, 0], spec.port).into();
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|source| WorldHostError::Bind {
                name: spec.name.clone(),
                port: spec.port,
                source,
            })?;
        info!(world = %spec.name, %addr, visualize = spec.visualize, "world listening");

        let app = connection::router(world.clone());
        let serve_shutdown = shutdown.clone();
        join_handles.push(tokio::spawn(async move {
            let service = app.into_make_service_with_connect_info::<SocketAddr>();
            axum::serve(listener, service)
                .with_graceful_shutdown(async move { serve_shutdown.cancelled().await })
                .await
                .expect("axum server task failed");
        }));

        join_handles.push(gridrunner_world::idle::spawn(world.clone(), shutdown.clone()));
        join_handles.push(logging_sink::spawn(spec.name.clone(), world, shutdown.clone()));
    }

    shutdown.cancelled().await;
    for handle in join_handles {
        let _ = handle.await;
    }
    Ok(())
}
