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

//! §10.1/§9: the tracing sink is "just another subscriber" on a world's event
//! stream, alongside whatever visualization sink is attached. It never
//! blocks the core: it owns its own broadcast receiver and falls behind
//! independently if logging is slow.

use gridrunner_world::{World, WorldEvent};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Spawn a task that logs every event a world's registry/actors publish,
/// until the shared shutdown token fires.
pub fn spawn(world_name: String, world: World, shutdown: CancellationToken) -> tokio::task::JoinHandle<()> {
    let mut events = world.subscribe();
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                received = events.recv() => {
                    match received {
                        Ok(event) => log_event(&world_name, event),
                        Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                            warn!(world = %world_name, skipped, "log sink lagged behind world events");
                        }
                        Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                    }
                }
            }
        }
    })
}

fn log_event(world_name: &str, event: WorldEvent) {
    match event {
        WorldEvent::SessionConnected {
            sid,
            client_id,
            username,
            identifier,
        } => {
            info!(
                world = %world_name,
                %sid, %client_id, %username, ?identifier, "session connected"
            );
        }
        WorldEvent::AgentMoved { sid, prev, curr } => {
            tracing::debug!(world = %world_name, %sid, ?prev, ?curr, "agent moved");
        }
        WorldEvent::AgentDied { sid, reason } => {
            info!(world = %world_name, %sid, reason = reason.message(), "agent died");
        }
    }
}
