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

//! `World` ties a [`Grid`], a [`SessionRegistry`] and the per-session actors
//! together behind the one object a `ConnectionHandler` needs a handle to.
//! Everything on it is cheap to clone (an `Arc` wrapper), so each inbound
//! HTTP request just clones the `World` out of axum's `State`.

use crate::queue::{self, ActionHandle, ActorSink};
use crate::registry::{ConnectError, MoveError, SessionRegistry};
use crate::session::{LocalSession, SessionEvent};
use crate::{Sid, WorldEvent, WorldEventReceiver, WorldEventSender};
use crate::grid::Grid;
use gridrunner_common::VisualIdentifier;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Tunables with the §6/§10.3 defaults.
#[derive(Debug, Clone, Copy)]
pub struct WorldConfig {
    pub max_sessions_per_client: usize,
    pub idle_timeout: Duration,
    pub action_cooldown: Duration,
    /// Whether this world has a visualization sink attached; gates both the
    /// VSID-required-to-connect rule and the map-glyph VSID reservation.
    pub visualize: bool,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            max_sessions_per_client: 20,
            idle_timeout: Duration::from_secs(5),
            action_cooldown: Duration::from_millis(50),
            visualize: false,
        }
    }
}

struct WorldInner {
    grid: Arc<Grid>,
    registry: SessionRegistry,
    config: WorldConfig,
    events: WorldEventSender,
}

#[derive(Clone)]
pub struct World(Arc<WorldInner>);

impl ActorSink for WorldInner {
    fn publish(&self, sid: &str, event: SessionEvent) {
        let world_event = match event {
            SessionEvent::Moved { prev, curr } => WorldEvent::AgentMoved {
                sid: sid.to_string(),
                prev,
                curr,
            },
            SessionEvent::Died { reason } => WorldEvent::AgentDied {
                sid: sid.to_string(),
                reason,
            },
        };
        // A broadcast send only fails when there are no subscribers left,
        // which is a perfectly normal state (no visualizer, no log sink
        // attached yet) rather than an error worth surfacing.
        let _ = self.events.send(world_event);
    }

    fn touch_activity(&self, sid: &str) {
        self.registry.touch_activity(sid);
    }

    fn deregister(&self, sid: &str) {
        self.registry.deregister(sid);
    }
}

impl World {
    pub fn new(grid: Grid, config: WorldConfig) -> Self {
        let (events, _rx) = tokio::sync::broadcast::channel(crate::WORLD_EVENT_CHANNEL_CAPACITY);
        let inner = WorldInner {
            grid: Arc::new(grid),
            registry: SessionRegistry::new(config.max_sessions_per_client, config.visualize),
            config,
            events,
        };
        Self(Arc::new(inner))
    }

    pub fn subscribe(&self) -> WorldEventReceiver {
        self.0.events.subscribe()
    }

    pub fn config(&self) -> WorldConfig {
        self.0.config
    }

    /// Glyphs used by trap tiles on this world's map, for the map-derived
    /// VSID reservation check the `ConnectionHandler` runs before calling
    /// `connect`.
    pub fn trap_glyphs(&self) -> Vec<String> {
        self.0.grid.trap_glyphs()
    }

    /// Admit a new session. Mirrors §4.3's `Connect` contract: validation
    /// happens under the registry's mutex, then (only on success) a fresh
    /// actor is spawned and wired in.
    pub fn connect(
        &self,
        client_id: String,
        identifier: Option<VisualIdentifier>,
    ) -> Result<Sid, ConnectError> {
        self.0
            .registry
            .check_admission(&client_id, &identifier)?;

        let sid = Uuid::new_v4().simple().to_string();
        let session = LocalSession::new(self.0.grid.clone());
        let handle: ActionHandle = queue::spawn(
            sid.clone(),
            session,
            self.0.config.action_cooldown,
            self.0.clone(),
        );

        self.0
            .registry
            .insert(sid.clone(), client_id, identifier, handle)?;
        Ok(sid)
    }

    pub fn notify_connected(
        &self,
        sid: Sid,
        client_id: String,
        username: String,
        identifier: Option<VisualIdentifier>,
    ) {
        let _ = self.0.events.send(WorldEvent::SessionConnected {
            sid,
            client_id,
            username,
            identifier,
        });
    }

    /// Enqueue a `/move` and await its outcome, mirroring §4.3's `Move`
    /// contract: an unknown `sid` fails fast without touching the registry's
    /// actor machinery at all.
    pub async fn move_session(
        &self,
        sid: &str,
        dx: i32,
        dy: i32,
    ) -> Result<queue::MoveReply, MoveError> {
        let handle = self.0.registry.action_handle(sid)?;
        handle
            .r#move(gridrunner_common::Vector::new(dx, dy))
            .await
            .ok_or(MoveError::UnknownSid)
    }

    /// Run the idle sweep once: used both by the background task (every 1s)
    /// and directly by tests that want a deterministic tick.
    pub fn sweep_idle(&self) {
        for (sid, handle) in self.0.registry.idle_actions(self.0.config.idle_timeout) {
            tracing::info!(%sid, "evicting idle session");
            handle.kill(crate::session::DeathReason::InactiveTooLong);
        }
    }

    pub fn live_session_count(&self) -> usize {
        self.0.registry.live_session_count()
    }
}
