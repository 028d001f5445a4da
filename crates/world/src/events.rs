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

//! The typed observer streams a world exposes to presentation layers (§9):
//! a `tracing` sink and an optional visualizer both subscribe to the same
//! [`tokio::sync::broadcast`] channel rather than the core holding a mutable
//! list of callbacks.

use crate::session::DeathReason;
use crate::Sid;
use gridrunner_common::{VisualIdentifier, Vector};

/// Everything a presentation sink might want to know about, fired by the
/// registry and the per-session actors. Subscribers must not block: the
/// broadcast channel has a bounded backlog and a slow subscriber only misses
/// older events (see [`tokio::sync::broadcast::error::RecvError::Lagged`]),
/// it never stalls the core.
#[derive(Debug, Clone)]
pub enum WorldEvent {
    SessionConnected {
        sid: Sid,
        client_id: String,
        username: String,
        identifier: Option<VisualIdentifier>,
    },
    AgentMoved {
        sid: Sid,
        prev: Vector,
        curr: Vector,
    },
    AgentDied {
        sid: Sid,
        reason: DeathReason,
    },
}

pub type WorldEventSender = tokio::sync::broadcast::Sender<WorldEvent>;
pub type WorldEventReceiver = tokio::sync::broadcast::Receiver<WorldEvent>;

/// Backlog depth for the world event broadcast channel: generous enough that
/// a logging sink never lags under normal load, without unbounded growth if a
/// subscriber disappears.
pub const WORLD_EVENT_CHANNEL_CAPACITY: usize = 1024;
