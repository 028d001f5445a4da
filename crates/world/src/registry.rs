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

//! Per-world bookkeeping: which `sid`s are live, which client owns which
//! `sid`s, and which `(text, color)` VSIDs are already taken. Everything here
//! is guarded by a single synchronous [`std::sync::Mutex`] (§5): lookups,
//! insertions and removals never suspend, so the mutex is never held across
//! an `.await`.

use crate::queue::ActionHandle;
use crate::Sid;
use gridrunner_common::{Color, VisualIdentifier};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Instant;

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum ConnectError {
    #[error("This server requires VSID to connect. None present.")]
    VsidRequired,
    #[error("Identifier already in use")]
    IdentifierInUse,
    #[error("Too many sessions")]
    TooManySessions,
}

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum MoveError {
    #[error("No living agent with requested session ID")]
    UnknownSid,
}

/// What the registry keeps about one live session, independent of the
/// `LocalSession` state itself (which only the owning `ActionQueue` actor
/// touches).
struct SessionEntry {
    client_id: String,
    identifier: Option<VisualIdentifier>,
    last_activity: Instant,
    actions: ActionHandle,
}

#[derive(Default)]
struct Inner {
    sessions: HashMap<Sid, SessionEntry>,
    client_sessions: HashMap<String, HashSet<Sid>>,
    vsid_index: HashSet<(String, Color)>,
}

pub struct SessionRegistry {
    inner: Mutex<Inner>,
    max_sessions_per_client: usize,
    requires_vsid: bool,
}

impl SessionRegistry {
    pub fn new(max_sessions_per_client: usize, requires_vsid: bool) -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            max_sessions_per_client,
            requires_vsid,
        }
    }

    pub fn requires_vsid(&self) -> bool {
        self.requires_vsid
    }

    /// Validate and reserve a spot for a new session, without yet knowing its
    /// `sid` or spawning its actor: those happen in `attach_actor` once the
    /// caller has constructed the `LocalSession` and its actor. Splitting
    /// admission this way keeps `Connect` atomic under the single mutex
    /// while letting the actor-spawn (which touches the async runtime)
    /// happen outside the lock.
    pub fn check_admission(
        &self,
        client_id: &str,
        identifier: &Option<VisualIdentifier>,
    ) -> Result<(), ConnectError> {
        if self.requires_vsid && identifier.is_none() {
            return Err(ConnectError::VsidRequired);
        }
        let inner = self.inner.lock().expect("world mutex poisoned");
        if let Some(id) = identifier {
            if inner.vsid_index.contains(&id.key()) {
                return Err(ConnectError::IdentifierInUse);
            }
        }
        let count = inner
            .client_sessions
            .get(client_id)
            .map(|s| s.len())
            .unwrap_or(0);
        if count >= self.max_sessions_per_client {
            return Err(ConnectError::TooManySessions);
        }
        Ok(())
    }

    /// Insert the fully-constructed session record. Called immediately after
    /// `check_admission` succeeded and the actor has been spawned; re-checks
    /// the same invariants so a racing `Connect` cannot slip in between the
    /// two calls (the mutex is held across both the re-check and the
    /// insertion here).
    pub fn insert(
        &self,
        sid: Sid,
        client_id: String,
        identifier: Option<VisualIdentifier>,
        actions: ActionHandle,
    ) -> Result<(), ConnectError> {
        let mut inner = self.inner.lock().expect("world mutex poisoned");
        if let Some(id) = &identifier {
            if inner.vsid_index.contains(&id.key()) {
                return Err(ConnectError::IdentifierInUse);
            }
        }
        let count = inner
            .client_sessions
            .get(&client_id)
            .map(|s| s.len())
            .unwrap_or(0);
        if count >= self.max_sessions_per_client {
            return Err(ConnectError::TooManySessions);
        }
        if let Some(id) = &identifier {
            inner.vsid_index.insert(id.key());
        }
        inner
            .client_sessions
            .entry(client_id.clone())
            .or_default()
            .insert(sid.clone());
        inner.sessions.insert(
            sid,
            SessionEntry {
                client_id,
                identifier,
                last_activity: Instant::now(),
                actions,
            },
        );
        Ok(())
    }

    /// Look up the handle to enqueue a `/move` onto, without touching
    /// `lastActivity` (that only advances on a move that actually executed
    /// and left the agent alive, per I5, which the actor reports back via
    /// `touch_activity`).
    pub fn action_handle(&self, sid: &str) -> Result<ActionHandle, MoveError> {
        let inner = self.inner.lock().expect("world mutex poisoned");
        inner
            .sessions
            .get(sid)
            .map(|e| e.actions.clone())
            .ok_or(MoveError::UnknownSid)
    }

    pub fn touch_activity(&self, sid: &str) {
        let mut inner = self.inner.lock().expect("world mutex poisoned");
        if let Some(entry) = inner.sessions.get_mut(sid) {
            entry.last_activity = Instant::now();
        }
    }

    /// Remove a session from every index (I4): called exactly once, from the
    /// `Died` path, regardless of whether death came from a move or from the
    /// idle sweeper.
    pub fn deregister(&self, sid: &str) {
        let mut inner = self.inner.lock().expect("world mutex poisoned");
        let Some(entry) = inner.sessions.remove(sid) else {
            tracing::error!(%sid, "deregister called for unknown sid");
            return;
        };
        if let Some(id) = &entry.identifier {
            inner.vsid_index.remove(&id.key());
        }
        if let Some(set) = inner.client_sessions.get_mut(&entry.client_id) {
            set.remove(sid);
            if set.is_empty() {
                inner.client_sessions.remove(&entry.client_id);
            }
        }
    }

    /// Sids whose last recorded activity is older than `idle_timeout`, for
    /// the `IdleSweeper`. Returns handles rather than killing them directly
    /// so the caller can send `Kill` outside the world mutex.
    pub fn idle_actions(&self, idle_timeout: std::time::Duration) -> Vec<(Sid, ActionHandle)> {
        let now = Instant::now();
        let inner = self.inner.lock().expect("world mutex poisoned");
        inner
            .sessions
            .iter()
            .filter(|(_, e)| now.duration_since(e.last_activity) > idle_timeout)
            .map(|(sid, e)| (sid.clone(), e.actions.clone()))
            .collect()
    }

    pub fn live_session_count(&self) -> usize {
        self.inner.lock().expect("world mutex poisoned").sessions.len()
    }

    pub fn live_sessions_for_client(&self, client_id: &str) -> usize {
        self.inner
            .lock()
            .expect("world mutex poisoned")
            .client_sessions
            .get(client_id)
            .map(|s| s.len())
            .unwrap_or(0)
    }
}
