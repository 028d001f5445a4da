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

//! The per-session actor that serializes `/move` handling (§4.4, §9:
//! "task-chaining per session becomes a small per-session actor"). Each live
//! session gets exactly one actor task, fed by an unbounded MPSC channel;
//! because the channel has a single consumer, messages are applied to the
//! `LocalSession` in the order they were enqueued, which is I6 for free.

use crate::session::{DeathReason, LocalSession, SessionEvent};
use crate::Sid;
use gridrunner_common::Vector;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

/// Outcome of a queued `/move`, stripped down to what the HTTP layer needs
/// to serialize back to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveReply {
    pub moved: bool,
    pub alive: bool,
    pub discovered: Option<gridrunner_common::Tile>,
}

enum ActionMsg {
    Move {
        v: Vector,
        reply: oneshot::Sender<MoveReply>,
    },
    Kill {
        reason: DeathReason,
    },
}

/// A cheaply-cloneable reference to a session's actor mailbox. Holding one
/// does not keep the actor alive; once the actor's receiver drops (after the
/// session dies), sends silently fail and the caller should treat the sid as
/// gone, which matches "unknown sid" handling in practice since the registry
/// removes the entry in the same breath the actor exits.
#[derive(Clone)]
pub struct ActionHandle {
    tx: mpsc::UnboundedSender<ActionMsg>,
}

impl ActionHandle {
    /// A handle with no actor behind it, for registry unit tests that only
    /// exercise admission bookkeeping and never actually enqueue a move.
    #[cfg(test)]
    pub fn dangling_for_test() -> Self {
        let (tx, _rx) = mpsc::unbounded_channel();
        Self { tx }
    }

    /// Enqueue a move and await its reply. Returns `None` if the actor has
    /// already exited (the session died between the registry lookup and
    /// this call), which callers should treat the same as an unknown sid.
    pub async fn r#move(&self, v: Vector) -> Option<MoveReply> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx.send(ActionMsg::Move { v, reply: reply_tx }).ok()?;
        reply_rx.await.ok()
    }

    /// Fire-and-forget kill, used by the idle sweeper. No reply: the actor
    /// publishes the `Died` event and exits on its own.
    pub fn kill(&self, reason: DeathReason) {
        let _ = self.tx.send(ActionMsg::Kill { reason });
    }
}

/// What the actor needs to do its job beyond the `LocalSession` itself:
/// somewhere to publish events, somewhere to report a live activity tick,
/// and somewhere to deregister itself once the session dies.
pub trait ActorSink: Send + Sync + 'static {
    fn publish(&self, sid: &str, event: SessionEvent);
    fn touch_activity(&self, sid: &str);
    fn deregister(&self, sid: &str);
}

/// Spawn the actor task owning `session` and return the handle callers use
/// to talk to it. The task runs until the session dies (either from a lethal
/// move or a `Kill`), then exits; its mailbox is simply dropped, so any
/// message racing in after that point is a silent no-op.
pub fn spawn(
    sid: Sid,
    mut session: LocalSession,
    cooldown: Duration,
    sink: Arc<dyn ActorSink>,
) -> ActionHandle {
    let (tx, mut rx) = mpsc::unbounded_channel::<ActionMsg>();
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            match msg {
                ActionMsg::Move { v, reply } => {
                    let outcome = session.move_agent(v);
                    for event in &outcome.events {
                        sink.publish(&sid, *event);
                    }
                    if outcome.alive && outcome.moved {
                        sink.touch_activity(&sid);
                    }
                    let died = !outcome.alive;
                    tokio::time::sleep(cooldown).await;
                    let _ = reply.send(MoveReply {
                        moved: outcome.moved,
                        alive: outcome.alive,
                        discovered: outcome.discovered,
                    });
                    if died {
                        sink.deregister(&sid);
                        break;
                    }
                }
                ActionMsg::Kill { reason } => {
                    if let Some(event) = session.kill(reason) {
                        sink.publish(&sid, event);
                        sink.deregister(&sid);
                    }
                    break;
                }
            }
        }
    });
    ActionHandle { tx }
}
