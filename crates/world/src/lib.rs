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

//! The session core: one process-unique `sid` per agent, one `LocalSession`
//! per `sid`, one `ActionQueue` actor serializing moves onto it, and one
//! `SessionRegistry` per world tying them together. `ConnectionHandler` (in
//! the `gridrunner-host` crate) is the only thing that talks to a `World`
//! from the outside.

pub mod events;
pub mod grid;
pub mod idle;
pub mod queue;
pub mod registry;
pub mod session;
pub mod world;

pub use events::{WorldEvent, WorldEventReceiver, WorldEventSender, WORLD_EVENT_CHANNEL_CAPACITY};
pub use grid::{Cell, Grid, GridError};
pub use registry::{ConnectError, MoveError};
pub use session::{DeathReason, LocalSession, MoveOutcome, SessionEvent};
pub use world::{World, WorldConfig};

/// A server-assigned opaque session identifier, unique across every world
/// for the lifetime of the process (I1). Plain `String` rather than a
/// newtype: it crosses the wire verbatim and every consumer (registry,
/// queue, wire codec) just needs `Eq + Hash + Clone`.
pub type Sid = String;
