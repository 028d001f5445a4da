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

//! The JSON wire format for `/connect` and `/move`, as seen by clients. These
//! types carry no behavior beyond (de)serialization; validation lives in
//! `VisualIdentifier`, `sanitize_username`, and the session core.

use crate::{Tile, TileWire, VisualIdentifier};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct ConnectRequest {
    pub vsid: Option<VisualIdentifier>,
    #[serde(default)]
    pub username: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ConnectResponse {
    Success { success: bool, sid: String },
    Failure { success: bool, message: String },
}

impl ConnectResponse {
    pub fn success(sid: impl Into<String>) -> Self {
        ConnectResponse::Success {
            success: true,
            sid: sid.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        ConnectResponse::Failure {
            success: false,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MoveRequest {
    pub sid: String,
    pub dx: i32,
    pub dy: i32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum MoveResponse {
    Executed {
        success: bool,
        moved: bool,
        alive: bool,
        discovered: Option<TileWire>,
    },
    Failure {
        success: bool,
        message: String,
    },
}

impl MoveResponse {
    pub fn executed(moved: bool, alive: bool, discovered: Option<Tile>) -> Self {
        MoveResponse::Executed {
            success: true,
            moved,
            alive,
            discovered: discovered.map(TileWire::from),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        MoveResponse::Failure {
            success: false,
            message: message.into(),
        }
    }
}

/// Uniform error shape for every failure class that isn't `BadMethod` (which
/// has no body at all) -- malformed JSON, body-read timeouts, and unknown
/// routes all serialize through this.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }

    pub fn exception(msg: impl std::fmt::Display) -> Self {
        Self::new(format!("Exception occured during request processing: {msg}"))
    }
}

pub const UNKNOWN_REQUEST_MESSAGE: &str = "Unknown request";
pub const NO_LIVING_AGENT_MESSAGE: &str = "No living agent with requested session ID";
pub const VSID_REQUIRED_MESSAGE: &str = "This server requires VSID to connect. None present.";
pub const IDENTIFIER_IN_USE_MESSAGE: &str = "Identifier already in use";
pub const TOO_MANY_SESSIONS_MESSAGE: &str = "Too many sessions";

/// §6/§7 enumerate exact strings for four `ConnectRejected` subtypes (VSID
/// required, identifier in use, too many sessions) but not for a VSID that
/// fails shape or reservation validation; there's no `original_source` to
/// check for this one. These two are this implementation's own literal
/// strings for that subtype, kept distinct from the generic
/// `ErrorResponse::exception` wrapper since they're a `ConnectRejected`, not
/// a caught exception.
pub const INVALID_IDENTIFIER_MESSAGE: &str = "Invalid identifier";
pub const IDENTIFIER_RESERVED_MESSAGE: &str = "Identifier is reserved";
