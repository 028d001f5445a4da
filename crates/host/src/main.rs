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

use clap::Parser;
use gridrunner_host::config::{self, Args};
use gridrunner_host::host::{self, HostDefaults};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::info;

#[tokio::main(flavor = "multi_thread")]
async fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    gridrunner_common::tracing_init::init_tracing(args.debug)?;

    let worlds = config::resolve_worlds(&args)?;
    info!(count = worlds.len(), "resolved world manifest");

    let defaults = HostDefaults {
        max_sessions_per_client: args.max_sessions_per_client,
        idle_timeout: Duration::from_secs(args.idle_timeout_secs),
        action_cooldown: Duration::from_millis(args.cooldown_ms),
    };

    let shutdown = CancellationToken::new();
    let ctrl_c_shutdown = shutdown.clone();
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        info!("shutdown signal received");
        ctrl_c_shutdown.cancel();
    });

    host::run(worlds, defaults, shutdown).await?;
    Ok(())
}
