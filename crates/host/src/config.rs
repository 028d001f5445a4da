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

//! §10.3: CLI flags via `clap`, plus an optional JSON manifest that overrides
//! the single-world default derived from those flags.

use clap_derive::Parser;
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(about = "Gridrunner world host: a multi-world HTTP exploration game server")]
pub struct Args {
    #[arg(
        long,
        value_name = "resources-path",
        help = "Base directory maps are resolved relative to",
        default_value = "."
    )]
    pub resources_path: PathBuf,

    #[arg(
        long,
        value_name = "map",
        help = "Path (relative to resources-path) of the raster map for the default world",
        default_value = "map.png"
    )]
    pub map: PathBuf,

    #[arg(long, value_name = "port", help = "Listen port for the default world", default_value_t = 8080)]
    pub port: u16,

    #[arg(
        long,
        value_name = "challenge-port-start",
        help = "First port assigned to extra worlds declared without an explicit port in the manifest",
        default_value_t = 8081
    )]
    pub challenge_port_start: u16,

    #[arg(
        long,
        help = "Disable the visualization hook: no world will require a VSID to connect",
        default_value_t = false
    )]
    pub no_visualizer: bool,

    #[arg(
        long,
        value_name = "max-sessions-per-client",
        default_value_t = 20
    )]
    pub max_sessions_per_client: usize,

    #[arg(long, value_name = "idle-timeout-secs", default_value_t = 5)]
    pub idle_timeout_secs: u64,

    #[arg(long, value_name = "cooldown-ms", default_value_t = 50)]
    pub cooldown_ms: u64,

    #[arg(
        long,
        value_name = "manifest",
        help = "Path to a JSON manifest listing {name,color,port,map,visualize} world entries; \
                overrides the single default-world configuration derived from the other flags"
    )]
    pub manifest: Option<PathBuf>,

    #[arg(long, help = "Enable debug logging", default_value_t = false)]
    pub debug: bool,
}

/// One entry of the optional JSON manifest (§6): `{name, color, port, map,
/// visualize}`. `color` is presentational only (used by a visualizer sink);
/// the core does not interpret it.
#[derive(Debug, Clone, Deserialize)]
pub struct ManifestEntry {
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
    pub map: PathBuf,
    #[serde(default)]
    pub visualize: bool,
}

/// A fully-resolved world to boot: manifest-derived or synthesized from
/// plain `Args`.
#[derive(Debug, Clone)]
pub struct WorldSpec {
    pub name: String,
    pub port: u16,
    pub map_path: PathBuf,
    pub visualize: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read manifest at {path}: {source}")]
    ManifestRead {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse manifest at {path}: {source}")]
    ManifestParse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("manifest declares {0} worlds with visualize=true; at most one is allowed")]
    MultipleVisualizers(usize),
}

/// Resolve the list of worlds to boot, either from the manifest file (if
/// given) or by synthesizing a single default world from the plain CLI
/// flags. Either way, `--no-visualizer` forces every world's `visualize` to
/// `false` regardless of what the manifest says, and at most one
/// `visualize: true` world is accepted.
pub fn resolve_worlds(args: &Args) -> Result<Vec<WorldSpec>, ConfigError> {
    let mut worlds = match &args.manifest {
        Some(manifest_path) => load_manifest(manifest_path, args.challenge_port_start)?,
        None => vec![WorldSpec {
            name: "default".to_string(),
            port: args.port,
            map_path: args.resources_path.join(&args.map),
            visualize: !args.no_visualizer,
        }],
    };

    if args.no_visualizer {
        for world in &mut worlds {
            world.visualize = false;
        }
    }

    let visualizer_count = worlds.iter().filter(|w| w.visualize).count();
    if visualizer_count > 1 {
        return Err(ConfigError::MultipleVisualizers(visualizer_count));
    }

    Ok(worlds)
}

/// Load the manifest and assign concrete ports. Entries that name an explicit
/// `port` keep it; entries that don't get the next port starting from
/// `challenge_port_start`, in manifest order, skipping any port an explicit
/// entry already claimed.
fn load_manifest(path: &PathBuf, challenge_port_start: u16) -> Result<Vec<WorldSpec>, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::ManifestRead {
        path: path.display().to_string(),
        source,
    })?;
    let entries: Vec<ManifestEntry> =
        serde_json::from_str(&text).map_err(|source| ConfigError::ManifestParse {
            path: path.display().to_string(),
            source,
        })?;

    let explicit_ports: std::collections::HashSet<u16> =
        entries.iter().filter_map(|e| e.port).collect();
    let mut next_port = challenge_port_start;

    Ok(entries
        .into_iter()
        .map(|e| {
            let port = e.port.unwrap_or_else(|| {
                while explicit_ports.contains(&next_port) {
                    next_port += 1;
                }
                let assigned = next_port;
                next_port += 1;
                assigned
            });
            WorldSpec {
                name: e.name,
                port,
                map_path: e.map,
                visualize: e.visualize,
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_args() -> Args {
        Args {
            resources_path: PathBuf::from("."),
            map: PathBuf::from("map.png"),
            port: 8080,
            challenge_port_start: 8081,
            no_visualizer: false,
            max_sessions_per_client: 20,
            idle_timeout_secs: 5,
            cooldown_ms: 50,
            manifest: None,
            debug: false,
        }
    }

    #[test]
    fn default_single_world_requires_vsid_unless_no_visualizer() {
        let worlds = resolve_worlds(&base_args()).unwrap();
        assert_eq!(worlds.len(), 1);
        assert!(worlds[0].visualize);

        let mut args = base_args();
        args.no_visualizer = true;
        let worlds = resolve_worlds(&args).unwrap();
        assert!(!worlds[0].visualize);
    }

    #[test]
    fn manifest_with_two_visualizers_fails_to_resolve() {
        let dir = tempfile::tempdir().unwrap();
        let manifest_path = dir.path().join("worlds.json");
        std::fs::write(
            &manifest_path,
            r#"[
                {"name":"a","port":9001,"map":"a.png","visualize":true},
                {"name":"b","port":9002,"map":"b.png","visualize":true}
            ]"#,
        )
        .unwrap();
        let mut args = base_args();
        args.manifest = Some(manifest_path);
        let err = resolve_worlds(&args).unwrap_err();
        assert!(matches!(err, ConfigError::MultipleVisualizers(2)));
    }

    #[test]
    fn no_visualizer_flag_overrides_manifest_entries() {
        let dir = tempfile::tempdir().unwrap();
        let manifest_path = dir.path().join("worlds.json");
        std::fs::write(
            &manifest_path,
            r#"[{"name":"a","port":9001,"map":"a.png","visualize":true}]"#,
        )
        .unwrap();
        let mut args = base_args();
        args.manifest = Some(manifest_path);
        args.no_visualizer = true;
        let worlds = resolve_worlds(&args).unwrap();
        assert!(!worlds[0].visualize);
    }

    #[test]
    fn manifest_entries_without_a_port_are_assigned_from_challenge_port_start() {
        let dir = tempfile::tempdir().unwrap();
        let manifest_path = dir.path().join("worlds.json");
        std::fs::write(
            &manifest_path,
            r#"[
                {"name":"a","map":"a.png"},
                {"name":"b","port":8081,"map":"b.png"},
                {"name":"c","map":"c.png"}
            ]"#,
        )
        .unwrap();
        let mut args = base_args();
        args.manifest = Some(manifest_path);
        args.challenge_port_start = 8081;
        let worlds = resolve_worlds(&args).unwrap();
        // "a" claims 8081 first, but "b" explicitly reserves it, so "a" skips
        // ahead to the next free port and "c" continues after that.
        assert_eq!(worlds[0].port, 8082);
        assert_eq!(worlds[1].port, 8081);
        assert_eq!(worlds[2].port, 8083);
    }
}
