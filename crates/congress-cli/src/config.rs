//! Layered configuration: config file < environment < flags.
//!
//! Environment and flags are merged by clap (`env = ...` on each argument),
//! so only the file layer is handled here.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use congress_graph::GraphConfig;

use crate::commands::ConnectionArgs;

/// Contents of a `--config` file.
///
/// ```toml
/// data_dir = "data"
/// batch_size = 50
///
/// [neo4j]
/// uri = "bolt://localhost:7687"
/// user = "neo4j"
/// password = "secret"
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub data_dir: Option<PathBuf>,
    pub batch_size: Option<usize>,
    #[serde(default)]
    pub neo4j: FileConnection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConnection {
    pub uri: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub database: Option<String>,
    pub max_connections: Option<usize>,
}

impl FileConfig {
    /// Load the config file, or the empty layer when none was given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("Invalid config file {}", path.display()))
    }
}

/// Merge the connection layers into a complete [`GraphConfig`].
///
/// Fails when uri, user or password is set in no layer.
pub fn resolve_connection(file: &FileConnection, args: &ConnectionArgs) -> Result<GraphConfig> {
    let defaults = GraphConfig::default();
    let pick = |flag: &Option<String>, file: &Option<String>| flag.clone().or_else(|| file.clone());

    let uri = pick(&args.uri, &file.uri);
    let user = pick(&args.user, &file.user);
    let password = pick(&args.password, &file.password);

    let (Some(uri), Some(user), Some(password)) = (uri, user, password) else {
        bail!(
            "Missing Neo4j connection settings. Set NEO4J_URI, NEO4J_USERNAME and \
             NEO4J_PASSWORD (or pass --uri, --user and --password)"
        );
    };

    Ok(GraphConfig {
        uri,
        user,
        password,
        database: pick(&args.database, &file.database).unwrap_or(defaults.database),
        max_connections: file.max_connections.unwrap_or(defaults.max_connections),
    })
}
