//! Snapshot load/save helpers.
//!
//! Accepts the engine's export envelope (`{"version": 3, "deployment": {...}}`)
//! as well as a bare deployment object.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::snapshot::DeploymentSnapshot;

/// Newest export schema version this reader understands.
const MAX_SCHEMA_VERSION: u32 = 3;

#[derive(Deserialize)]
struct Envelope {
    version: Option<u32>,
    deployment: DeploymentSnapshot,
}

/// Parse snapshot JSON text in either accepted shape.
pub fn parse_snapshot(contents: &str) -> Result<DeploymentSnapshot> {
    let value: Value = serde_json::from_str(contents).context("parse snapshot json")?;
    let is_envelope = value
        .as_object()
        .is_some_and(|object| object.contains_key("deployment"));
    if is_envelope {
        let envelope: Envelope =
            serde_json::from_value(value).context("deserialize snapshot envelope")?;
        if let Some(version) = envelope.version
            && version > MAX_SCHEMA_VERSION
        {
            return Err(anyhow!("unsupported snapshot version {version}"));
        }
        return Ok(envelope.deployment);
    }
    serde_json::from_value(value).context("deserialize snapshot deployment")
}

/// Load a snapshot from disk.
pub fn load_snapshot(path: &Path) -> Result<DeploymentSnapshot> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("read snapshot {}", path.display()))?;
    let snapshot =
        parse_snapshot(&contents).with_context(|| format!("load snapshot {}", path.display()))?;
    debug!(
        path = %path.display(),
        resources = snapshot.resources.len(),
        "loaded snapshot"
    );
    Ok(snapshot)
}

/// Write a snapshot as a bare deployment object, pretty-printed with trailing newline.
pub fn write_snapshot(path: &Path, snapshot: &DeploymentSnapshot) -> Result<()> {
    let mut buf = serde_json::to_string_pretty(snapshot).context("serialize snapshot")?;
    buf.push('\n');
    fs::write(path, buf).with_context(|| format!("write snapshot {}", path.display()))
}
