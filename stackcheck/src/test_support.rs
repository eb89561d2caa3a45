//! Test-only helpers for constructing snapshots and case workspaces.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::{Value, json};
use tempfile::TempDir;

use crate::core::property::PropertyValue;
use crate::core::urn::Urn;
use crate::io::snapshot_store::write_snapshot;
use crate::snapshot::{DeploymentSnapshot, ResourceRecord};

pub const STACK: &str = "dev";
pub const PROJECT: &str = "test";

/// URN in the deterministic test stack/project.
pub fn urn(qualified_type: &str, name: &str) -> Urn {
    Urn::new(STACK, PROJECT, qualified_type, name)
}

/// Resource record with the given outputs.
pub fn record(qualified_type: &str, name: &str, outputs: Value) -> ResourceRecord {
    ResourceRecord::new(urn(qualified_type, name), PropertyValue::from(outputs))
}

pub fn stack_root() -> ResourceRecord {
    let mut root = record("pulumi:pulumi:Stack", &format!("{PROJECT}-{STACK}"), json!({}));
    root.custom = false;
    root
}

/// Provider for `package`, named `default` as the engine names implicit providers.
pub fn provider(package: &str) -> ResourceRecord {
    let mut provider = record(&format!("pulumi:providers:{package}"), "default", json!({}));
    provider.id = Some("04da6b54-80e4-46f7-96ec-b56ff0331ba9".to_string());
    provider
}

/// Managed resource whose `provider` reference points at `provider`.
pub fn managed(
    qualified_type: &str,
    name: &str,
    provider: &ResourceRecord,
    outputs: Value,
) -> ResourceRecord {
    let mut managed = record(qualified_type, name, outputs);
    let provider_id = provider.id.as_deref().unwrap_or("unknown");
    managed.provider = Some(format!("{}::{}", provider.urn, provider_id));
    managed
}

pub fn snapshot(resources: Vec<ResourceRecord>) -> DeploymentSnapshot {
    DeploymentSnapshot::new(resources)
}

/// Temporary directory holding snapshot and case files.
pub struct TestWorkspace {
    dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Result<Self> {
        let dir = tempfile::tempdir().context("create tempdir")?;
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn write_snapshot(&self, name: &str, snapshot: &DeploymentSnapshot) -> Result<PathBuf> {
        let path = self.path().join(name);
        write_snapshot(&path, snapshot)?;
        Ok(path)
    }

    pub fn write_file(&self, name: &str, contents: &str) -> Result<PathBuf> {
        let path = self.path().join(name);
        fs::write(&path, contents).with_context(|| format!("write {}", path.display()))?;
        Ok(path)
    }
}
