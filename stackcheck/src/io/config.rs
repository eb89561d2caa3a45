//! Checker configuration stored in `stackcheck.toml`.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

/// Default file name looked up in the working directory.
pub const CONFIG_FILE: &str = "stackcheck.toml";

/// Checker configuration (TOML).
///
/// Missing fields default to values that match the engine's own test
/// conventions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct StackcheckConfig {
    pub e2e: E2eConfig,
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct E2eConfig {
    /// Environment variable naming the cluster context. Scenarios that need a
    /// live cluster are skipped while it is unset or blank.
    pub context_env: String,
}

impl Default for E2eConfig {
    fn default() -> Self {
        Self {
            context_env: "KUBERNETES_CONTEXT".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ReportConfig {
    /// Print passing checks as well as failures.
    pub show_passed: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self { show_passed: true }
    }
}

impl StackcheckConfig {
    pub fn validate(&self) -> Result<()> {
        let name = self.e2e.context_env.trim();
        if name.is_empty() {
            return Err(anyhow!("e2e.context_env must be non-empty"));
        }
        if name.contains('=') || name.contains('\0') {
            return Err(anyhow!(
                "e2e.context_env '{}' is not a valid variable name",
                name
            ));
        }
        Ok(())
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `StackcheckConfig::default()`.
pub fn load_config(path: &Path) -> Result<StackcheckConfig> {
    if !path.exists() {
        let cfg = StackcheckConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: StackcheckConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Whether scenarios that need a live cluster may run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum E2eGate {
    Enabled { context: String },
    Disabled { reason: String },
}

impl E2eGate {
    /// Read the gate from the process environment.
    pub fn from_env(cfg: &E2eConfig) -> Self {
        Self::from_value(&cfg.context_env, std::env::var(&cfg.context_env).ok())
    }

    /// Gate from an already-read variable value.
    pub fn from_value(var: &str, value: Option<String>) -> Self {
        match value {
            Some(context) if !context.trim().is_empty() => E2eGate::Enabled { context },
            _ => E2eGate::Disabled {
                reason: format!("missing {var} variable"),
            },
        }
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, E2eGate::Enabled { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_missing_returns_default() {
        let temp = tempfile::tempdir().expect("tempdir");
        let cfg = load_config(&temp.path().join("missing.toml")).expect("load");
        assert_eq!(cfg, StackcheckConfig::default());
        assert_eq!(cfg.e2e.context_env, "KUBERNETES_CONTEXT");
    }

    #[test]
    fn load_partial_file_keeps_defaults() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join(CONFIG_FILE);
        fs::write(&path, "[report]\nshow_passed = false\n").expect("write");
        let cfg = load_config(&path).expect("load");
        assert!(!cfg.report.show_passed);
        assert_eq!(cfg.e2e, E2eConfig::default());
    }

    #[test]
    fn rejects_blank_context_env() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join(CONFIG_FILE);
        fs::write(&path, "[e2e]\ncontext_env = \" \"\n").expect("write");
        let err = load_config(&path).expect_err("blank env");
        assert!(err.to_string().contains("e2e.context_env"));
    }

    #[test]
    fn gate_requires_non_blank_value() {
        assert_eq!(
            E2eGate::from_value("KUBERNETES_CONTEXT", Some("minikube".to_string())),
            E2eGate::Enabled {
                context: "minikube".to_string()
            }
        );
        assert!(!E2eGate::from_value("KUBERNETES_CONTEXT", Some("  ".to_string())).is_enabled());
        assert_eq!(
            E2eGate::from_value("KUBERNETES_CONTEXT", None),
            E2eGate::Disabled {
                reason: "missing KUBERNETES_CONTEXT variable".to_string()
            }
        );
    }
}
