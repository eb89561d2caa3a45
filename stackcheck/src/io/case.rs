//! Case file parsing and validation.
//!
//! A case is a TOML file naming one exported snapshot and the checks that
//! must hold for it. See `stackcheck/tests/fixtures/` for examples.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use serde::Deserialize;

use crate::core::classifier::ResourceClass;
use crate::core::path::PropertyPath;
use crate::core::property::PropertyValue;

/// A parsed case file containing metadata and checks.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct CaseFile {
    pub case: CaseMeta,
    #[serde(default)]
    pub checks: Vec<Check>,
}

/// Case metadata.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct CaseMeta {
    /// Unique identifier (slug format: `[a-z0-9_-]+`).
    pub id: String,
    #[serde(default)]
    pub description: String,
    /// Snapshot path, relative to the case file's directory.
    pub snapshot: PathBuf,
    /// Skip unless the e2e gate is enabled.
    #[serde(default)]
    pub requires_cluster: bool,
}

/// Which records a check applies to. All set fields must match.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Selector {
    /// Position in URN order.
    pub index: Option<usize>,
    pub urn_name: Option<String>,
    pub class: Option<ResourceClass>,
    /// Value of the `kind` output.
    pub kind: Option<String>,
    /// Value of the `metadata.name` output.
    pub metadata_name: Option<String>,
    /// Exclude records whose `metadata.name` output equals this value.
    pub exclude_metadata_name: Option<String>,
    /// Minimum number of records that must be selected (default 1).
    pub min_matches: Option<usize>,
}

impl Selector {
    fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("urn_name", &self.urn_name),
            ("kind", &self.kind),
            ("metadata_name", &self.metadata_name),
            ("exclude_metadata_name", &self.exclude_metadata_name),
        ] {
            if let Some(value) = value
                && value.trim().is_empty()
            {
                bail!("{field} must be non-empty when set");
            }
        }
        if self.metadata_name.is_some() && self.metadata_name == self.exclude_metadata_name {
            bail!("metadata_name and exclude_metadata_name select nothing");
        }
        Ok(())
    }
}

/// Assertion to evaluate against the sorted graph.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Check {
    ResourceCount {
        expected: usize,
    },
    ClassCount {
        class: ResourceClass,
        expected: usize,
    },
    ClassAt {
        index: usize,
        class: ResourceClass,
    },
    NameAt {
        index: usize,
        name: String,
    },
    OutputEquals {
        #[serde(default)]
        select: Selector,
        path: PropertyPath,
        expected: PropertyValue,
    },
    OutputNonEmpty {
        #[serde(default)]
        select: Selector,
        path: PropertyPath,
    },
    OutputAbsent {
        #[serde(default)]
        select: Selector,
        path: PropertyPath,
    },
}

impl Check {
    /// Short stable label, used in reports.
    pub fn label(&self) -> &'static str {
        match self {
            Check::ResourceCount { .. } => "resource_count",
            Check::ClassCount { .. } => "class_count",
            Check::ClassAt { .. } => "class_at",
            Check::NameAt { .. } => "name_at",
            Check::OutputEquals { .. } => "output_equals",
            Check::OutputNonEmpty { .. } => "output_non_empty",
            Check::OutputAbsent { .. } => "output_absent",
        }
    }

    fn validate(&self) -> Result<()> {
        match self {
            Check::NameAt { name, .. } => {
                if name.trim().is_empty() {
                    bail!("name_at.name must be non-empty");
                }
            }
            Check::OutputEquals { select, .. }
            | Check::OutputNonEmpty { select, .. }
            | Check::OutputAbsent { select, .. } => {
                select
                    .validate()
                    .with_context(|| format!("{}.select invalid", self.label()))?;
            }
            Check::ResourceCount { .. } | Check::ClassCount { .. } | Check::ClassAt { .. } => {}
        }
        Ok(())
    }
}

impl CaseFile {
    /// Load and validate a case file from the given path.
    pub fn load(path: &Path) -> Result<Self> {
        let contents =
            fs::read_to_string(path).with_context(|| format!("read case {}", path.display()))?;
        Self::parse_str(&contents).with_context(|| format!("load case {}", path.display()))
    }

    pub fn parse_str(contents: &str) -> Result<Self> {
        let case: CaseFile = toml::from_str(contents).context("parse case")?;
        case.validate()?;
        Ok(case)
    }

    /// Snapshot path resolved against the directory holding the case file.
    pub fn snapshot_path(&self, case_path: &Path) -> PathBuf {
        match case_path.parent() {
            Some(dir) => dir.join(&self.case.snapshot),
            None => self.case.snapshot.clone(),
        }
    }

    fn validate(&self) -> Result<()> {
        validate_case_id(&self.case.id)?;
        if self.case.snapshot.as_os_str().is_empty() {
            bail!("case.snapshot must be non-empty");
        }
        if self.checks.is_empty() {
            bail!("checks must be a non-empty array");
        }
        for (index, check) in self.checks.iter().enumerate() {
            check
                .validate()
                .with_context(|| format!("checks[{}] invalid", index))?;
        }
        Ok(())
    }
}

/// Discover and load all case files from a directory.
///
/// Returns `(path, case)` pairs sorted by id. Errors if duplicate ids are found.
pub fn discover_cases(dir: &Path) -> Result<Vec<(PathBuf, CaseFile)>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let mut cases = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("read cases dir {}", dir.display()))? {
        let entry = entry.context("read case entry")?;
        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some("toml") {
            continue;
        }
        let case = CaseFile::load(&path)?;
        cases.push((path, case));
    }
    cases.sort_by(|left, right| left.1.case.id.cmp(&right.1.case.id));
    for pair in cases.windows(2) {
        if pair[0].1.case.id == pair[1].1.case.id {
            return Err(anyhow!("duplicate case.id {}", pair[0].1.case.id));
        }
    }
    Ok(cases)
}

fn validate_case_id(id: &str) -> Result<()> {
    if id.trim().is_empty() {
        bail!("case.id must be non-empty");
    }
    if !id
        .chars()
        .all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-' || ch == '_')
    {
        bail!("case.id must use [a-z0-9_-] only");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_valid_case() {
        let input = r#"
[case]
id = "get"
snapshot = "get.snapshot.json"
requires_cluster = true

[[checks]]
type = "resource_count"
expected = 3

[[checks]]
type = "class_at"
index = 2
class = "stack_root"

[[checks]]
type = "output_equals"
select = { urn_name = "kube-dashboard" }
path = "metadata.name"
expected = "kubernetes"
"#;
        let case = CaseFile::parse_str(input).expect("case parses");
        assert_eq!(case.case.id, "get");
        assert!(case.case.requires_cluster);
        assert_eq!(case.checks.len(), 3);
        assert_eq!(
            case.checks[1],
            Check::ClassAt {
                index: 2,
                class: ResourceClass::StackRoot
            }
        );
        match &case.checks[2] {
            Check::OutputEquals {
                select,
                path,
                expected,
            } => {
                assert_eq!(select.urn_name.as_deref(), Some("kube-dashboard"));
                assert_eq!(path.to_string(), "metadata.name");
                assert_eq!(expected, &PropertyValue::from("kubernetes"));
            }
            other => panic!("unexpected check {other:?}"),
        }
    }

    #[test]
    fn rejects_invalid_id() {
        let input = r#"
[case]
id = "bad/id"
snapshot = "s.json"

[[checks]]
type = "resource_count"
expected = 1
"#;
        let err = CaseFile::parse_str(input).expect_err("invalid id");
        assert!(err.to_string().contains("case.id"));
    }

    #[test]
    fn rejects_unparseable_path() {
        let input = r#"
[case]
id = "paths"
snapshot = "s.json"

[[checks]]
type = "output_absent"
path = "metadata..name"
"#;
        let err = CaseFile::parse_str(input).expect_err("bad path");
        assert!(format!("{err:#}").contains("empty key"));
    }

    #[test]
    fn rejects_contradictory_selector() {
        let input = r#"
[case]
id = "selector"
snapshot = "s.json"

[[checks]]
type = "output_non_empty"
select = { metadata_name = "web", exclude_metadata_name = "web" }
path = "metadata.uid"
"#;
        let err = CaseFile::parse_str(input).expect_err("contradiction");
        assert!(format!("{err:#}").contains("select nothing"));
    }

    #[test]
    fn rejects_empty_checks() {
        let input = r#"
[case]
id = "empty"
snapshot = "s.json"
"#;
        let err = CaseFile::parse_str(input).expect_err("no checks");
        assert!(err.to_string().contains("checks must be a non-empty array"));
    }

    #[test]
    fn snapshot_path_is_relative_to_case() {
        let case = CaseFile::parse_str(
            r#"
[case]
id = "rel"
snapshot = "snapshots/rel.json"

[[checks]]
type = "resource_count"
expected = 0
"#,
        )
        .expect("case");
        assert_eq!(
            case.snapshot_path(Path::new("cases/rel.toml")),
            PathBuf::from("cases/snapshots/rel.json")
        );
    }

    #[test]
    fn discover_sorts_and_rejects_duplicates() {
        let temp = tempfile::tempdir().expect("tempdir");
        let body = |id: &str| {
            format!(
                "[case]\nid = \"{id}\"\nsnapshot = \"s.json\"\n\n[[checks]]\ntype = \"resource_count\"\nexpected = 1\n"
            )
        };
        fs::write(temp.path().join("b.toml"), body("beta")).expect("write");
        fs::write(temp.path().join("a.toml"), body("alpha")).expect("write");
        fs::write(temp.path().join("notes.txt"), "ignored").expect("write");

        let cases = discover_cases(temp.path()).expect("discover");
        let ids: Vec<&str> = cases.iter().map(|(_, case)| case.case.id.as_str()).collect();
        assert_eq!(ids, vec!["alpha", "beta"]);

        fs::write(temp.path().join("c.toml"), body("alpha")).expect("write");
        let err = discover_cases(temp.path()).expect_err("duplicate");
        assert!(err.to_string().contains("duplicate case.id alpha"));
    }
}
