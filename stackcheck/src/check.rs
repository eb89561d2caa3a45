//! Check evaluation and case reports.
//!
//! Evaluates the checks of a case file against a sorted graph view and
//! records one outcome per check. A snapshot that violates the unique-URN
//! invariant aborts that case instead of producing outcomes; other cases in
//! the same run are unaffected.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::core::expect::{
    ExpectError, expect_absent, expect_class_at, expect_class_count, expect_name_at,
    expect_non_empty_str, expect_output_eq, expect_resource_count,
};
use crate::core::graph::GraphView;
use crate::core::pluck::pluck_keys;
use crate::io::case::{CaseFile, Check, Selector};
use crate::io::config::E2eGate;
use crate::io::snapshot_store::load_snapshot;
use crate::snapshot::ResourceRecord;

/// Result of evaluating a single check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckOutcome {
    pub check: &'static str,
    pub description: String,
    pub passed: bool,
    /// Failure messages, one per offending record.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseStatus {
    Passed,
    Failed,
    Skipped,
    /// The snapshot could not be loaded or broke an invariant.
    Aborted,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaseReport {
    pub id: String,
    pub status: CaseStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub checks: Vec<CheckOutcome>,
}

impl CaseReport {
    pub fn failed_checks(&self) -> impl Iterator<Item = &CheckOutcome> {
        self.checks.iter().filter(|outcome| !outcome.passed)
    }
}

/// Load the case's snapshot and evaluate its checks.
///
/// Cases that need a live cluster are skipped while the gate is disabled.
#[instrument(skip_all, fields(case_id = %case.case.id))]
pub fn run_case(case_path: &Path, case: &CaseFile, gate: &E2eGate) -> Result<CaseReport> {
    if case.case.requires_cluster
        && let E2eGate::Disabled { reason } = gate
    {
        info!(reason = %reason, "skipping case");
        return Ok(CaseReport {
            id: case.case.id.clone(),
            status: CaseStatus::Skipped,
            skip_reason: Some(reason.clone()),
            error: None,
            checks: Vec::new(),
        });
    }

    let snapshot_path = case.snapshot_path(case_path);
    let snapshot = load_snapshot(&snapshot_path)?;
    let view = GraphView::new(&snapshot)
        .with_context(|| format!("case {} snapshot {}", case.case.id, snapshot_path.display()))?;

    let checks = run_checks(&view, &case.checks);
    let status = if checks.iter().all(|outcome| outcome.passed) {
        CaseStatus::Passed
    } else {
        CaseStatus::Failed
    };
    info!(status = ?status, checks = checks.len(), "case evaluated");
    Ok(CaseReport {
        id: case.case.id.clone(),
        status,
        skip_reason: None,
        error: None,
        checks,
    })
}

/// Like [`run_case`], but an error aborts only this case and is recorded in
/// the report.
pub fn evaluate_case(case_path: &Path, case: &CaseFile, gate: &E2eGate) -> CaseReport {
    match run_case(case_path, case, gate) {
        Ok(report) => report,
        Err(err) => {
            let message = format!("{err:#}");
            warn!(case_id = %case.case.id, error = %message, "case aborted");
            CaseReport {
                id: case.case.id.clone(),
                status: CaseStatus::Aborted,
                skip_reason: None,
                error: Some(message),
                checks: Vec::new(),
            }
        }
    }
}

/// Evaluate all checks in order.
pub fn run_checks(view: &GraphView<'_>, checks: &[Check]) -> Vec<CheckOutcome> {
    checks
        .iter()
        .map(|check| {
            let failures = evaluate(view, check);
            let passed = failures.is_empty();
            debug!(check = check.label(), passed, "check result");
            CheckOutcome {
                check: check.label(),
                description: describe(check),
                passed,
                failures,
            }
        })
        .collect()
}

/// Failure messages for `check`; empty when it holds.
pub fn evaluate(view: &GraphView<'_>, check: &Check) -> Vec<String> {
    let single = |result: Result<(), ExpectError>| match result {
        Ok(()) => Vec::new(),
        Err(err) => vec![err.to_string()],
    };

    match check {
        Check::ResourceCount { expected } => single(expect_resource_count(view, *expected)),
        Check::ClassCount { class, expected } => {
            single(expect_class_count(view, *class, *expected))
        }
        Check::ClassAt { index, class } => {
            single(expect_class_at(view, *index, *class).map(|_| ()))
        }
        Check::NameAt { index, name } => single(expect_name_at(view, *index, name).map(|_| ())),
        Check::OutputEquals {
            select,
            path,
            expected,
        } => for_each_selected(view, select, |record| {
            expect_output_eq(record, path, expected)
        }),
        Check::OutputNonEmpty { select, path } => for_each_selected(view, select, |record| {
            expect_non_empty_str(record, path).map(|_| ())
        }),
        Check::OutputAbsent { select, path } => {
            for_each_selected(view, select, |record| expect_absent(record, path))
        }
    }
}

fn for_each_selected<F>(view: &GraphView<'_>, selector: &Selector, assertion: F) -> Vec<String>
where
    F: Fn(&ResourceRecord) -> Result<(), ExpectError>,
{
    let selected = select(view, selector);
    let min_matches = selector.min_matches.unwrap_or(1);
    let mut failures = Vec::new();
    if selected.len() < min_matches {
        failures.push(format!(
            "selector matched {} resources, expected at least {}",
            selected.len(),
            min_matches
        ));
    }
    for record in selected {
        if let Err(err) = assertion(record) {
            failures.push(err.to_string());
        }
    }
    failures
}

/// Records matched by `selector`, in URN order.
pub fn select<'a>(view: &GraphView<'a>, selector: &Selector) -> Vec<&'a ResourceRecord> {
    view.resources()
        .iter()
        .enumerate()
        .filter(|(index, record)| matches_selector(*index, record, selector))
        .map(|(_, record)| *record)
        .collect()
}

fn matches_selector(index: usize, record: &ResourceRecord, selector: &Selector) -> bool {
    if selector.index.is_some_and(|wanted| wanted != index) {
        return false;
    }
    if let Some(name) = &selector.urn_name
        && record.name() != name
    {
        return false;
    }
    if let Some(class) = selector.class
        && record.class() != class
    {
        return false;
    }
    if let Some(kind) = &selector.kind
        && output_str(record, &["kind"]) != Some(kind.as_str())
    {
        return false;
    }
    if let Some(name) = &selector.metadata_name
        && output_str(record, &["metadata", "name"]) != Some(name.as_str())
    {
        return false;
    }
    if let Some(name) = &selector.exclude_metadata_name
        && output_str(record, &["metadata", "name"]) == Some(name.as_str())
    {
        return false;
    }
    true
}

fn output_str<'a>(record: &'a ResourceRecord, keys: &[&str]) -> Option<&'a str> {
    pluck_keys(&record.outputs, keys).and_then(|value| value.as_str())
}

fn describe(check: &Check) -> String {
    match check {
        Check::ResourceCount { expected } => format!("{expected} resources"),
        Check::ClassCount { class, expected } => format!("{expected} {class} resources"),
        Check::ClassAt { index, class } => format!("resource {index} is {class}"),
        Check::NameAt { index, name } => format!("resource {index} is named '{name}'"),
        Check::OutputEquals {
            path, expected, ..
        } => format!("'{path}' equals {expected}"),
        Check::OutputNonEmpty { path, .. } => format!("'{path}' is a non-empty string"),
        Check::OutputAbsent { path, .. } => format!("'{path}' is absent"),
    }
}
