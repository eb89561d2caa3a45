//! Post-deployment stack checker.
//!
//! Reads a snapshot exported by the deployment engine, orders its resources
//! by URN and evaluates declarative case files against it.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::debug;

use stackcheck::check::{CaseReport, CaseStatus, evaluate_case};
use stackcheck::core::graph::GraphView;
use stackcheck::core::invariants::validate_invariants;
use stackcheck::core::path::PropertyPath;
use stackcheck::exit_codes;
use stackcheck::io::case::{CaseFile, discover_cases};
use stackcheck::io::config::{CONFIG_FILE, E2eGate, StackcheckConfig, load_config};
use stackcheck::io::snapshot_store::load_snapshot;
use stackcheck::logging;
use stackcheck::snapshot::ResourceRecord;

#[derive(Parser)]
#[command(
    name = "stackcheck",
    version,
    about = "Deterministic checks over deployed resource graphs"
)]
struct Cli {
    /// Path to the TOML config (defaults apply if missing).
    #[arg(long, global = true, default_value = CONFIG_FILE)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print resources in URN order with their class.
    List { snapshot: PathBuf },
    /// Print the output value at a path of one resource.
    Pluck {
        snapshot: PathBuf,
        /// Full URN or URN name of the resource.
        resource: String,
        /// Dotted path, e.g. `metadata.name` or `spec.ports[0].port`.
        path: PropertyPath,
    },
    /// Check snapshot invariants (unique URNs, resolvable parents and providers).
    Validate { snapshot: PathBuf },
    /// Evaluate case files, or every case file in a directory.
    Check {
        #[arg(required = true)]
        cases: Vec<PathBuf>,
        /// Emit reports as JSON lines.
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    logging::init();
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{:#}", err);
            std::process::exit(exit_codes::INVALID);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;
    match cli.command {
        Command::List { snapshot } => cmd_list(&snapshot),
        Command::Pluck {
            snapshot,
            resource,
            path,
        } => cmd_pluck(&snapshot, &resource, &path),
        Command::Validate { snapshot } => cmd_validate(&snapshot),
        Command::Check { cases, json } => cmd_check(&config, &cases, json),
    }
}

fn cmd_list(snapshot_path: &Path) -> Result<i32> {
    let snapshot = load_snapshot(snapshot_path)?;
    let view = GraphView::new(&snapshot)?;
    for (index, record) in view.resources().iter().enumerate() {
        println!("{}\t{}\t{}", index, view.classify(record), record.urn);
    }
    Ok(exit_codes::OK)
}

fn cmd_pluck(snapshot_path: &Path, resource: &str, path: &PropertyPath) -> Result<i32> {
    let snapshot = load_snapshot(snapshot_path)?;
    let view = GraphView::new(&snapshot)?;
    let Some(record) = resolve_resource(&view, resource)? else {
        eprintln!("no resource matches '{}'", resource);
        return Ok(exit_codes::NOT_FOUND);
    };
    debug!(urn = %record.urn, path = %path, "plucking output");
    match view.outputs(record, path) {
        Some(value) => {
            let rendered =
                serde_json::to_string_pretty(&value.to_json()).context("serialize value")?;
            println!("{}", rendered);
            Ok(exit_codes::OK)
        }
        None => {
            eprintln!("{}: no value at '{}'", record.urn, path);
            Ok(exit_codes::NOT_FOUND)
        }
    }
}

/// Resolve by full URN, falling back to a unique URN name.
fn resolve_resource<'a>(
    view: &GraphView<'a>,
    resource: &str,
) -> Result<Option<&'a ResourceRecord>> {
    if let Some(record) = view.by_urn(resource) {
        return Ok(Some(record));
    }
    let mut matches = view.find_by_name(resource);
    let first = matches.next();
    if let Some(second) = matches.next() {
        bail!(
            "resource name '{}' is ambiguous: {} and {} both match",
            resource,
            first.map(|record| record.urn.to_string()).unwrap_or_default(),
            second.urn
        );
    }
    Ok(first)
}

fn cmd_validate(snapshot_path: &Path) -> Result<i32> {
    let snapshot = load_snapshot(snapshot_path)?;
    let errors = validate_invariants(&snapshot);
    if !errors.is_empty() {
        bail!("invariant violations:\n- {}", errors.join("\n- "));
    }
    println!("ok: {} resources", snapshot.resources.len());
    Ok(exit_codes::OK)
}

fn cmd_check(config: &StackcheckConfig, inputs: &[PathBuf], json: bool) -> Result<i32> {
    let gate = E2eGate::from_env(&config.e2e);
    debug!(enabled = gate.is_enabled(), "e2e gate");

    let mut cases = Vec::new();
    for input in inputs {
        if input.is_dir() {
            cases.extend(discover_cases(input)?);
        } else {
            cases.push((input.clone(), CaseFile::load(input)?));
        }
    }

    let mut failed = false;
    let mut aborted = false;
    for (path, case) in &cases {
        let report = evaluate_case(path, case, &gate);
        failed |= report.status == CaseStatus::Failed;
        aborted |= report.status == CaseStatus::Aborted;
        if json {
            println!(
                "{}",
                serde_json::to_string(&report).context("serialize report")?
            );
        } else {
            print_report(&report, config.report.show_passed);
        }
    }

    Ok(if aborted {
        exit_codes::INVALID
    } else if failed {
        exit_codes::FAILED
    } else {
        exit_codes::OK
    })
}

fn print_report(report: &CaseReport, show_passed: bool) {
    match report.status {
        CaseStatus::Skipped => {
            println!(
                "SKIP {}: {}",
                report.id,
                report.skip_reason.as_deref().unwrap_or("skipped")
            );
            return;
        }
        CaseStatus::Aborted => {
            println!(
                "ABORT {}: {}",
                report.id,
                report.error.as_deref().unwrap_or("aborted")
            );
            return;
        }
        CaseStatus::Passed => println!("PASS {}", report.id),
        CaseStatus::Failed => println!("FAIL {}", report.id),
    }
    for outcome in &report.checks {
        if outcome.passed {
            if show_passed {
                println!("  ok   {}: {}", outcome.check, outcome.description);
            }
            continue;
        }
        println!("  fail {}: {}", outcome.check, outcome.description);
        for failure in &outcome.failures {
            println!("       - {}", failure);
        }
    }
}
