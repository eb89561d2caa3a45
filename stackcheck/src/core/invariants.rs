//! Semantic invariants of an exported snapshot.

use std::collections::{BTreeMap, HashSet};

use crate::core::classifier::ResourceClass;
use crate::snapshot::DeploymentSnapshot;

/// Check snapshot invariants:
/// - No duplicate URNs
/// - At most one stack root
/// - Every `parent` names a resource in the snapshot
/// - Every `provider` reference names a provider resource in the snapshot
///
/// Errors are reported in URN order so output is stable across runs.
pub fn validate_invariants(snapshot: &DeploymentSnapshot) -> Vec<String> {
    let mut errors = Vec::new();

    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for record in &snapshot.resources {
        *counts.entry(record.urn.as_str()).or_default() += 1;
    }
    for (urn, count) in &counts {
        if *count > 1 {
            errors.push(format!("duplicate urn '{}' ({} occurrences)", urn, count));
        }
    }

    let mut records: Vec<_> = snapshot.resources.iter().collect();
    records.sort_by(|left, right| left.urn.cmp(&right.urn));

    let roots: Vec<&str> = records
        .iter()
        .filter(|record| record.class() == ResourceClass::StackRoot)
        .map(|record| record.urn.as_str())
        .collect();
    if roots.len() > 1 {
        errors.push(format!("multiple stack roots: {}", roots.join(", ")));
    }

    let providers: HashSet<&str> = records
        .iter()
        .filter(|record| record.class() == ResourceClass::Provider)
        .map(|record| record.urn.as_str())
        .collect();

    for record in &records {
        if let Some(parent) = &record.parent
            && !counts.contains_key(parent.as_str())
        {
            errors.push(format!("{}: parent '{}' not in snapshot", record.urn, parent));
        }
        if let Some(reference) = &record.provider {
            match record.provider_ref() {
                Some((provider_urn, _)) if providers.contains(provider_urn) => {}
                Some((provider_urn, _)) => errors.push(format!(
                    "{}: provider '{}' not in snapshot",
                    record.urn, provider_urn
                )),
                None => errors.push(format!(
                    "{}: malformed provider reference '{}'",
                    record.urn, reference
                )),
            }
        }
    }

    errors
}
