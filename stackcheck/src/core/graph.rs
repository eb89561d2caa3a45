//! Read-only view over a deployed resource graph.
//!
//! The engine creates resources concurrently, so export order is not stable
//! across runs. [`GraphView`] sorts records by URN (byte-wise over the full
//! URN text) once at construction; positional lookups index that order.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::core::classifier::ResourceClass;
use crate::core::path::PropertyPath;
use crate::core::pluck::pluck;
use crate::core::property::PropertyValue;
use crate::snapshot::{DeploymentSnapshot, ResourceRecord};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("ordering violation: urn '{urn}' appears {count} times in the snapshot")]
    OrderingViolation { urn: String, count: usize },
}

/// Records sorted ascending by URN. Stable; equal URNs keep input order.
pub fn sorted_by_identity(records: &[ResourceRecord]) -> Vec<&ResourceRecord> {
    let mut sorted: Vec<&ResourceRecord> = records.iter().collect();
    sorted.sort_by(|left, right| left.urn.cmp(&right.urn));
    sorted
}

/// Sort records in place by URN.
pub fn sort_by_identity(records: &mut [ResourceRecord]) {
    records.sort_by(|left, right| left.urn.cmp(&right.urn));
}

/// First URN that occurs more than once in an already sorted sequence.
fn first_duplicate(sorted: &[&ResourceRecord]) -> Option<GraphError> {
    let mut index = 0;
    while index < sorted.len() {
        let urn = &sorted[index].urn;
        let count = sorted[index..]
            .iter()
            .take_while(|record| &record.urn == urn)
            .count();
        if count > 1 {
            return Some(GraphError::OrderingViolation {
                urn: urn.to_string(),
                count,
            });
        }
        index += count;
    }
    None
}

#[derive(Debug, Clone)]
pub struct GraphView<'a> {
    snapshot: &'a DeploymentSnapshot,
    sorted: Vec<&'a ResourceRecord>,
}

impl<'a> GraphView<'a> {
    /// Build a view, refusing snapshots whose URNs are not unique.
    pub fn new(snapshot: &'a DeploymentSnapshot) -> Result<Self, GraphError> {
        let sorted = sorted_by_identity(&snapshot.resources);
        if let Some(err) = first_duplicate(&sorted) {
            return Err(err);
        }
        Ok(Self { snapshot, sorted })
    }

    pub fn snapshot(&self) -> &'a DeploymentSnapshot {
        self.snapshot
    }

    /// Records in URN order.
    pub fn resources(&self) -> &[&'a ResourceRecord] {
        &self.sorted
    }

    /// A fresh copy of the URN order.
    pub fn sorted_by_identity(&self) -> Vec<&'a ResourceRecord> {
        self.sorted.clone()
    }

    pub fn len(&self) -> usize {
        self.sorted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sorted.is_empty()
    }

    /// Record at `index` in URN order.
    pub fn get(&self, index: usize) -> Option<&'a ResourceRecord> {
        self.sorted.get(index).copied()
    }

    pub fn by_urn(&self, urn: &str) -> Option<&'a ResourceRecord> {
        self.sorted
            .binary_search_by(|record| record.urn.as_str().cmp(urn))
            .ok()
            .map(|index| self.sorted[index])
    }

    pub fn classify(&self, record: &ResourceRecord) -> ResourceClass {
        record.class()
    }

    pub fn outputs(
        &self,
        record: &'a ResourceRecord,
        path: &PropertyPath,
    ) -> Option<&'a PropertyValue> {
        pluck(&record.outputs, path)
    }

    /// Lazily filter records in URN order. The iterator is `Clone`, so a
    /// caller can walk the matches more than once.
    pub fn find_by<F>(&self, predicate: F) -> impl Iterator<Item = &'a ResourceRecord> + Clone
    where
        F: Fn(&ResourceRecord) -> bool + Clone,
    {
        self.sorted
            .iter()
            .copied()
            .filter(move |record| predicate(*record))
    }

    /// Records whose URN name equals `name`. The iterator does not borrow `name`.
    pub fn find_by_name<'s>(
        &'s self,
        name: &str,
    ) -> impl Iterator<Item = &'a ResourceRecord> + Clone + use<'a, 's> {
        let name = name.to_string();
        self.find_by(move |record| record.name() == name)
    }

    pub fn of_class(
        &self,
        class: ResourceClass,
    ) -> impl Iterator<Item = &'a ResourceRecord> + Clone {
        self.find_by(move |record| record.class() == class)
    }

    pub fn stack_root(&self) -> Option<&'a ResourceRecord> {
        self.of_class(ResourceClass::StackRoot).next()
    }

    pub fn providers(&self) -> impl Iterator<Item = &'a ResourceRecord> + Clone {
        self.of_class(ResourceClass::Provider)
    }

    pub fn managed(&self) -> impl Iterator<Item = &'a ResourceRecord> + Clone {
        self.of_class(ResourceClass::Managed)
    }

    /// Number of records per class. Every class appears, possibly with zero.
    pub fn class_counts(&self) -> BTreeMap<ResourceClass, usize> {
        let mut counts = BTreeMap::from([
            (ResourceClass::StackRoot, 0),
            (ResourceClass::Provider, 0),
            (ResourceClass::Managed, 0),
        ]);
        for record in &self.sorted {
            *counts.entry(record.class()).or_default() += 1;
        }
        counts
    }

    /// Resolve the provider record referenced by `record`, if present.
    pub fn provider_for(&self, record: &ResourceRecord) -> Option<&'a ResourceRecord> {
        let (provider_urn, _id) = record.provider_ref()?;
        self.by_urn(provider_urn)
            .filter(|provider| provider.class() == ResourceClass::Provider)
    }
}
