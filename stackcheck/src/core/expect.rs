//! Assertions used by scenarios to check a deployed graph.
//!
//! Every failure names the URN and path involved together with the expected
//! and actual values. Nothing here substitutes a default for a missing value.

use thiserror::Error;

use crate::core::classifier::ResourceClass;
use crate::core::graph::GraphView;
use crate::core::path::PropertyPath;
use crate::core::pluck::{PluckError, pluck_str, try_pluck};
use crate::core::property::PropertyValue;
use crate::snapshot::ResourceRecord;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExpectError {
    #[error("expected {expected} resources, found {actual}")]
    ResourceCount { expected: usize, actual: usize },
    #[error("expected {expected} {class} resources, found {actual}")]
    ClassCount {
        class: ResourceClass,
        expected: usize,
        actual: usize,
    },
    #[error("no resource at index {index}: snapshot has {len}")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("resource {index} ({urn}): expected class {expected}, found {actual}")]
    Class {
        index: usize,
        urn: String,
        expected: ResourceClass,
        actual: ResourceClass,
    },
    #[error("resource {index} ({urn}): expected name '{expected}', found '{actual}'")]
    Name {
        index: usize,
        urn: String,
        expected: String,
        actual: String,
    },
    #[error("{urn}: {source}")]
    Output {
        urn: String,
        #[source]
        source: PluckError,
    },
    #[error("{urn}: '{path}' expected {expected}, found {actual}")]
    Value {
        urn: String,
        path: String,
        expected: PropertyValue,
        actual: PropertyValue,
    },
    #[error("{urn}: '{path}' must be a non-empty string")]
    EmptyString { urn: String, path: String },
    #[error("{urn}: '{path}' must be absent, found {actual}")]
    Present {
        urn: String,
        path: String,
        actual: PropertyValue,
    },
}

pub fn expect_resource_count(view: &GraphView<'_>, expected: usize) -> Result<(), ExpectError> {
    let actual = view.len();
    if actual != expected {
        return Err(ExpectError::ResourceCount { expected, actual });
    }
    Ok(())
}

pub fn expect_class_count(
    view: &GraphView<'_>,
    class: ResourceClass,
    expected: usize,
) -> Result<(), ExpectError> {
    let actual = view.of_class(class).count();
    if actual != expected {
        return Err(ExpectError::ClassCount {
            class,
            expected,
            actual,
        });
    }
    Ok(())
}

/// Record at `index` in URN order.
pub fn expect_at<'a>(
    view: &GraphView<'a>,
    index: usize,
) -> Result<&'a ResourceRecord, ExpectError> {
    view.get(index).ok_or(ExpectError::IndexOutOfRange {
        index,
        len: view.len(),
    })
}

pub fn expect_class_at<'a>(
    view: &GraphView<'a>,
    index: usize,
    expected: ResourceClass,
) -> Result<&'a ResourceRecord, ExpectError> {
    let record = expect_at(view, index)?;
    let actual = view.classify(record);
    if actual != expected {
        return Err(ExpectError::Class {
            index,
            urn: record.urn.to_string(),
            expected,
            actual,
        });
    }
    Ok(record)
}

pub fn expect_name_at<'a>(
    view: &GraphView<'a>,
    index: usize,
    expected: &str,
) -> Result<&'a ResourceRecord, ExpectError> {
    let record = expect_at(view, index)?;
    if record.name() != expected {
        return Err(ExpectError::Name {
            index,
            urn: record.urn.to_string(),
            expected: expected.to_string(),
            actual: record.name().to_string(),
        });
    }
    Ok(record)
}

/// Output value at `path`; absence is an error.
pub fn expect_output<'a>(
    record: &'a ResourceRecord,
    path: &PropertyPath,
) -> Result<&'a PropertyValue, ExpectError> {
    try_pluck(&record.outputs, path).map_err(|source| ExpectError::Output {
        urn: record.urn.to_string(),
        source,
    })
}

/// String output at `path`; absence or a non-string leaf is an error.
pub fn expect_output_str<'a>(
    record: &'a ResourceRecord,
    path: &PropertyPath,
) -> Result<&'a str, ExpectError> {
    pluck_str(&record.outputs, path).map_err(|source| ExpectError::Output {
        urn: record.urn.to_string(),
        source,
    })
}

pub fn expect_output_eq(
    record: &ResourceRecord,
    path: &PropertyPath,
    expected: &PropertyValue,
) -> Result<(), ExpectError> {
    let actual = expect_output(record, path)?;
    if actual != expected {
        return Err(ExpectError::Value {
            urn: record.urn.to_string(),
            path: path.to_string(),
            expected: expected.clone(),
            actual: actual.clone(),
        });
    }
    Ok(())
}

pub fn expect_non_empty_str<'a>(
    record: &'a ResourceRecord,
    path: &PropertyPath,
) -> Result<&'a str, ExpectError> {
    let value = expect_output_str(record, path)?;
    if value.is_empty() {
        return Err(ExpectError::EmptyString {
            urn: record.urn.to_string(),
            path: path.to_string(),
        });
    }
    Ok(value)
}

pub fn expect_absent(record: &ResourceRecord, path: &PropertyPath) -> Result<(), ExpectError> {
    match try_pluck(&record.outputs, path) {
        Ok(actual) => Err(ExpectError::Present {
            urn: record.urn.to_string(),
            path: path.to_string(),
            actual: actual.clone(),
        }),
        Err(_) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::urn::Urn;
    use crate::snapshot::DeploymentSnapshot;
    use serde_json::json;

    fn snapshot() -> DeploymentSnapshot {
        DeploymentSnapshot::new(vec![
            ResourceRecord::new(
                Urn::new("dev", "helm", "pulumi:pulumi:Stack", "helm-dev"),
                PropertyValue::empty_mapping(),
            ),
            ResourceRecord::new(
                Urn::new("dev", "helm", "kubernetes:core/v1:ConfigMap", "nginx-config"),
                PropertyValue::from(json!({
                    "metadata": {"name": "nginx-config", "annotations": {"cmcreation": ""}}
                })),
            ),
        ])
    }

    #[test]
    fn count_and_class_assertions() {
        let snapshot = snapshot();
        let view = GraphView::new(&snapshot).expect("view");
        expect_resource_count(&view, 2).expect("count");
        expect_class_count(&view, ResourceClass::StackRoot, 1).expect("roots");
        expect_class_at(&view, 1, ResourceClass::StackRoot).expect("root last");

        let err = expect_resource_count(&view, 3).expect_err("wrong count");
        assert_eq!(err.to_string(), "expected 3 resources, found 2");
    }

    #[test]
    fn class_mismatch_names_urn() {
        let snapshot = snapshot();
        let view = GraphView::new(&snapshot).expect("view");
        let err = expect_class_at(&view, 0, ResourceClass::Provider).expect_err("managed");
        assert_eq!(
            err.to_string(),
            "resource 0 (urn:pulumi:dev::helm::kubernetes:core/v1:ConfigMap::nginx-config): \
             expected class provider, found managed"
        );
    }

    #[test]
    fn index_out_of_range_fails() {
        let snapshot = snapshot();
        let view = GraphView::new(&snapshot).expect("view");
        assert_eq!(
            expect_name_at(&view, 5, "anything").expect_err("range"),
            ExpectError::IndexOutOfRange { index: 5, len: 2 }
        );
    }

    #[test]
    fn empty_annotation_fails_loudly() {
        let snapshot = snapshot();
        let view = GraphView::new(&snapshot).expect("view");
        let config_map = expect_name_at(&view, 0, "nginx-config").expect("config map");
        let path = PropertyPath::keys(&["metadata", "annotations", "cmcreation"]);
        let err = expect_non_empty_str(config_map, &path).expect_err("empty");
        assert!(matches!(err, ExpectError::EmptyString { .. }));
    }

    #[test]
    fn missing_annotation_fails_loudly() {
        let snapshot = snapshot();
        let view = GraphView::new(&snapshot).expect("view");
        let root = expect_class_at(&view, 1, ResourceClass::StackRoot).expect("root");
        let path = PropertyPath::keys(&["metadata", "annotations", "cmcreation"]);
        let err = expect_non_empty_str(root, &path).expect_err("missing");
        assert!(err.to_string().contains("pulumi:pulumi:Stack::helm-dev"));
        assert!(err.to_string().contains("metadata.annotations.cmcreation"));
    }

    #[test]
    fn value_mismatch_reports_both_sides() {
        let snapshot = snapshot();
        let view = GraphView::new(&snapshot).expect("view");
        let config_map = expect_at(&view, 0).expect("config map");
        let err = expect_output_eq(
            config_map,
            &PropertyPath::keys(&["metadata", "name"]),
            &PropertyValue::from("other"),
        )
        .expect_err("mismatch");
        assert!(err.to_string().ends_with(r#"expected "other", found "nginx-config""#));
    }

    #[test]
    fn absent_assertion() {
        let snapshot = snapshot();
        let view = GraphView::new(&snapshot).expect("view");
        let config_map = expect_at(&view, 0).expect("config map");
        expect_absent(config_map, &PropertyPath::keys(&["spec", "type"])).expect("absent");
        assert!(expect_absent(config_map, &PropertyPath::keys(&["metadata", "name"])).is_err());
    }
}
