//! Property tests for plucking, ordering and classification.

use proptest::prelude::*;
use proptest::test_runner::Config;
use serde_json::{Value, json};

use stackcheck::core::classifier::{ROOT_STACK_TYPE, ResourceClass, classify_type};
use stackcheck::core::graph::{GraphView, sorted_by_identity};
use stackcheck::core::path::{PropertyPath, Segment};
use stackcheck::core::pluck::pluck;
use stackcheck::core::property::PropertyValue;
use stackcheck::core::urn::TypeToken;
use stackcheck::snapshot::{DeploymentSnapshot, ResourceRecord};
use stackcheck::test_support::record;

fn json_tree() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| json!(n)),
        "[a-z]{0,6}".prop_map(Value::String),
    ];
    leaf.prop_recursive(4, 48, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map("[a-c]{1,2}", inner, 0..4)
                .prop_map(|map| Value::Object(map.into_iter().collect())),
        ]
    })
}

fn segment() -> impl Strategy<Value = Segment> {
    prop_oneof![
        "[a-c]{1,2}".prop_map(Segment::Key),
        (0usize..4).prop_map(Segment::Index),
    ]
}

fn path(min: usize) -> impl Strategy<Value = PropertyPath> {
    prop::collection::vec(segment(), min..4).prop_map(PropertyPath::new)
}

fn type_token() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(ROOT_STACK_TYPE.to_string()),
        "pulumi:providers:[a-z]{1,8}",
        "[a-z]{1,8}:[a-z0-9/]{0,8}:[A-Z][a-z]{0,8}",
        "[a-z:]{0,12}",
    ]
}

fn records() -> impl Strategy<Value = Vec<ResourceRecord>> {
    prop::collection::btree_set((type_token(), "[a-z]{1,6}"), 0..8).prop_map(|pairs| {
        pairs
            .into_iter()
            .filter(|(token, _)| !token.is_empty() && !token.contains("::"))
            .map(|(token, name)| record(&token, &name, json!({})))
            .collect()
    })
}

fn urns(records: &[&ResourceRecord]) -> Vec<String> {
    records.iter().map(|record| record.urn.to_string()).collect()
}

proptest! {
    #![proptest_config(Config::with_cases(256))]

    #[test]
    fn empty_path_plucks_nothing(tree in json_tree()) {
        let tree = PropertyValue::from(tree);
        prop_assert!(pluck(&tree, &PropertyPath::default()).is_none());
    }

    #[test]
    fn pluck_composes_over_path_prefixes(
        tree in json_tree(),
        head in path(1),
        tail in path(1)
    ) {
        let tree = PropertyValue::from(tree);
        let mut joined = head.clone();
        for segment in tail.segments() {
            joined = joined.child(segment.clone());
        }
        let direct = pluck(&tree, &joined);
        let stepwise = pluck(&tree, &head).and_then(|sub| pluck(sub, &tail));
        prop_assert_eq!(direct, stepwise);
    }

    #[test]
    fn parsed_path_display_round_trips(original in path(1)) {
        let reparsed = PropertyPath::parse(&original.to_string());
        prop_assert_eq!(reparsed.ok(), Some(original));
    }

    #[test]
    fn sort_is_idempotent(records in records()) {
        let once: Vec<ResourceRecord> = sorted_by_identity(&records).into_iter().cloned().collect();
        let twice = sorted_by_identity(&once);
        prop_assert_eq!(urns(&twice), urns(&once.iter().collect::<Vec<_>>()));
    }

    #[test]
    fn sort_ignores_input_permutation(
        records in records(),
        seed in any::<u64>()
    ) {
        let mut shuffled = records.clone();
        let len = shuffled.len();
        if len > 1 {
            let rotate = (seed % len as u64) as usize;
            shuffled.rotate_left(rotate);
            shuffled.reverse();
        }
        let left = DeploymentSnapshot::new(records);
        let right = DeploymentSnapshot::new(shuffled);
        let left = GraphView::new(&left).expect("unique urns");
        let right = GraphView::new(&right).expect("unique urns");
        prop_assert_eq!(urns(left.resources()), urns(right.resources()));
    }

    #[test]
    fn classification_is_total(token in ".{0,24}") {
        let class = classify_type(TypeToken::new(&token));
        let expected = if token == ROOT_STACK_TYPE {
            ResourceClass::StackRoot
        } else if token
            .strip_prefix("pulumi:providers:")
            .is_some_and(|package| !package.is_empty())
        {
            ResourceClass::Provider
        } else {
            ResourceClass::Managed
        };
        prop_assert_eq!(class, expected);
    }
}
