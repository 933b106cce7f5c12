//! Relations: inline foreign keys, join tables, and deletion
//! protection.

use record_model::DataTypeMapping;
use record_store_core::{
    Cardinality, ErrorCategory, IngestDriver, IngestOptions, StoreError,
};
use serde_json::json;

use super::helpers::{chunked, collection, ingest_all, record, store, ty};

#[test]
fn test_one_relation_created() {
    let store = store();
    let coll = collection(&store);

    ingest_all(
        &store,
        coll,
        "parent",
        vec![record("parent", "p1", json!({"name": "first"}))],
    );
    ingest_all(
        &store,
        coll,
        "child",
        vec![record("child", "c1", json!({"owner": "rel:/parent/p1"}))],
    );

    let schema = store.get_schema(coll, &ty("child")).unwrap();
    let relation = schema.relation("owner").unwrap();
    assert_eq!(relation.target, ty("parent"));
    assert_eq!(relation.cardinality, Cardinality::One);
    assert_eq!(
        schema.mapping("owner"),
        Some(&DataTypeMapping::Relation(ty("parent")))
    );

    // the reference reads back in full grammar form
    let child = store.get_record(coll, &ty("child"), "c1").unwrap().unwrap();
    assert_eq!(child.attribute("owner"), Some(&json!("rel:/parent/p1")));
}

#[test]
fn test_missing_target_type_commits_nothing() {
    let store = store();
    let coll = collection(&store);
    let driver = IngestDriver::new(&store);

    let err = driver
        .ingest(
            coll,
            &ty("child"),
            vec![record("child", "c1", json!({"owner": "rel:/ghost/g1"}))],
            IngestOptions::default(),
        )
        .unwrap_err();
    assert_eq!(err.source.category(), ErrorCategory::MissingDependency);
    assert_eq!(err.committed.total(), 0);
    assert!(!store.type_exists(coll, &ty("child")).unwrap());
}

#[test]
fn test_missing_target_record_rejected() {
    let store = store();
    let coll = collection(&store);
    let driver = IngestDriver::new(&store);

    ingest_all(
        &store,
        coll,
        "parent",
        vec![record("parent", "p1", json!({"name": "first"}))],
    );
    // the type exists but the referenced row does not
    let err = driver
        .ingest(
            coll,
            &ty("child"),
            vec![record("child", "c1", json!({"owner": "rel:/parent/nope"}))],
            IngestOptions::default(),
        )
        .unwrap_err();
    assert_eq!(err.source.category(), ErrorCategory::Storage);
    assert!(!store.type_exists(coll, &ty("child")).unwrap());
}

#[test]
fn test_mixed_relation_values_rejected() {
    let store = store();
    let coll = collection(&store);
    let driver = IngestDriver::new(&store);

    ingest_all(
        &store,
        coll,
        "parent",
        vec![record("parent", "p1", json!({"name": "first"}))],
    );
    let err = driver
        .ingest(
            coll,
            &ty("child"),
            vec![
                record("child", "c1", json!({"owner": "rel:/parent/p1"})),
                record("child", "c2", json!({"owner": "plain text"})),
            ],
            IngestOptions::default(),
        )
        .unwrap_err();
    assert!(matches!(err.source, StoreError::MixedRelationValues { .. }));
    assert_eq!(err.source.category(), ErrorCategory::Validation);
    assert!(!store.type_exists(coll, &ty("child")).unwrap());
}

#[test]
fn test_ambiguous_relation_rejected() {
    let store = store();
    let coll = collection(&store);
    let driver = IngestDriver::new(&store);

    ingest_all(
        &store,
        coll,
        "alpha",
        vec![record("alpha", "a1", json!({"n": 1}))],
    );
    ingest_all(
        &store,
        coll,
        "beta",
        vec![record("beta", "b1", json!({"n": 1}))],
    );
    let err = driver
        .ingest(
            coll,
            &ty("child"),
            vec![
                record("child", "c1", json!({"ref": "rel:/alpha/a1"})),
                record("child", "c2", json!({"ref": "rel:/beta/b1"})),
            ],
            IngestOptions::default(),
        )
        .unwrap_err();
    assert!(matches!(err.source, StoreError::AmbiguousRelation { .. }));
    assert!(!store.type_exists(coll, &ty("child")).unwrap());
}

#[test]
fn test_many_relation_uses_join_table() {
    let store = store();
    let coll = collection(&store);

    ingest_all(
        &store,
        coll,
        "parent",
        vec![
            record("parent", "p1", json!({"n": 1})),
            record("parent", "p2", json!({"n": 2})),
            record("parent", "p3", json!({"n": 3})),
        ],
    );
    ingest_all(
        &store,
        coll,
        "child",
        vec![record(
            "child",
            "c1",
            json!({"owners": ["rel:/parent/p1", "rel:/parent/p2"]}),
        )],
    );

    let schema = store.get_schema(coll, &ty("child")).unwrap();
    let relation = schema.relation("owners").unwrap();
    assert_eq!(relation.cardinality, Cardinality::Many);
    // array relations never become inline columns
    assert!(schema.column("owners").is_none());

    let child = store.get_record(coll, &ty("child"), "c1").unwrap().unwrap();
    assert_eq!(
        child.attribute("owners"),
        Some(&json!(["rel:/parent/p1", "rel:/parent/p2"]))
    );

    // re-upserting replaces the reference list instead of appending
    ingest_all(
        &store,
        coll,
        "child",
        vec![record("child", "c1", json!({"owners": ["rel:/parent/p3"]}))],
    );
    let child = store.get_record(coll, &ty("child"), "c1").unwrap().unwrap();
    assert_eq!(child.attribute("owners"), Some(&json!(["rel:/parent/p3"])));
}

#[test]
fn test_array_in_first_chunk_is_many() {
    let store = store();
    let coll = collection(&store);

    ingest_all(
        &store,
        coll,
        "parent",
        vec![record("parent", "p1", json!({"n": 1}))],
    );
    // a single-element array still selects join-table storage
    ingest_all(
        &store,
        coll,
        "child",
        vec![record("child", "c1", json!({"owners": ["rel:/parent/p1"]}))],
    );
    let schema = store.get_schema(coll, &ty("child")).unwrap();
    assert_eq!(
        schema.relation("owners").unwrap().cardinality,
        Cardinality::Many
    );
}

#[test]
fn test_many_after_one_rejected() {
    let store = store();
    let coll = collection(&store);
    let driver = IngestDriver::new(&store);

    ingest_all(
        &store,
        coll,
        "parent",
        vec![
            record("parent", "p1", json!({"n": 1})),
            record("parent", "p2", json!({"n": 2})),
        ],
    );
    ingest_all(
        &store,
        coll,
        "child",
        vec![record("child", "c1", json!({"owner": "rel:/parent/p1"}))],
    );
    let err = driver
        .ingest(
            coll,
            &ty("child"),
            vec![record(
                "child",
                "c2",
                json!({"owner": ["rel:/parent/p1", "rel:/parent/p2"]}),
            )],
            IngestOptions::default(),
        )
        .unwrap_err();
    assert!(matches!(
        err.source,
        StoreError::RelationCardinalityChanged { .. }
    ));
}

#[test]
fn test_single_reference_into_established_many() {
    let store = store();
    let coll = collection(&store);

    ingest_all(
        &store,
        coll,
        "parent",
        vec![
            record("parent", "p1", json!({"n": 1})),
            record("parent", "p2", json!({"n": 2})),
        ],
    );
    ingest_all(
        &store,
        coll,
        "child",
        vec![record("child", "c1", json!({"owners": ["rel:/parent/p1"]}))],
    );
    // a later scalar reference is stored as a one-element list
    ingest_all(
        &store,
        coll,
        "child",
        vec![record("child", "c2", json!({"owners": "rel:/parent/p2"}))],
    );
    let second = store.get_record(coll, &ty("child"), "c2").unwrap().unwrap();
    assert_eq!(second.attribute("owners"), Some(&json!(["rel:/parent/p2"])));
}

#[test]
fn test_retargeting_established_relation_rejected() {
    let store = store();
    let coll = collection(&store);
    let driver = IngestDriver::new(&store);

    for parent in ["alpha", "beta"] {
        ingest_all(
            &store,
            coll,
            parent,
            vec![record(parent, "x1", json!({"n": 1}))],
        );
    }
    ingest_all(
        &store,
        coll,
        "child",
        vec![record("child", "c1", json!({"ref": "rel:/alpha/x1"}))],
    );
    let err = driver
        .ingest(
            coll,
            &ty("child"),
            vec![record("child", "c2", json!({"ref": "rel:/beta/x1"}))],
            IngestOptions::default(),
        )
        .unwrap_err();
    assert!(matches!(err.source, StoreError::RelationTargetChanged { .. }));
}

#[test]
fn test_relation_column_widens_to_text_across_runs() {
    let store = store();
    let coll = collection(&store);

    ingest_all(
        &store,
        coll,
        "parent",
        vec![record("parent", "p1", json!({"n": 1}))],
    );
    ingest_all(
        &store,
        coll,
        "child",
        vec![record("child", "c1", json!({"owner": "rel:/parent/p1"}))],
    );
    // plain text arriving for the attribute widens the column away
    // from the relation; the foreign key drops
    ingest_all(
        &store,
        coll,
        "child",
        vec![record("child", "c2", json!({"owner": "plain text"}))],
    );

    let schema = store.get_schema(coll, &ty("child")).unwrap();
    assert_eq!(schema.mapping("owner"), Some(&DataTypeMapping::String));
    assert!(schema.relation("owner").is_none());

    // the earlier reference survives as its full grammar form
    let first = store.get_record(coll, &ty("child"), "c1").unwrap().unwrap();
    assert_eq!(first.attribute("owner"), Some(&json!("rel:/parent/p1")));
}

#[test]
fn test_self_reference_within_chunk() {
    let store = store();
    let coll = collection(&store);

    ingest_all(
        &store,
        coll,
        "node",
        vec![
            record("node", "1", json!({"next": "rel:/node/2"})),
            record("node", "2", json!({"next": null})),
        ],
    );
    let first = store.get_record(coll, &ty("node"), "1").unwrap().unwrap();
    assert_eq!(first.attribute("next"), Some(&json!("rel:/node/2")));
}

#[test]
fn test_delete_type_rejected_while_referenced() {
    let store = store();
    let coll = collection(&store);

    ingest_all(
        &store,
        coll,
        "parent",
        vec![record("parent", "p1", json!({"n": 1}))],
    );
    ingest_all(
        &store,
        coll,
        "child",
        vec![record("child", "c1", json!({"owner": "rel:/parent/p1"}))],
    );

    let err = store.delete_type(coll, &ty("parent")).unwrap_err();
    assert!(matches!(err, StoreError::TypeInUse { .. }));
    assert_eq!(err.category(), ErrorCategory::Conflict);

    // dropping the referencing type first unblocks the target
    store.delete_type(coll, &ty("child")).unwrap();
    store.delete_type(coll, &ty("parent")).unwrap();
    assert!(store.list_types(coll).unwrap().is_empty());
}

#[test]
fn test_delete_record_rejected_while_referenced() {
    let store = store();
    let coll = collection(&store);

    ingest_all(
        &store,
        coll,
        "parent",
        vec![record("parent", "p1", json!({"n": 1}))],
    );
    ingest_all(
        &store,
        coll,
        "child",
        vec![record("child", "c1", json!({"owners": ["rel:/parent/p1"]}))],
    );

    let err = store.delete_record(coll, &ty("parent"), "p1").unwrap_err();
    assert!(matches!(err, StoreError::RecordInUse { .. }));

    store.delete_record(coll, &ty("child"), "c1").unwrap();
    assert!(store.delete_record(coll, &ty("parent"), "p1").unwrap());
}

#[test]
fn test_explicit_null_clears_join_rows() {
    let store = store();
    let coll = collection(&store);

    ingest_all(
        &store,
        coll,
        "parent",
        vec![record("parent", "p1", json!({"n": 1}))],
    );
    ingest_all(
        &store,
        coll,
        "child",
        vec![record("child", "c1", json!({"owners": ["rel:/parent/p1"]}))],
    );
    ingest_all(
        &store,
        coll,
        "child",
        vec![record("child", "c1", json!({"owners": null}))],
    );
    let child = store.get_record(coll, &ty("child"), "c1").unwrap().unwrap();
    assert_eq!(child.attribute("owners"), Some(&json!([])));
}

#[test]
fn test_chunked_relation_import_converges() {
    let store = store();
    let coll = collection(&store);
    let driver = IngestDriver::new(&store);

    ingest_all(
        &store,
        coll,
        "parent",
        vec![
            record("parent", "p1", json!({"n": 1})),
            record("parent", "p2", json!({"n": 2})),
        ],
    );
    // chunk boundaries fall between relational and plain records; the
    // converged schema must not depend on where
    let records = vec![
        record("child", "c1", json!({"owner": "rel:/parent/p1", "label": "a"})),
        record("child", "c2", json!({"owner": null, "label": "b"})),
        record("child", "c3", json!({"owner": "rel:/parent/p2"})),
    ];
    driver
        .ingest(coll, &ty("child"), records, chunked(1))
        .unwrap();

    let schema = store.get_schema(coll, &ty("child")).unwrap();
    assert_eq!(schema.relation("owner").unwrap().target, ty("parent"));
    assert_eq!(schema.mapping("label"), Some(&DataTypeMapping::String));
    assert_eq!(store.count_records(coll, &ty("child")).unwrap(), 3);
}
