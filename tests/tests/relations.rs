use pretty_assertions::assert_eq;
use std::sync::Arc;
use stratum::schema::RelationUpdateType;
use stratum::stmt::{
    Assignment, ColumnValue, Condition, InsertQuery, JoinOperator, Operator, Record, UpdateQuery,
    Value,
};
use stratum::{MethodDescriptor, RepositoryBuilder, Repository, ResultShape};
use tests::{setup, Issued, MockStore};

fn order_repo(store: &Arc<MockStore>, update_type: RelationUpdateType) -> Repository {
    let ctx = setup::context(
        store.clone(),
        vec![setup::order(update_type, false), setup::order_item()],
    );
    ctx.repository(
        RepositoryBuilder::new("OrderRepository", "Order").method(
            MethodDescriptor::new("update")
                .entity_param(0)
                .result(ResultShape::Count),
        ),
    )
    .unwrap()
}

fn item(id: i64, label: &str) -> Value {
    Value::Record(Record::from([
        ("id", Value::I64(id)),
        ("label", Value::from(label)),
        ("order_id", Value::I64(10)),
    ]))
}

fn order_record(items: Vec<Value>) -> Record {
    Record::from([
        ("id", Value::I64(10)),
        ("label", Value::from("changed")),
        ("items", Value::List(items)),
    ])
}

/// Persisted children 1, 2, 3; incoming 2, 3 and one new record.
fn run_reconcile(store: &Arc<MockStore>, repo: &Repository) {
    store.queue_rows(vec![
        Record::from([("ID", Value::I64(1))]),
        Record::from([("ID", Value::I64(2))]),
        Record::from([("ID", Value::I64(3))]),
    ]);

    let new_item = Value::Record(Record::from([("label", Value::from("new"))]));
    let record = order_record(vec![item(2, "b"), item(3, "c"), new_item]);
    repo.execute("update", &[Value::Record(record)]).unwrap();
}

#[test]
fn sync_relation_inserts_added_and_nulls_removed_keys() {
    let store = Arc::new(MockStore::new());
    let repo = order_repo(&store, RelationUpdateType::SyncRelation);

    run_reconcile(&store, &repo);

    let mut parent_update = UpdateQuery::new("ORDERS");
    parent_update.assignments = vec![Assignment::set("LABEL", Value::from("changed"))];
    parent_update.conditions.push(
        JoinOperator::And,
        Condition::new("id", Operator::Eq, Value::I64(10)),
    );

    let mut added_insert = InsertQuery::new("ORDER_ITEMS");
    added_insert.columns = vec![
        ColumnValue::new("ID", Value::Null),
        ColumnValue::new("LABEL", Value::from("new")),
        ColumnValue::new("ORDER_ID", Value::I64(10)),
    ];

    // the removed child keeps its row; only the key is severed
    let mut severed = UpdateQuery::new("ORDER_ITEMS");
    severed.assignments = vec![Assignment::set("ORDER_ID", Value::Null)];
    severed.conditions.push(
        JoinOperator::And,
        Condition::new("id", Operator::In, Value::List(vec![Value::I64(1)])),
    );

    let issued = store.issued();
    assert_eq!(issued[0], Issued::Update(parent_update));
    assert!(matches!(issued[1], Issued::Select(ref query) if query.table == "ORDER_ITEMS"));
    assert_eq!(issued[2], Issued::Insert(added_insert));
    assert_eq!(issued[3], Issued::Update(severed));
    assert_eq!(issued.len(), 4);
}

#[test]
fn cascade_relation_deletes_removed_and_updates_retained() {
    let store = Arc::new(MockStore::new());
    let repo = order_repo(&store, RelationUpdateType::Cascade);

    run_reconcile(&store, &repo);

    let issued = store.issued();
    assert_eq!(issued.len(), 6);

    assert!(matches!(issued[0], Issued::Update(ref query) if query.table == "ORDERS"));
    assert!(matches!(issued[1], Issued::Select(_)));
    assert!(matches!(issued[2], Issued::Insert(ref query) if query.table == "ORDER_ITEMS"));

    let Issued::Delete(removed) = &issued[3] else {
        panic!("expected the removed-children delete, got {issued:?}");
    };
    assert_eq!(removed.table, "ORDER_ITEMS");
    let leaves: Vec<_> = removed.conditions.conditions().collect();
    assert_eq!(leaves[0].op, Operator::In);
    assert_eq!(leaves[0].value, Value::List(vec![Value::I64(1)]));

    // retained children are overwritten in incoming order
    let mut retained_b = UpdateQuery::new("ORDER_ITEMS");
    retained_b.assignments = vec![
        Assignment::set("LABEL", Value::from("b")),
        Assignment::set("ORDER_ID", Value::I64(10)),
    ];
    retained_b.conditions.push(
        JoinOperator::And,
        Condition::new("id", Operator::Eq, Value::I64(2)),
    );
    assert_eq!(issued[4], Issued::Update(retained_b));
    assert!(matches!(issued[5], Issued::Update(ref query) if query.table == "ORDER_ITEMS"));
}

#[test]
fn persisted_ids_diff_correctly_across_driver_integer_widths() {
    let store = Arc::new(MockStore::new());
    let repo = order_repo(&store, RelationUpdateType::SyncRelation);

    // the driver hands ids back narrower than the declared i64 key
    store.queue_rows(vec![
        Record::from([("ID", Value::I32(1))]),
        Record::from([("ID", Value::I32(2))]),
    ]);

    let record = order_record(vec![item(2, "b")]);
    repo.execute("update", &[Value::Record(record)]).unwrap();

    let mut severed = UpdateQuery::new("ORDER_ITEMS");
    severed.assignments = vec![Assignment::set("ORDER_ID", Value::Null)];
    severed.conditions.push(
        JoinOperator::And,
        Condition::new("id", Operator::In, Value::List(vec![Value::I64(1)])),
    );

    let issued = store.issued();
    // parent update, id lookup, sever of the removed child; child 2 is
    // retained and left alone under sync
    assert_eq!(issued.len(), 3);
    assert_eq!(issued[2], Issued::Update(severed));
}

#[test]
fn an_absent_relation_list_leaves_children_untouched() {
    let store = Arc::new(MockStore::new());
    let repo = order_repo(&store, RelationUpdateType::SyncRelation);

    let record = Record::from([("id", Value::I64(10)), ("label", Value::from("changed"))]);
    repo.execute("update", &[Value::Record(record)]).unwrap();

    let issued = store.issued();
    assert_eq!(issued.len(), 1);
    assert!(matches!(issued[0], Issued::Update(ref query) if query.table == "ORDERS"));
}

#[test]
fn reapplying_the_same_state_only_rewrites_retained_children() {
    let store = Arc::new(MockStore::new());
    let repo = order_repo(&store, RelationUpdateType::Cascade);

    // persisted set already equals the incoming set
    store.queue_rows(vec![
        Record::from([("ID", Value::I64(2))]),
        Record::from([("ID", Value::I64(3))]),
    ]);

    let record = order_record(vec![item(2, "b"), item(3, "c")]);
    repo.execute("update", &[Value::Record(record)]).unwrap();

    let issued = store.issued();
    // parent update, id lookup, two retained overwrites; nothing added or
    // deleted
    assert_eq!(issued.len(), 4);
    assert!(matches!(issued[2], Issued::Update(_)));
    assert!(matches!(issued[3], Issued::Update(_)));
}
