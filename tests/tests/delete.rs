use pretty_assertions::assert_eq;
use std::sync::Arc;
use stratum::schema::RelationUpdateType;
use stratum::stmt::{
    Condition, DeleteQuery, JoinOperator, Operator, Record, ResultField, SelectQuery, Value,
};
use stratum::{ConditionDecl, MethodDescriptor, RepositoryBuilder, ResultShape};
use tests::{setup, Issued, MockStore};

fn delete_by_id() -> MethodDescriptor {
    MethodDescriptor::new("delete_by_id").condition(ConditionDecl::param("id", Operator::Eq, 0))
}

#[test]
fn a_plain_delete_issues_no_lookup() {
    let store = Arc::new(MockStore::new());
    let ctx = setup::context(store.clone(), vec![setup::employee()]);
    let repo = ctx
        .repository(
            RepositoryBuilder::new("EmployeeRepository", "Employee")
                .method(delete_by_id().result(ResultShape::Bool)),
        )
        .unwrap();

    let result = repo.execute("delete_by_id", &[Value::I64(7)]).unwrap();
    assert_eq!(result, Value::Bool(true));

    let mut expected = DeleteQuery::new("EMPLOYEES");
    expected.conditions.push(
        JoinOperator::And,
        Condition::new("id", Operator::Eq, Value::I64(7)),
    );
    assert_eq!(store.issued(), vec![Issued::Delete(expected)]);
}

#[test]
fn zero_affected_rows_is_a_false_result() {
    let store = Arc::new(MockStore::new());
    let ctx = setup::context(store.clone(), vec![setup::employee()]);
    let repo = ctx
        .repository(
            RepositoryBuilder::new("EmployeeRepository", "Employee")
                .method(delete_by_id().result(ResultShape::Bool)),
        )
        .unwrap();

    store.queue_affected(0);
    let result = repo.execute("delete_by_id", &[Value::I64(7)]).unwrap();
    assert_eq!(result, Value::Bool(false));
}

#[test]
fn dependent_children_are_deleted_before_the_parent() {
    let store = Arc::new(MockStore::new());
    let ctx = setup::context(
        store.clone(),
        vec![
            setup::order(RelationUpdateType::None, true),
            setup::order_item(),
        ],
    );
    let repo = ctx
        .repository(RepositoryBuilder::new("OrderRepository", "Order").method(delete_by_id()))
        .unwrap();

    store.queue_rows(vec![
        Record::from([("ID", Value::I64(1))]),
        Record::from([("ID", Value::I64(2))]),
    ]);

    let result = repo.execute("delete_by_id", &[Value::I64(5)]).unwrap();
    assert_eq!(result, Value::I64(1));

    let mut id_lookup = SelectQuery::new("ORDERS");
    id_lookup.columns = vec![ResultField::new("id", "ID")];
    id_lookup.conditions.push(
        JoinOperator::And,
        Condition::new("id", Operator::Eq, Value::I64(5)),
    );

    let mut child_delete = DeleteQuery::new("ORDER_ITEMS");
    child_delete.conditions.push(
        JoinOperator::And,
        Condition::new(
            "order_id",
            Operator::In,
            Value::List(vec![Value::I64(1), Value::I64(2)]),
        ),
    );

    let mut parent_delete = DeleteQuery::new("ORDERS");
    parent_delete.conditions.push(
        JoinOperator::And,
        Condition::new("id", Operator::Eq, Value::I64(5)),
    );

    assert_eq!(
        store.issued(),
        vec![
            Issued::Select(id_lookup),
            Issued::Delete(child_delete),
            Issued::Delete(parent_delete),
        ]
    );
}

#[test]
fn no_matching_parents_skips_the_child_delete() {
    let store = Arc::new(MockStore::new());
    let ctx = setup::context(
        store.clone(),
        vec![
            setup::order(RelationUpdateType::None, true),
            setup::order_item(),
        ],
    );
    let repo = ctx
        .repository(RepositoryBuilder::new("OrderRepository", "Order").method(delete_by_id()))
        .unwrap();

    // the id lookup answers empty
    let issued_before = store.issued().len();
    repo.execute("delete_by_id", &[Value::I64(5)]).unwrap();

    let issued = store.issued();
    assert_eq!(issued.len() - issued_before, 2);
    assert!(matches!(issued[0], Issued::Select(_)));
    assert!(matches!(issued[1], Issued::Delete(ref query) if query.table == "ORDERS"));
}

#[test]
fn extension_rows_are_removed_with_their_entity() {
    let store = Arc::new(MockStore::new());
    let ctx = setup::context(store.clone(), vec![setup::employee().extendable(3)]);
    let repo = ctx
        .repository(
            RepositoryBuilder::new("EmployeeRepository", "Employee").method(delete_by_id()),
        )
        .unwrap();

    store.queue_rows(vec![Record::from([("ID", Value::I64(4))])]);
    repo.execute("delete_by_id", &[Value::I64(4)]).unwrap();

    let issued = store.issued();
    assert_eq!(issued.len(), 3);

    let mut ext_delete = DeleteQuery::new("EXT_EMPLOYEES");
    ext_delete.conditions.push(
        JoinOperator::And,
        Condition::new(
            "ENTITY_ID",
            Operator::In,
            Value::List(vec![Value::I64(4)]),
        ),
    );
    assert_eq!(issued[1], Issued::Delete(ext_delete));
    assert!(matches!(issued[2], Issued::Delete(ref query) if query.table == "EMPLOYEES"));
}
