use pretty_assertions::assert_eq;
use std::sync::Arc;
use stratum::stmt::{
    AggregateFunction, AggregateQuery, Condition, JoinOperator, Operator, Value,
};
use stratum::{ConditionDecl, ExecutorKind, MethodDescriptor, RepositoryBuilder, ResultShape};
use tests::{setup, Issued, MockStore};

#[test]
fn count_methods_compile_into_a_count_aggregate() {
    let store = Arc::new(MockStore::new());
    let ctx = setup::context(store.clone(), vec![setup::employee()]);
    let repo = ctx
        .repository(
            RepositoryBuilder::new("EmployeeRepository", "Employee").method(
                MethodDescriptor::new("count_by_age")
                    .condition(ConditionDecl::param("age", Operator::Ge, 0))
                    .result(ResultShape::Count),
            ),
        )
        .unwrap();

    store.queue_aggregate(Value::I64(3));
    let result = repo.execute("count_by_age", &[Value::I32(18)]).unwrap();
    assert_eq!(result, Value::I64(3));

    let mut expected = AggregateQuery::new("EMPLOYEES", AggregateFunction::Count, "ID");
    expected.conditions.push(
        JoinOperator::And,
        Condition::new("age", Operator::Ge, Value::I32(18)),
    );
    assert_eq!(store.issued(), vec![Issued::Aggregate(expected)]);
}

#[test]
fn explicit_kind_tag_overrides_name_prefix_matching() {
    let store = Arc::new(MockStore::new());
    let ctx = setup::context(store.clone(), vec![setup::employee()]);

    // no executor prefix matches this name; the tag alone resolves it
    let repo = ctx
        .repository(
            RepositoryBuilder::new("EmployeeRepository", "Employee").method(
                MethodDescriptor::new("is_registered")
                    .kind(ExecutorKind::Count)
                    .condition(ConditionDecl::param("email", Operator::Eq, 0))
                    .result(ResultShape::Bool),
            ),
        )
        .unwrap();

    store.queue_aggregate(Value::I64(1));
    let result = repo
        .execute("is_registered", &[Value::from("ann@example.com")])
        .unwrap();
    assert_eq!(result, Value::Bool(true));

    // default aggregate answer is zero
    let result = repo
        .execute("is_registered", &[Value::from("bob@example.com")])
        .unwrap();
    assert_eq!(result, Value::Bool(false));
}

#[test]
fn unmatched_method_name_fails_repository_construction() {
    let store = Arc::new(MockStore::new());
    let ctx = setup::context(store, vec![setup::employee()]);

    let err = ctx
        .repository(
            RepositoryBuilder::new("EmployeeRepository", "Employee")
                .method(MethodDescriptor::new("lookup_stuff")),
        )
        .unwrap_err();

    assert!(err.is_repository());
    assert!(err.to_string().contains("lookup_stuff"));
}
