use pretty_assertions::assert_eq;
use std::sync::Arc;
use stratum::stmt::{
    Condition, JoinOperator, NullCheck, Operator, OrderByField, OrderByType, Record, ResultField,
    SelectQuery, Value,
};
use stratum::{ConditionDecl, MethodDescriptor, RepositoryBuilder, Repository, ResultShape};
use tests::{setup, Issued, MockStore};

fn employee_columns() -> Vec<ResultField> {
    vec![
        ResultField::new("id", "ID"),
        ResultField::new("name", "NAME"),
        ResultField::new("email", "EMAIL"),
        ResultField::new("age", "AGE"),
    ]
}

fn repository(store: &Arc<MockStore>, method: MethodDescriptor) -> Repository {
    let ctx = setup::context(store.clone(), vec![setup::employee()]);
    ctx.repository(RepositoryBuilder::new("EmployeeRepository", "Employee").method(method))
        .unwrap()
}

#[test]
fn range_conditions_and_ordering_compile_into_the_query() {
    let store = Arc::new(MockStore::new());
    let repo = repository(
        &store,
        MethodDescriptor::new("find_by_age_between")
            .condition(ConditionDecl::param("age", Operator::Ge, 0))
            .condition(ConditionDecl::param("age", Operator::Le, 1))
            .order_by("name", OrderByType::Asc),
    );

    store.queue_rows(vec![Record::from([
        ("ID", Value::I64(1)),
        ("NAME", Value::from("Ann")),
        ("EMAIL", Value::from("ann@example.com")),
        ("AGE", Value::I32(24)),
    ])]);

    let result = repo
        .execute("find_by_age_between", &[Value::I32(18), Value::I32(30)])
        .unwrap();

    let mut expected = SelectQuery::new("EMPLOYEES");
    expected.columns = employee_columns();
    expected.conditions.push(
        JoinOperator::And,
        Condition::new("age", Operator::Ge, Value::I32(18)),
    );
    expected.conditions.push(
        JoinOperator::And,
        Condition::new("age", Operator::Le, Value::I32(30)),
    );
    expected.order_by = vec![OrderByField::new("NAME", OrderByType::Asc)];
    assert_eq!(store.issued(), vec![Issued::Select(expected)]);

    let expected_record = Record::from([
        ("id", Value::I64(1)),
        ("name", Value::from("Ann")),
        ("email", Value::from("ann@example.com")),
        ("age", Value::I32(24)),
    ]);
    assert_eq!(result, Value::List(vec![Value::Record(expected_record)]));
}

#[test]
fn null_operand_skips_the_predicate_by_default() {
    let store = Arc::new(MockStore::new());
    let repo = repository(
        &store,
        MethodDescriptor::new("find_by_email")
            .condition(ConditionDecl::param("email", Operator::Eq, 0)),
    );

    repo.execute("find_by_email", &[Value::Null]).unwrap();

    let mut expected = SelectQuery::new("EMPLOYEES");
    expected.columns = employee_columns();
    assert_eq!(store.issued(), vec![Issued::Select(expected)]);
}

#[test]
fn null_operand_becomes_an_is_null_check_when_declared() {
    let store = Arc::new(MockStore::new());
    let repo = repository(
        &store,
        MethodDescriptor::new("find_without_email").condition(
            ConditionDecl::param("email", Operator::Eq, 0).null_check(NullCheck::IsNull),
        ),
    );

    repo.execute("find_without_email", &[Value::Null]).unwrap();

    let issued = store.issued();
    let Issued::Select(query) = &issued[0] else {
        panic!("expected a select, got {issued:?}");
    };

    let conditions: Vec<_> = query.conditions.conditions().collect();
    assert_eq!(conditions.len(), 1);
    assert_eq!(conditions[0].path, "email");
    assert_eq!(conditions[0].op, Operator::Eq);
    assert!(conditions[0].is_null_check());
}

#[test]
fn single_record_shape_limits_the_query_to_two_rows() {
    let store = Arc::new(MockStore::new());
    let repo = repository(
        &store,
        MethodDescriptor::new("fetch_by_id")
            .condition(ConditionDecl::param("id", Operator::Eq, 0))
            .result(ResultShape::One),
    );

    store.queue_rows(vec![Record::from([
        ("ID", Value::I64(7)),
        ("NAME", Value::from("Bob")),
    ])]);
    repo.execute("fetch_by_id", &[Value::I64(7)]).unwrap();

    let issued = store.issued();
    let Issued::Select(query) = &issued[0] else {
        panic!("expected a select, got {issued:?}");
    };
    assert_eq!(query.limit, Some(2));
}

#[test]
fn one_shape_demands_exactly_one_row() {
    let store = Arc::new(MockStore::new());
    let repo = repository(
        &store,
        MethodDescriptor::new("fetch_by_id")
            .condition(ConditionDecl::param("id", Operator::Eq, 0))
            .result(ResultShape::One),
    );

    // no rows queued: empty result
    let err = repo.execute("fetch_by_id", &[Value::I64(7)]).unwrap_err();
    assert!(err.is_record_not_found());

    store.queue_rows(vec![
        Record::from([("ID", Value::I64(1))]),
        Record::from([("ID", Value::I64(2))]),
    ]);
    let err = repo.execute("fetch_by_id", &[Value::I64(7)]).unwrap_err();
    assert!(err.is_too_many_records());
}

#[test]
fn optional_one_shape_tolerates_an_empty_result() {
    let store = Arc::new(MockStore::new());
    let repo = repository(
        &store,
        MethodDescriptor::new("fetch_by_id")
            .condition(ConditionDecl::param("id", Operator::Eq, 0))
            .result(ResultShape::OptionalOne),
    );

    let result = repo.execute("fetch_by_id", &[Value::I64(7)]).unwrap();
    assert_eq!(result, Value::Null);
}

#[test]
fn scalar_shape_projects_a_single_column() {
    let store = Arc::new(MockStore::new());
    let repo = repository(
        &store,
        MethodDescriptor::new("find_name_by_id")
            .condition(ConditionDecl::param("id", Operator::Eq, 0))
            .project(["name"])
            .result(ResultShape::Scalar),
    );

    store.queue_rows(vec![Record::from([("NAME", Value::from("Ann"))])]);
    let result = repo.execute("find_name_by_id", &[Value::I64(1)]).unwrap();
    assert_eq!(result, Value::from("Ann"));

    let issued = store.issued();
    let Issued::Select(query) = &issued[0] else {
        panic!("expected a select, got {issued:?}");
    };
    assert_eq!(query.columns, vec![ResultField::new("name", "NAME")]);
}

#[test]
fn or_groups_compile_into_nested_condition_trees() {
    let store = Arc::new(MockStore::new());
    let repo = repository(
        &store,
        MethodDescriptor::new("find_by_name_or_email").condition(ConditionDecl::group(vec![
            ConditionDecl::param("name", Operator::Eq, 0),
            ConditionDecl::param("email", Operator::Eq, 0).or(),
        ])),
    );

    repo.execute("find_by_name_or_email", &[Value::from("ann")])
        .unwrap();

    let issued = store.issued();
    let Issued::Select(query) = &issued[0] else {
        panic!("expected a select, got {issued:?}");
    };

    assert_eq!(query.conditions.len(), 1);
    let leaves: Vec<_> = query.conditions.conditions().collect();
    assert_eq!(
        leaves
            .iter()
            .map(|condition| condition.path.as_str())
            .collect::<Vec<_>>(),
        ["name", "email"]
    );
}

#[test]
fn owned_relation_columns_read_back_as_foreign_keys() {
    let store = Arc::new(MockStore::new());
    let ctx = setup::context(store.clone(), vec![setup::ticket(), setup::customer()]);
    let repo = ctx
        .repository(
            RepositoryBuilder::new("TicketRepository", "Ticket").method(
                MethodDescriptor::new("fetch_by_id")
                    .condition(ConditionDecl::param("id", Operator::Eq, 0))
                    .result(ResultShape::One),
            ),
        )
        .unwrap();

    store.queue_rows(vec![Record::from([
        ("ID", Value::I64(1)),
        ("TITLE", Value::from("broken login")),
        ("CUSTOMER_ID", Value::I64(42)),
    ])]);

    let result = repo.execute("fetch_by_id", &[Value::I64(1)]).unwrap();
    assert_eq!(
        result,
        Value::Record(Record::from([
            ("id", Value::I64(1)),
            ("title", Value::from("broken login")),
            ("customer", Value::I64(42)),
        ]))
    );
}

#[test]
fn unknown_condition_path_fails_repository_construction() {
    let store = Arc::new(MockStore::new());
    let ctx = setup::context(store, vec![setup::employee()]);

    let err = ctx
        .repository(
            RepositoryBuilder::new("EmployeeRepository", "Employee").method(
                MethodDescriptor::new("find_by_salary")
                    .condition(ConditionDecl::param("salary", Operator::Eq, 0)),
            ),
        )
        .unwrap_err();

    assert!(err.is_repository());
    assert!(err.to_string().contains("salary"));
}
