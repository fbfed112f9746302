use pretty_assertions::assert_eq;
use std::sync::Arc;
use stratum::driver::Capability;
use stratum::stmt::{ColumnValue, InsertQuery, Record, Value};
use stratum::{MethodDescriptor, RepositoryBuilder, Repository, ResultShape};
use tests::{setup, Issued, MockStore};

fn employee_repo(store: &Arc<MockStore>, method: MethodDescriptor) -> Repository {
    let ctx = setup::context(store.clone(), vec![setup::employee()]);
    ctx.repository(RepositoryBuilder::new("EmployeeRepository", "Employee").method(method))
        .unwrap()
}

fn ann(id: Option<i64>) -> Record {
    let mut record = Record::from([
        ("name", Value::from("Ann")),
        ("email", Value::from("ann@example.com")),
        ("age", Value::I32(24)),
    ]);
    if let Some(id) = id {
        record.insert("id", Value::I64(id));
    }
    record
}

#[test]
fn save_compiles_every_table_field_into_the_insert() {
    let store = Arc::new(MockStore::new());
    let repo = employee_repo(&store, MethodDescriptor::new("save"));

    let result = repo
        .execute("save", &[Value::Record(ann(Some(3)))])
        .unwrap();

    let mut expected = InsertQuery::new("EMPLOYEES");
    expected.columns = vec![
        ColumnValue::new("ID", Value::I64(3)),
        ColumnValue::new("NAME", Value::from("Ann")),
        ColumnValue::new("EMAIL", Value::from("ann@example.com")),
        ColumnValue::new("AGE", Value::I32(24)),
    ];
    assert_eq!(store.issued(), vec![Issued::Insert(expected)]);

    // the saved record comes back, identity included
    let saved = result.expect_record();
    assert_eq!(saved.get("id"), Some(&Value::I64(3)));
}

#[test]
fn missing_identity_is_fetched_from_the_store() {
    let store = Arc::new(MockStore::new());
    let repo = employee_repo(
        &store,
        MethodDescriptor::new("save")
            .auto_fetch_id()
            .result(ResultShape::Scalar),
    );

    let result = repo.execute("save", &[Value::Record(ann(None))]).unwrap();
    assert_eq!(result, Value::I64(1));

    let issued = store.issued();
    let Issued::Insert(query) = &issued[0] else {
        panic!("expected an insert, got {issued:?}");
    };
    assert!(query.fetch_generated_id);
    assert!(query.columns.iter().all(|column| column.column != "ID"));
}

#[test]
fn a_provided_identity_is_never_regenerated() {
    let store = Arc::new(MockStore::new());
    let repo = employee_repo(
        &store,
        MethodDescriptor::new("save")
            .auto_fetch_id()
            .result(ResultShape::Scalar),
    );

    let result = repo
        .execute("save", &[Value::Record(ann(Some(42)))])
        .unwrap();
    assert_eq!(result, Value::I64(42));

    let issued = store.issued();
    let Issued::Insert(query) = &issued[0] else {
        panic!("expected an insert, got {issued:?}");
    };
    assert!(!query.fetch_generated_id);
}

#[test]
fn unique_clash_aborts_the_save_before_the_insert() {
    let store = Arc::new(MockStore::with_capability(Capability {
        explicit_unique_check: true,
        explicit_foreign_check: false,
    }));
    let repo = employee_repo(&store, MethodDescriptor::new("save"));

    // the pre-write probe finds a clashing row
    store.queue_rows(vec![Record::from([("ID", Value::I64(9))])]);

    let err = repo
        .execute("save", &[Value::Record(ann(Some(3)))])
        .unwrap_err();
    assert!(err.is_unique_constraint());
    assert!(err.to_string().contains("already exists"));

    let issued = store.issued();
    assert_eq!(issued.len(), 1);
    assert!(matches!(issued[0], Issued::Select(_)));
}

#[test]
fn unique_probe_passes_when_no_row_clashes() {
    let store = Arc::new(MockStore::with_capability(Capability {
        explicit_unique_check: true,
        explicit_foreign_check: false,
    }));
    let repo = employee_repo(&store, MethodDescriptor::new("save"));

    repo.execute("save", &[Value::Record(ann(Some(3)))])
        .unwrap();

    let issued = store.issued();
    assert_eq!(issued.len(), 2);
    assert!(matches!(issued[0], Issued::Select(_)));
    assert!(matches!(issued[1], Issued::Insert(_)));
}

#[test]
fn owned_relations_are_verified_against_the_target_table() {
    let store = Arc::new(MockStore::with_capability(Capability {
        explicit_unique_check: false,
        explicit_foreign_check: true,
    }));
    let ctx = setup::context(store.clone(), vec![setup::customer(), setup::ticket()]);
    let repo = ctx
        .repository(
            RepositoryBuilder::new("TicketRepository", "Ticket")
                .method(MethodDescriptor::new("save")),
        )
        .unwrap();

    let record = Record::from([
        ("id", Value::I64(1)),
        ("title", Value::from("broken printer")),
        ("customer", Value::I64(5)),
    ]);

    // no target row queued: the reference is dangling
    let err = repo
        .execute("save", &[Value::Record(record.clone())])
        .unwrap_err();
    assert!(err.is_foreign_constraint());

    let issued = store.take_issued();
    assert_eq!(issued.len(), 1);
    let Issued::Select(probe) = &issued[0] else {
        panic!("expected a select, got {issued:?}");
    };
    assert_eq!(probe.table, "CUSTOMERS");

    // with the customer present the insert carries the key column
    store.queue_rows(vec![Record::from([("ID", Value::I64(5))])]);
    repo.execute("save", &[Value::Record(record)]).unwrap();

    let issued = store.take_issued();
    let Issued::Insert(query) = &issued[1] else {
        panic!("expected an insert, got {issued:?}");
    };
    assert!(query
        .columns
        .contains(&ColumnValue::new("CUSTOMER_ID", Value::I64(5))));
}

#[test]
fn unknown_fields_route_into_the_extension_table() {
    let store = Arc::new(MockStore::new());
    let ctx = setup::context(store.clone(), vec![setup::employee().extendable(3)]);
    let repo = ctx
        .repository(
            RepositoryBuilder::new("EmployeeRepository", "Employee")
                .method(MethodDescriptor::new("save")),
        )
        .unwrap();

    let mut record = ann(Some(2));
    record.insert("badge_color", Value::from("red"));

    repo.execute("save", &[Value::Record(record)]).unwrap();

    let issued = store.issued();
    assert_eq!(issued.len(), 2);

    let Issued::Insert(main) = &issued[0] else {
        panic!("expected the row insert, got {issued:?}");
    };
    assert_eq!(main.table, "EMPLOYEES");
    assert!(main.columns.iter().all(|column| column.column != "badge_color"));

    let mut expected = InsertQuery::new("EXT_EMPLOYEES");
    expected.columns = vec![
        ColumnValue::new("ENTITY_ID", Value::I64(2)),
        ColumnValue::new("FIELD0", Value::from("red")),
    ];
    assert_eq!(issued[1], Issued::Insert(expected));
}

#[test]
fn unknown_fields_on_a_plain_entity_are_rejected() {
    let store = Arc::new(MockStore::new());
    let repo = employee_repo(&store, MethodDescriptor::new("save"));

    let mut record = ann(Some(2));
    record.insert("badge_color", Value::from("red"));

    let err = repo.execute("save", &[Value::Record(record)]).unwrap_err();
    assert!(err.is_configuration());
    assert!(store.issued().is_empty());
}
