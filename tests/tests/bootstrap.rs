use pretty_assertions::assert_eq;
use std::sync::Arc;
use stratum::schema::{EntityBuilder, FieldBuilder, RelationDetails, RustType};
use stratum::stmt::Value;
use stratum::{MethodDescriptor, PersistenceContext, RepositoryBuilder};
use tests::{setup, Issued, MockStore};

fn owner(name: &str, table: &str, target: &str, column: &str) -> EntityBuilder {
    EntityBuilder::new(name, table)
        .field(FieldBuilder::new("id", RustType::I64).id())
        .field(
            FieldBuilder::new("target", RustType::Entity(target.to_string()))
                .column(column)
                .relation(RelationDetails::owned(target)),
        )
}

#[test]
fn tables_are_created_parents_first() {
    let store = Arc::new(MockStore::new());
    let ctx = setup::context(store.clone(), vec![setup::ticket(), setup::customer()]);

    ctx.create_tables().unwrap();

    assert_eq!(
        store.issued(),
        vec![
            Issued::CreateTable("CUSTOMERS".into()),
            Issued::CreateTable("TICKETS".into()),
        ]
    );
}

#[test]
fn independent_entities_are_created_in_name_order() {
    let store = Arc::new(MockStore::new());
    let ctx = setup::context(store.clone(), vec![setup::employee(), setup::account()]);

    ctx.create_tables().unwrap();

    assert_eq!(
        store.issued(),
        vec![
            Issued::CreateTable("ACCOUNTS".into()),
            Issued::CreateTable("EMPLOYEES".into()),
        ]
    );
}

#[test]
fn a_dependency_cycle_is_a_configuration_error() {
    let store = Arc::new(MockStore::new());
    let ctx = setup::context(
        store,
        vec![
            owner("Alpha", "ALPHAS", "Beta", "BETA_ID"),
            owner("Beta", "BETAS", "Alpha", "ALPHA_ID"),
        ],
    );

    let err = ctx.create_tables().unwrap_err();
    assert!(err.is_configuration());
    assert!(err.to_string().contains("cycle"));
}

#[test]
fn an_unregistered_dependency_is_a_configuration_error() {
    let store = Arc::new(MockStore::new());
    let ctx = setup::context(store, vec![setup::ticket()]);

    let err = ctx.create_tables().unwrap_err();
    assert!(err.is_configuration());
    assert!(err.to_string().contains("Customer"));
}

#[test]
fn duplicate_method_declarations_are_rejected() {
    let store = Arc::new(MockStore::new());
    let ctx = setup::context(store, vec![setup::employee()]);

    let err = ctx
        .repository(
            RepositoryBuilder::new("EmployeeRepository", "Employee")
                .method(MethodDescriptor::new("save"))
                .method(MethodDescriptor::new("save")),
        )
        .unwrap_err();

    assert!(err.is_repository());
}

#[test]
fn invoking_an_undeclared_method_is_a_repository_error() {
    let store = Arc::new(MockStore::new());
    let ctx = setup::context(store, vec![setup::employee()]);
    let repo = ctx
        .repository(
            RepositoryBuilder::new("EmployeeRepository", "Employee")
                .method(MethodDescriptor::new("save")),
        )
        .unwrap();

    let err = repo.execute("find_all", &[Value::Null]).unwrap_err();
    assert!(err.is_repository());
    assert!(err.to_string().contains("find_all"));
}

#[test]
fn removing_an_entity_purges_its_registration() {
    let store = Arc::new(MockStore::new());
    let ctx = PersistenceContext::builder(store)
        .entity(setup::employee())
        .build()
        .unwrap();

    assert!(ctx.registry().get("Employee").is_ok());
    ctx.entity_removed("Employee");
    assert!(ctx.registry().get("Employee").is_err());
}
