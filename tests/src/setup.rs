//! Shared entity fixtures for the integration tests.

use crate::MockStore;
use std::sync::Arc;
use stratum::PersistenceContext;
use stratum_core::schema::{
    EntityBuilder, FieldBuilder, RelationDetails, RelationUpdateType, RustType,
    UniqueConstraintDetails,
};

pub fn employee() -> EntityBuilder {
    EntityBuilder::new("Employee", "EMPLOYEES")
        .field(FieldBuilder::new("id", RustType::I64).id())
        .field(FieldBuilder::new("name", RustType::String).not_null())
        .field(FieldBuilder::new("email", RustType::String))
        .field(FieldBuilder::new("age", RustType::I32))
        .unique_constraint(
            UniqueConstraintDetails::new("EMAIL", vec!["email".into()])
                .message("an employee with this email already exists"),
        )
}

pub fn account() -> EntityBuilder {
    EntityBuilder::new("Account", "ACCOUNTS")
        .field(FieldBuilder::new("id", RustType::I64).id())
        .field(FieldBuilder::new("balance", RustType::I64))
        .field(FieldBuilder::new("version", RustType::I32).version())
}

pub fn customer() -> EntityBuilder {
    EntityBuilder::new("Customer", "CUSTOMERS")
        .field(FieldBuilder::new("id", RustType::I64).id())
        .field(FieldBuilder::new("name", RustType::String).not_null())
}

/// An order whose `items` relation carries the given reconciliation policy.
pub fn order(update_type: RelationUpdateType, delete_with_parent: bool) -> EntityBuilder {
    let mut relation =
        RelationDetails::children("OrderItem", "ORDER_ID").update_type(update_type);
    if delete_with_parent {
        relation = relation.delete_with_parent();
    }

    EntityBuilder::new("Order", "ORDERS")
        .field(FieldBuilder::new("id", RustType::I64).id())
        .field(FieldBuilder::new("label", RustType::String))
        .field(FieldBuilder::new("items", RustType::EntityList("OrderItem".into())).relation(relation))
}

/// A ticket owning its customer through a foreign-key column.
pub fn ticket() -> EntityBuilder {
    EntityBuilder::new("Ticket", "TICKETS")
        .field(FieldBuilder::new("id", RustType::I64).id())
        .field(FieldBuilder::new("title", RustType::String))
        .field(
            FieldBuilder::new("customer", RustType::Entity("Customer".into()))
                .column("CUSTOMER_ID")
                .relation(RelationDetails::owned("Customer")),
        )
}

pub fn order_item() -> EntityBuilder {
    EntityBuilder::new("OrderItem", "ORDER_ITEMS")
        .field(FieldBuilder::new("id", RustType::I64).id())
        .field(FieldBuilder::new("label", RustType::String))
        .field(FieldBuilder::new("order_id", RustType::I64).column("ORDER_ID"))
}

pub fn context(store: Arc<MockStore>, entities: Vec<EntityBuilder>) -> PersistenceContext {
    let mut builder = PersistenceContext::builder(store);
    for entity in entities {
        builder = builder.entity(entity);
    }
    builder.build().unwrap()
}
