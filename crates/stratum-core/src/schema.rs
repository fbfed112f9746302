mod builder;
pub use builder::{EntityBuilder, FieldBuilder};

mod data_type;
pub use data_type::{DataType, RustType};

mod entity;
pub use entity::EntityDetails;

mod extension;
pub use extension::ExtendedTableDetails;

mod field;
pub use field::{FieldDetails, RelationDetails, RelationUpdateType};

mod monitor;
pub use monitor::EntityDetailsMonitor;

mod registry;
pub use registry::EntityRegistry;

mod unique;
pub use unique::UniqueConstraintDetails;
