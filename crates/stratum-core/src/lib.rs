pub mod conversion;
pub use conversion::ConversionService;

pub mod driver;
pub use driver::DataStore;

mod error;
pub use error::Error;

pub mod schema;
pub use schema::EntityDetails;

pub mod stmt;

/// A Result type alias that uses stratum's [`Error`] type.
pub type Result<T> = core::result::Result<T, Error>;
