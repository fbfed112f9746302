pub mod mock_store;
pub use mock_store::{Issued, MockStore};

pub mod setup;
