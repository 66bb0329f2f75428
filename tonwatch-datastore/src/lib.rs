mod error;
mod model;
mod models;
pub mod queries;
mod validation_datastore;

pub use error::Error;
pub use model::Model;
pub use models::{Complaint, Election, ValidationCycle};
pub use validation_datastore::ValidationDatastore;

pub type Result<T> = std::result::Result<T, Error>;
