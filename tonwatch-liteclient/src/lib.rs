mod client;
pub mod complaints;
pub mod elections;
mod error;
pub mod validators;

pub use client::{Config17, LiteClient};
pub use error::LiteClientError;
