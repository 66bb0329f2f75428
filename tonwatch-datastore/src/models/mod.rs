pub mod complaint;
pub mod election;
pub mod validation_cycle;

pub use complaint::Complaint;
pub use election::Election;
pub use validation_cycle::ValidationCycle;
