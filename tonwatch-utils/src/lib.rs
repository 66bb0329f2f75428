pub mod address;
pub mod error;
pub mod pars;
pub mod stack_list;
pub mod tlb_text;
pub mod tree;

pub use error::DecodeError;
pub use tree::TreeValue;
