pub mod catalog;
pub mod kind;

pub use catalog::*;
pub use kind::*;
