//! Wire and domain types shared by the todo client crates.

pub mod domain;
pub mod error;
pub mod protocol;
