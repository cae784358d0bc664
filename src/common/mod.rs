//! Common, shared types.

pub mod bounds;
pub mod error;
pub mod lanes;
pub mod pool;
pub mod state;
pub mod tunables;

#[cfg(test)]
pub mod test_utils;
