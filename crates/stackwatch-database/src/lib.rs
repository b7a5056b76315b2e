//! Database connection bootstrap and test utilities

pub use sea_orm;

mod connection;

pub use connection::{establish_connection, DbConnection};

// Test utilities are exported for use by the vertical crates in their tests
pub mod test_utils;
