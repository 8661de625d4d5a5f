//! Repository layer over the bookstore entities.
//!
//! Every function takes a SeaORM connection (or transaction) and returns
//! [`Result`]. Operations that touch several tables, such as placing an order
//! or awarding loyalty points, open their own transaction and require a
//! [`sea_orm::DatabaseConnection`].

pub mod activity;
pub mod books;
pub mod categories;
pub mod error;
pub mod orders;
pub mod points;
pub mod pricing;
pub mod stats;
pub mod users;
pub mod wilayas;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{Result, StorageError};
