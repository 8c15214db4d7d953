//! Database module for PostgreSQL persistence.

mod backend;
mod catalog;
mod pool;
mod reservations;
mod rows;

pub use backend::*;
pub use catalog::*;
pub use pool::*;
pub use reservations::*;
pub use rows::*;
