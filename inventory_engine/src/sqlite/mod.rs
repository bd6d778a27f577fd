//! SQLite backend for the inventory engine.
mod sqlite_impl;

pub mod db;
pub use sqlite_impl::SqliteDatabase;
