//! Database module for jukegate
//!
//! This module handles all database operations using SQLx with SQLite.

mod engine;
pub mod tables;

pub use engine::DbEngine;
pub use tables::*;
