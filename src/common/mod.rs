//! Utilities shared by the services layer.

pub mod db_errors;
pub mod transaction;
