#![warn(clippy::all)]

pub mod api;
pub mod config;
pub mod database;
pub mod error;
pub mod logging;

pub use error::{RecipeError, Result};
