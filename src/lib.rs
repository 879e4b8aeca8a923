pub mod cache;
pub mod config;
pub mod dom;
pub mod error;
pub mod fetch;
pub mod gateway;
pub mod records;
pub mod scanner;
pub mod tooltip;
pub mod utils;

pub use error::{AppError, Result};
