pub mod accounts;
pub mod config;
pub mod db;
pub mod entities;
pub mod error;
pub mod services;
pub mod store;
pub mod tutor;
pub mod validation;

pub use error::{Error, Result};
pub use tutor::Tutor;
