pub mod config;
pub mod error;
pub mod game;
pub mod id_generator;
pub mod identifiers;
pub mod logger;
pub mod service;

pub use error::{GameError, Result};
pub use identifiers::*;
