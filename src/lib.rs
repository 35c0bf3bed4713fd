pub mod communication;
pub mod config;
pub mod controller;
pub mod error;
pub mod greeter;
pub mod greeting;
pub mod logging;

pub use error::{GreeterError, Result};
