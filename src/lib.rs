pub mod config;
pub mod dataset;
pub mod error;
pub mod logging;
pub mod model;
pub mod server;
pub mod smoke;
pub mod training;

pub use error::{Error, Result};
