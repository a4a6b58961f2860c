mod api;
mod config;
mod error;
mod local;
mod materialize;
mod utils;

pub mod google;
pub mod resolve;
pub mod select;
pub mod types;
pub mod users;

#[cfg(test)]
mod test_helpers;

pub use api::*;
pub use config::Config;
pub use error::{Error, ErrorKind, Result};
