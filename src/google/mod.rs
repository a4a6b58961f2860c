mod classroom;
mod drive;
mod flow;
mod oauth;
mod types;
mod utils;

use reqwest::Client;

pub use classroom::*;
pub use drive::*;
pub use oauth::*;
pub use types::*;

use crate::error::Result;

/// The one HTTP client shared by every Google API call of a run.
pub fn http_client() -> Result<Client> {
    let client = Client::builder()
        .user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ))
        .build()?;

    Ok(client)
}
