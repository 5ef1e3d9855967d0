use derive_more::{Display, From};

pub mod api;
pub mod server;
pub mod util;

#[derive(Debug, Display, From)]
pub enum WebError {
    Io(std::io::Error),
    Regex(regex::Error),
    Serialization(serde_json::Error),
    #[from(ignore)]
    InvalidHeader(String),
}

impl std::error::Error for WebError {}

pub type Result<T> = std::result::Result<T, WebError>;
