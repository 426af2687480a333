//! Collaborators for the ClauseLens backend: the HTTP API client and an
//! offline demo service with canned responses.

pub mod demo;
pub mod http;
mod upload;

pub use demo::DemoService;
pub use http::{ApiClient, ClientError};
pub use upload::{DEFAULT_MAX_FILE_SIZE, load_upload};
