// Application layer - use cases shared by the CLI and the HTTP API.
// Validation happens here, before anything reaches the repository.

pub mod error;
pub mod service;

pub use error::*;
pub use service::*;
