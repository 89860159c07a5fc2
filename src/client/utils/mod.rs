// Utilities for the client module
pub mod error;
pub mod path;
pub mod url;
