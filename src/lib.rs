//! Uniform asynchronous file operations over FTP, FTPS and SFTP.
//!
//! ```no_run
//! use remotefs::client::{InputContent, RemoteFsClient};
//! use remotefs::config::ClientConfig;
//!
//! # async fn run() -> remotefs::error::Result<()> {
//! let config = ClientConfig::new("sftp", "files.example.com")
//!     .with_port(22)
//!     .with_basic_auth("deploy", "secret");
//! let client = RemoteFsClient::new(&config)?;
//!
//! client.put("/upload/hello.txt", InputContent::text("hi")).await?;
//! let content = client.get("/upload/hello.txt").await?.read_to_end().await?;
//! assert_eq!(content, b"hi");
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;

pub use client::{CompletionSlot, Endpoint, RemoteFsClient};
pub use config::ClientConfig;
pub use error::{Error, ErrorKind, Result};
