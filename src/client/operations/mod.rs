// Per-action response decoding and upload input
pub mod download;
pub mod list;
pub mod stat;
pub mod upload;

pub use download::ContentDecoder;
pub use list::{FileInfo, ListDecoder};
pub use stat::{IsDirectoryDecoder, SizeDecoder};
pub use upload::{ByteChannel, InputContent};

use crate::client::transport::Message;

/// Turns the messages of one transport round-trip into a typed result.
pub trait ResponseDecoder: Send + 'static {
    type Output: Send + 'static;

    /// Consume one message. `Ok(Some(..))` resolves the operation right away;
    /// `Err` fails it with the given transport message.
    fn decode(&mut self, message: Message) -> Result<Option<Self::Output>, String>;

    /// Produce the result once the transport reports completion.
    fn finish(&mut self) -> Result<Self::Output, String>;
}

/// Decoder for verbs whose only result is success: PUT, APPEND, DELETE,
/// MKDIR, RMDIR and RENAME.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnitDecoder;

impl ResponseDecoder for UnitDecoder {
    type Output = ();

    fn decode(&mut self, _message: Message) -> Result<Option<()>, String> {
        Ok(None)
    }

    fn finish(&mut self) -> Result<(), String> {
        Ok(())
    }
}

/// Message for a response variant the action never produces.
pub(crate) fn unexpected(message: &Message) -> String {
    format!("unexpected transport response: {message:?}")
}
