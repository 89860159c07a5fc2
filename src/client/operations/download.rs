use crate::client::operations::{ResponseDecoder, unexpected};
use crate::client::transport::{ByteStream, Message};

/// Decoder for GET.
///
/// The operation resolves as soon as the content stream arrives so the
/// caller can drain it while the transfer is still running; the stream ends
/// when the transfer does.
#[derive(Debug, Default)]
pub struct ContentDecoder {
    delivered: bool,
}

impl ResponseDecoder for ContentDecoder {
    type Output = ByteStream;

    fn decode(&mut self, message: Message) -> Result<Option<ByteStream>, String> {
        match message {
            Message::Content(stream) if !self.delivered => {
                self.delivered = true;
                Ok(Some(stream))
            }
            Message::Content(_) => Ok(None),
            other => Err(unexpected(&other)),
        }
    }

    fn finish(&mut self) -> Result<ByteStream, String> {
        if self.delivered {
            Err("content already delivered".to_string())
        } else {
            // Nothing was sent, so the file is empty.
            Ok(ByteStream::new(futures::stream::empty()))
        }
    }
}
