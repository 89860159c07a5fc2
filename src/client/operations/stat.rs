use crate::client::operations::{ResponseDecoder, unexpected};
use crate::client::transport::Message;

const NO_RESPONSE: &str = "no response received";

/// Decoder for ISDIR.
#[derive(Debug, Default)]
pub struct IsDirectoryDecoder {
    value: Option<bool>,
}

impl ResponseDecoder for IsDirectoryDecoder {
    type Output = bool;

    fn decode(&mut self, message: Message) -> Result<Option<bool>, String> {
        match message {
            Message::IsDirectory(value) => {
                self.value = Some(value);
                Ok(None)
            }
            other => Err(unexpected(&other)),
        }
    }

    fn finish(&mut self) -> Result<bool, String> {
        self.value.ok_or_else(|| NO_RESPONSE.to_string())
    }
}

/// Decoder for SIZE.
#[derive(Debug, Default)]
pub struct SizeDecoder {
    value: Option<u64>,
}

impl ResponseDecoder for SizeDecoder {
    type Output = u64;

    fn decode(&mut self, message: Message) -> Result<Option<u64>, String> {
        match message {
            Message::Size(value) => {
                self.value = Some(value);
                Ok(None)
            }
            other => Err(unexpected(&other)),
        }
    }

    fn finish(&mut self) -> Result<u64, String> {
        self.value.ok_or_else(|| NO_RESPONSE.to_string())
    }
}
