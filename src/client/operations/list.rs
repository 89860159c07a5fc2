use crate::client::operations::{ResponseDecoder, unexpected};
use crate::client::transport::Message;
use crate::client::utils::path::absolute_path;

/// Stat record for one remote entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileInfo {
    pub path: String,
    /// Size in bytes.
    pub size: u64,
    /// Milliseconds since the Unix epoch; 0 when the server did not say.
    pub last_modified: i64,
    pub is_directory: bool,
}

impl FileInfo {
    pub(crate) fn from_entry(entry: &opendal::Entry) -> Self {
        let meta = entry.metadata();
        Self {
            path: absolute_path(entry.path()),
            size: meta.content_length(),
            last_modified: meta
                .last_modified()
                .map(|t| t.timestamp_millis())
                .unwrap_or_default(),
            is_directory: meta.mode().is_dir(),
        }
    }
}

/// Decoder for LIST: flattens every `Entries` message, keeping transport order.
#[derive(Debug, Default)]
pub struct ListDecoder {
    entries: Vec<FileInfo>,
}

impl ResponseDecoder for ListDecoder {
    type Output = Vec<FileInfo>;

    fn decode(&mut self, message: Message) -> Result<Option<Vec<FileInfo>>, String> {
        match message {
            Message::Entries(entries) => {
                self.entries.extend(entries);
                Ok(None)
            }
            other => Err(unexpected(&other)),
        }
    }

    fn finish(&mut self) -> Result<Vec<FileInfo>, String> {
        Ok(std::mem::take(&mut self.entries))
    }
}
