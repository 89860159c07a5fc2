// Action implementations on top of an OpenDAL operator
use futures::stream::TryStreamExt;
use log::debug;
use opendal::{ErrorKind, Operator};
use snafu::ensure;
use tokio::io::AsyncReadExt;

use super::{Action, ByteStream, Listener, Message, Payload};
use crate::client::constants::{DEFAULT_BUFFER_SIZE, DEFAULT_CHUNK_SIZE};
use crate::client::operations::FileInfo;
use crate::client::utils::path::{
    absolute_path, ensure_trailing_slash, is_same_dir, operator_path, parent_dir,
};
use crate::error::{Error, Result, TransportSnafu};

/// Perform `action` on `path` (absolute, decoded), reporting responses to `listener`.
pub(super) async fn execute(
    operator: &Operator,
    action: Action,
    path: &str,
    destination: Option<&str>,
    payload: Option<Payload>,
    listener: &dyn Listener,
) -> Result<()> {
    let path = operator_path(path);
    match action {
        Action::Get => read(operator, &path, listener).await,
        Action::Put | Action::Append => {
            let payload = payload.ok_or_else(|| Error::transport(action, "no content to upload"))?;
            write(operator, &path, payload, action == Action::Append).await
        }
        Action::Delete => delete(operator, &path).await,
        Action::IsDir => {
            let is_dir = is_directory(operator, &path).await?;
            listener.on_message(Message::IsDirectory(is_dir));
            Ok(())
        }
        Action::List => list(operator, &path, listener).await,
        Action::Mkdir => mkdir(operator, &path).await,
        Action::Rmdir => rmdir(operator, &path).await,
        Action::Rename => {
            let destination = destination
                .map(operator_path)
                .ok_or_else(|| Error::transport(action, "missing 'destination' property"))?;
            rename(operator, &path, &destination).await
        }
        Action::Size => {
            let meta = operator.stat(&path).await?;
            listener.on_message(Message::Size(meta.content_length()));
            Ok(())
        }
    }
}

/// Stat first: readers are lazy, so a missing file would otherwise only fail
/// once the caller starts consuming the stream.
async fn read(operator: &Operator, path: &str, listener: &dyn Listener) -> Result<()> {
    operator.stat(path).await?;
    let reader = operator.reader(path).await?;
    let stream = reader.into_bytes_stream(..).await?;
    listener.on_message(Message::Content(ByteStream::new(stream)));
    Ok(())
}

/// Stream the payload into the remote file in buffer-sized chunks.
async fn write(operator: &Operator, path: &str, mut payload: Payload, append: bool) -> Result<()> {
    let mut writer = operator.writer_with(path).append(append).await?;
    let mut buffer = vec![0u8; DEFAULT_BUFFER_SIZE];
    let mut total_bytes = 0u64;

    loop {
        let bytes_read = payload.read(&mut buffer).await?;
        if bytes_read == 0 {
            break;
        }
        writer.write(buffer[..bytes_read].to_vec()).await?;
        total_bytes += bytes_read as u64;
    }
    writer.close().await?;
    debug!("wrote {total_bytes} bytes to {path} append={append}");
    Ok(())
}

async fn delete(operator: &Operator, path: &str) -> Result<()> {
    // Deleting a missing file is not an error for the operator; the server would refuse it.
    operator.stat(path).await?;
    operator.delete(path).await?;
    Ok(())
}

/// Stat first; when the plain path is unknown, retry it as a directory.
async fn is_directory(operator: &Operator, path: &str) -> Result<bool> {
    match operator.stat(path).await {
        Ok(meta) => return Ok(meta.mode().is_dir()),
        Err(e) if e.kind() == ErrorKind::NotFound && !path.ends_with('/') => {}
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(e.into()),
    }

    match operator.stat(&ensure_trailing_slash(path)).await {
        Ok(meta) => Ok(meta.mode().is_dir()),
        Err(e) if matches!(e.kind(), ErrorKind::NotFound | ErrorKind::NotADirectory) => Ok(false),
        Err(e) => Err(e.into()),
    }
}

async fn list(operator: &Operator, path: &str, listener: &dyn Listener) -> Result<()> {
    let dir = ensure_trailing_slash(path);
    let mut lister = operator.lister(&dir).await?;
    while let Some(entry) = lister.try_next().await? {
        if is_same_dir(entry.path(), &dir) {
            continue;
        }
        listener.on_message(Message::Entries(vec![FileInfo::from_entry(&entry)]));
    }
    Ok(())
}

/// Create one directory; the parent has to exist already.
async fn mkdir(operator: &Operator, path: &str) -> Result<()> {
    let dir = ensure_trailing_slash(path);
    if let Some(parent) = parent_dir(&dir) {
        match operator.stat(&parent).await {
            Ok(_) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return TransportSnafu {
                    action: Action::Mkdir,
                    message: format!(
                        "parent directory '{}' does not exist",
                        absolute_path(&parent)
                    ),
                }
                .fail();
            }
            Err(e) => return Err(e.into()),
        }
    }
    operator.create_dir(&dir).await?;
    Ok(())
}

/// Remove a directory only when it has no entries.
async fn rmdir(operator: &Operator, path: &str) -> Result<()> {
    let dir = ensure_trailing_slash(path);
    let meta = operator.stat(&dir).await?;
    ensure!(
        meta.mode().is_dir(),
        TransportSnafu {
            action: Action::Rmdir,
            message: format!("'{}' is not a directory", absolute_path(&dir)),
        }
    );

    let entries = operator.list_with(&dir).limit(2).await?;
    ensure!(
        entries.iter().all(|entry| is_same_dir(entry.path(), &dir)),
        TransportSnafu {
            action: Action::Rmdir,
            message: format!("directory '{}' is not empty", absolute_path(&dir)),
        }
    );

    operator.delete(&dir).await?;
    Ok(())
}

async fn rename(operator: &Operator, src_path: &str, dest_path: &str) -> Result<()> {
    if operator.info().full_capability().rename {
        operator.rename(src_path, dest_path).await?;
    } else {
        stream_move(operator, src_path, dest_path).await?;
        operator.delete(src_path).await?;
    }
    Ok(())
}

/// Copy a file chunk by chunk for services without a native rename.
async fn stream_move(operator: &Operator, src_path: &str, dest_path: &str) -> Result<()> {
    let file_size = operator.stat(src_path).await?.content_length();
    let mut writer = operator.writer(dest_path).await?;
    let mut offset = 0u64;

    while offset < file_size {
        let chunk_size = std::cmp::min(DEFAULT_CHUNK_SIZE as u64, file_size - offset);
        let data = operator
            .read_with(src_path)
            .range(offset..offset + chunk_size)
            .await?;
        let data_len = data.len();
        if data_len == 0 {
            break;
        }
        writer.write(data).await?;
        offset += data_len as u64;
    }

    writer.close().await?;
    debug!("moved {src_path} -> {dest_path} ({offset} bytes)");
    Ok(())
}
