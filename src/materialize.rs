use std::{io, path::Path};

use async_stream::try_stream;
use futures::Stream;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::{
    error::{Error, Result},
    local,
    types::Progress,
};

pub const CHUNK_SIZE: usize = 1024 * 1024;

/// Copies `reader` to `dst` one chunk at a time, yielding the progress after
/// each chunk.
///
/// Data goes to a hidden staging file in the same directory that is moved
/// onto `dst` once the source is exhausted, so `dst` only ever exists
/// complete. If the copy fails, or the stream is dropped early, the staging
/// file is removed.
pub fn materialize<'a, R>(
    mut reader: R,
    total: Option<u64>,
    dst: &'a Path,
) -> impl Stream<Item = Result<Progress>> + 'a
where
    R: AsyncRead + Unpin + 'a,
{
    try_stream! {
        let (mut writer, staged) = local::staging_file(dst)?;
        let part = staged.to_path_buf();
        let mut buf = vec![0u8; CHUNK_SIZE];
        let mut progress = Progress { total, done: 0 };

        loop {
            let n = copy_chunk(&mut reader, &mut writer, &mut buf, &part).await?;
            if n == 0 {
                break;
            }

            progress.done += n as u64;
            yield progress;
        }

        writer.flush().await.map_err(|e| Error::io(&part, e))?;
        drop(writer);

        local::persist(staged, dst)?;
    }
}

/// Fills `buf` from `reader` (short only at the end of the source) and writes
/// it out. Returns the number of bytes copied; 0 means done.
async fn copy_chunk<R, W>(reader: &mut R, writer: &mut W, buf: &mut [u8], part: &Path) -> Result<usize>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut filled = 0;
    while filled < buf.len() {
        let n = reader
            .read(&mut buf[filled..])
            .await
            .map_err(read_error)?;
        if n == 0 {
            break;
        }
        filled += n;
    }

    writer
        .write_all(&buf[..filled])
        .await
        .map_err(|e| Error::io(part, e))?;

    Ok(filled)
}

/// Read errors on a response body are transport failures in disguise.
fn read_error(e: io::Error) -> Error {
    let kind = e.kind();
    match e.into_inner().map(|inner| inner.downcast::<reqwest::Error>()) {
        Some(Ok(re)) => Error::Network(*re),
        Some(Err(inner)) => Error::io("<download>", io::Error::new(kind, inner)),
        None => Error::io("<download>", io::Error::from(kind)),
    }
}
