//! Shared I/O helpers for the fake IMAP server.
//!
//! Every write is flushed immediately so the client sees each response
//! line as soon as the handler produces it.

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};

/// Write a string to the stream and flush.
pub async fn write_line<S: AsyncRead + AsyncWrite + Unpin>(
    stream: &mut BufReader<S>,
    line: &str,
) -> std::io::Result<()> {
    stream.get_mut().write_all(line.as_bytes()).await?;
    stream.get_mut().flush().await
}

/// Drain everything a handler wrote to the client half of a duplex
/// pipe. Used by the handler unit tests.
#[cfg(test)]
pub async fn read_all<S: AsyncRead + Unpin>(client: S) -> String {
    let mut buf = Vec::new();
    tokio::io::AsyncReadExt::read_to_end(&mut BufReader::new(client), &mut buf)
        .await
        .unwrap();
    String::from_utf8(buf).unwrap()
}
