//! CAPABILITY command handler.
//!
//! After the TLS upgrade STARTTLS is no longer offered (RFC 3501
//! Section 6.2.1), so only the base capability is advertised.

use crate::fake_imap::io::write_line;
use tokio::io::{AsyncRead, AsyncWrite, BufReader};

pub async fn handle_capability<S: AsyncRead + AsyncWrite + Unpin>(
    tag: &str,
    stream: &mut BufReader<S>,
) {
    let _ = write_line(stream, "* CAPABILITY IMAP4rev1 AUTH=PLAIN\r\n").await;
    let resp = format!("{tag} OK CAPABILITY completed\r\n");
    let _ = write_line(stream, &resp).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake_imap::io::read_all;

    #[tokio::test]
    async fn advertises_imap4rev1_without_starttls() {
        let (client, server) = tokio::io::duplex(1024);
        let mut stream = BufReader::new(server);
        handle_capability("A1", &mut stream).await;
        drop(stream);

        let output = read_all(client).await;
        assert!(output.contains("* CAPABILITY IMAP4rev1"));
        assert!(!output.contains("STARTTLS"));
        assert!(output.ends_with("A1 OK CAPABILITY completed\r\n"));
    }
}
