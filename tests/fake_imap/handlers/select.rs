//! SELECT command handler.
//!
//! Opens a folder and responds with the metadata RFC 3501 Section
//! 6.3.1 requires: FLAGS, EXISTS, RECENT, UIDVALIDITY and UIDNEXT, plus
//! `[UNSEEN n]` naming the first unseen message when there is one.
//!
//! Returns the selected folder name (or `None` if not found).

use crate::fake_imap::io::write_line;
use crate::fake_imap::mailbox::Mailbox;
use tokio::io::{AsyncRead, AsyncWrite, BufReader};

pub async fn handle_select<S: AsyncRead + AsyncWrite + Unpin>(
    tag: &str,
    folder_name: &str,
    mailbox: &Mailbox,
    stream: &mut BufReader<S>,
) -> Option<String> {
    let Some(folder) = mailbox.get_folder(folder_name) else {
        let resp = format!("{tag} NO [NONEXISTENT] Folder not found\r\n");
        let _ = write_line(stream, &resp).await;
        return None;
    };

    let uidnext = folder
        .emails
        .iter()
        .map(|e| e.uid)
        .max()
        .map_or(1, |max| max + 1);

    let mut lines = vec![
        "* FLAGS (\\Seen \\Answered \\Flagged \\Deleted \\Draft)\r\n".to_string(),
        format!("* {} EXISTS\r\n", folder.emails.len()),
        "* 0 RECENT\r\n".to_string(),
        "* OK [UIDVALIDITY 1]\r\n".to_string(),
        format!("* OK [UIDNEXT {uidnext}]\r\n"),
    ];
    if let Some(pos) = folder.emails.iter().position(|e| !e.seen) {
        lines.push(format!("* OK [UNSEEN {}]\r\n", pos + 1));
    }
    lines.push(format!("{tag} OK [READ-WRITE] SELECT completed\r\n"));

    for line in &lines {
        let _ = write_line(stream, line).await;
    }
    Some(folder_name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake_imap::io::read_all;
    use crate::fake_imap::mailbox::MailboxBuilder;

    async fn run(folder_name: &str, mailbox: &Mailbox) -> (String, Option<String>) {
        let (client, server) = tokio::io::duplex(4096);
        let mut stream = BufReader::new(server);

        let selected = handle_select("A1", folder_name, mailbox, &mut stream).await;
        drop(stream);
        (read_all(client).await, selected)
    }

    #[tokio::test]
    async fn selects_existing_folder() {
        let mailbox = MailboxBuilder::new()
            .folder("INBOX")
            .email(1, true)
            .email(2, false)
            .build();

        let (output, selected) = run("INBOX", &mailbox).await;

        assert_eq!(selected.as_deref(), Some("INBOX"));
        assert!(output.contains("* 2 EXISTS"));
        assert!(output.contains("* OK [UNSEEN 2]"));
        assert!(output.contains("* OK [UIDNEXT 3]"));
        assert!(output.ends_with("A1 OK [READ-WRITE] SELECT completed\r\n"));
    }

    #[tokio::test]
    async fn missing_folder_is_no() {
        let mailbox = MailboxBuilder::new().folder("INBOX").build();

        let (output, selected) = run("Archive", &mailbox).await;

        assert!(selected.is_none());
        assert!(output.starts_with("A1 NO"));
    }

    #[tokio::test]
    async fn no_unseen_code_when_all_read() {
        let mailbox = MailboxBuilder::new().folder("INBOX").email(1, true).build();
        let (output, _) = run("INBOX", &mailbox).await;
        assert!(!output.contains("UNSEEN"));
    }
}
