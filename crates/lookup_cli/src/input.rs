//! Terminal input
//!
//! Every stdin line replaces the typed text. Lines starting with `:` are
//! commands:
//!
//! | Line          | Input                        |
//! |---------------|------------------------------|
//! | `:open`       | open the options panel       |
//! | `:close`      | close the options panel      |
//! | `:select <id>`| select the listed candidate  |
//! | `:clear`      | clear the selection          |
//! | `:quit`       | tear down and exit           |
//!
//! `::text` types a literal `:text`.

use lookup_client::LookupInput;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::UnboundedSender;

/// A line that looks like a command but is not one
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown command ':{0}'")]
pub struct UnknownCommand(pub String);

/// Translate one input line
pub fn parse_line(line: &str) -> Result<LookupInput, UnknownCommand> {
    let line = line.trim_end_matches(['\r', '\n']);

    let Some(command) = line.strip_prefix(':') else {
        return Ok(LookupInput::Query(line.to_string()));
    };
    if command.starts_with(':') {
        return Ok(LookupInput::Query(command.to_string()));
    }

    let mut parts = command.split_whitespace();
    let input = match (parts.next(), parts.next(), parts.next()) {
        (Some("open"), None, _) => LookupInput::Open,
        (Some("close"), None, _) => LookupInput::Close,
        (Some("clear"), None, _) => LookupInput::Select(None),
        (Some("quit" | "q"), None, _) => LookupInput::Teardown,
        (Some("select"), Some(id), None) => match id.parse() {
            Ok(id) => LookupInput::SelectId(id),
            Err(_) => return Err(UnknownCommand(command.to_string())),
        },
        _ => return Err(UnknownCommand(command.to_string())),
    };
    Ok(input)
}

/// Forward stdin lines to the session until EOF or `:quit`
pub async fn forward_stdin(tx: UnboundedSender<LookupInput>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                tracing::warn!("failed to read stdin: {}", e);
                break;
            }
        };

        match parse_line(&line) {
            Ok(input) => {
                let quit = input == LookupInput::Teardown;
                if tx.send(input).is_err() || quit {
                    break;
                }
            }
            Err(e) => tracing::warn!("{}", e),
        }
    }
}
