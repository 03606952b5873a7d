//! Replay scripts: JSON lines mixing inbound channel frames with user steps.
//!
//! ```text
//! {"event":"message","data":{"type":"greeting","lines":["Hello!"]}}
//! {"user":"send","text":"LHR to JFK"}
//! {"event":"state","data":{"origin":[["LHR",0.92]]}}
//! {"user":"feedback","positive":true}
//! ```
//!
//! Blank lines and lines starting with `#` are ignored.

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use crate::error::{ChatError, Result};
use crate::session::SessionInput;

#[derive(Debug, Deserialize)]
#[serde(tag = "user", rename_all = "snake_case")]
enum UserStep {
    Send { text: String },
    Feedback { positive: bool },
}

/// Classifies one script line. Anything that is not a user step is handed to
/// the session as a raw frame so decoding errors surface there.
pub fn parse_line(line: &str) -> Option<SessionInput> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return None;
    }

    match serde_json::from_str::<UserStep>(trimmed) {
        Ok(UserStep::Send { text }) => Some(SessionInput::Send(text)),
        Ok(UserStep::Feedback { positive }) => Some(SessionInput::Feedback(positive)),
        Err(_) => Some(SessionInput::Frame(trimmed.to_string())),
    }
}

/// Streams the script at `path` (stdin when `None`) into a session input
/// channel, pausing `delay` between steps.
///
/// The file is opened before the reader task starts, so a missing or
/// unreadable script is returned to the caller.
pub async fn spawn_reader(
    path: Option<PathBuf>,
    delay: Duration,
) -> Result<mpsc::UnboundedReceiver<SessionInput>> {
    let (tx, rx) = mpsc::unbounded_channel();

    match path {
        Some(path) => {
            let file = tokio::fs::File::open(&path)
                .await
                .map_err(|source| ChatError::ScriptOpen { path, source })?;
            tokio::spawn(async move {
                if let Err(e) = pump(BufReader::new(file), &tx, delay).await {
                    tracing::error!("Failed to read script: {}", e);
                }
            });
        }
        None => {
            tokio::spawn(async move {
                if let Err(e) = pump(BufReader::new(tokio::io::stdin()), &tx, delay).await {
                    tracing::error!("Failed to read script: {}", e);
                }
            });
        }
    }

    Ok(rx)
}

async fn pump<R: AsyncBufRead + Unpin>(
    reader: R,
    tx: &mpsc::UnboundedSender<SessionInput>,
    delay: Duration,
) -> std::io::Result<()> {
    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await? {
        let Some(input) = parse_line(&line) else {
            continue;
        };
        if tx.send(input).is_err() {
            break;
        }
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
    Ok(())
}
