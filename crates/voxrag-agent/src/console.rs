//! Local text console for exercising a session without a room.
//!
//! Each input line is one completed utterance. `:audio <path>` submits an
//! audio file instead, which goes through transcription like a spoken turn.

use crate::session::{AgentReply, AgentSession, UserTurn};
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

/// One parsed console line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleInput {
    Utterance(String),
    Audio(PathBuf),
}

/// Parses a console line. `:audio` with no path is treated as text.
pub fn parse_line(line: &str) -> ConsoleInput {
    let line = line.trim_end_matches(['\r', '\n']);
    match line.trim_start().strip_prefix(":audio ") {
        Some(path) if !path.trim().is_empty() => ConsoleInput::Audio(PathBuf::from(path.trim())),
        _ => ConsoleInput::Utterance(line.to_string()),
    }
}

/// Runs `session` against `input` until end of input, writing replies to
/// `output` and reply audio to `speech_dir` when given.
///
/// Turn failures are reported on `output` and the loop continues.
///
/// # Errors
///
/// Returns an I/O error if reading input or writing output fails.
pub async fn run_console<R, W>(
    session: &mut AgentSession,
    input: R,
    mut output: W,
    speech_dir: Option<&Path>,
) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut replies = 0usize;

    match session.start().await {
        Ok(reply) => {
            emit(&mut output, &reply, speech_dir, &mut replies).await?;
        }
        Err(e) => {
            tracing::warn!(error = %e, "greeting failed");
            output.write_all(format!("error: {}\n", e).as_bytes()).await?;
        }
    }

    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        let turn = match parse_line(&line) {
            ConsoleInput::Utterance(text) => UserTurn::Text(text),
            ConsoleInput::Audio(path) => match tokio::fs::read(&path).await {
                Ok(data) => UserTurn::Audio {
                    data,
                    file_name: file_name_of(&path),
                },
                Err(e) => {
                    output
                        .write_all(format!("error: cannot read {}: {}\n", path.display(), e).as_bytes())
                        .await?;
                    continue;
                }
            },
        };

        match session.handle_turn(turn).await {
            Ok(Some(reply)) => emit(&mut output, &reply, speech_dir, &mut replies).await?,
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(error = %e, "turn failed");
                output.write_all(format!("error: {}\n", e).as_bytes()).await?;
            }
        }
    }

    output.flush().await
}

async fn emit<W: AsyncWrite + Unpin>(
    output: &mut W,
    reply: &AgentReply,
    speech_dir: Option<&Path>,
    replies: &mut usize,
) -> std::io::Result<()> {
    *replies += 1;
    if let Some(transcript) = &reply.transcript {
        output.write_all(format!("you: {}\n", transcript).as_bytes()).await?;
    }
    output.write_all(format!("agent: {}\n", reply.text).as_bytes()).await?;

    if let (Some(dir), Some(audio)) = (speech_dir, &reply.audio) {
        let path = dir.join(format!("reply-{:03}.pcm", replies));
        tokio::fs::write(&path, audio).await?;
        tracing::debug!(path = %path.display(), bytes = audio.len(), "wrote reply audio");
    }
    output.flush().await
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "audio.wav".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_audio_command() {
        assert_eq!(
            parse_line(":audio /tmp/clip.wav"),
            ConsoleInput::Audio(PathBuf::from("/tmp/clip.wav"))
        );
    }

    #[test]
    fn plain_lines_and_bare_command_are_utterances() {
        assert_eq!(
            parse_line("what is my plan?\r\n"),
            ConsoleInput::Utterance("what is my plan?".to_string())
        );
        assert_eq!(
            parse_line(":audio "),
            ConsoleInput::Utterance(":audio ".to_string())
        );
    }

    #[test]
    fn file_name_falls_back_for_bare_paths() {
        assert_eq!(file_name_of(Path::new("/tmp/clip.mp3")), "clip.mp3");
        assert_eq!(file_name_of(Path::new("/")), "audio.wav");
    }
}
