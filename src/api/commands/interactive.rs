//! Line-based session: every plain line is translated, `:` lines are
//! session commands.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::core::catalog;
use crate::core::session::{Outcome, Session};
use crate::shared::error::AppResult;

const HELP: &str = "\
:from <code>   set source language (auto to detect)
:to <code>     set target language
:swap          swap languages and texts
:clear         clear input and output
:history       show recent translations
:reuse <n>     load history entry n back into the editor
:state         show current languages
:quit          leave";

enum Step {
    Continue,
    Quit,
}

pub async fn run<R, W>(session: &Session, input: R, output: &mut W) -> AppResult<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    if let Err(e) = session.refresh_history() {
        tracing::warn!("Failed to load history: {}", e);
    }
    write_state(session, output).await?;

    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let step = match line.strip_prefix(':') {
            Some(command) => handle_command(session, command, output).await?,
            None => {
                translate_line(session, line, output).await?;
                Step::Continue
            }
        };

        if let Step::Quit = step {
            break;
        }
    }

    output.flush().await?;
    Ok(())
}

async fn translate_line<W>(session: &Session, line: &str, output: &mut W) -> AppResult<()>
where
    W: AsyncWrite + Unpin,
{
    session.set_source_text(line);
    let message = match session.translate().await {
        Outcome::Applied(result) => {
            let detected = result
                .detected_language
                .as_deref()
                .map(|code| format!(" (detected {})", catalog::name_for(code)))
                .unwrap_or_default();
            format!("{}\n  [{}]{}\n", result.translated_text, result.source, detected)
        }
        Outcome::Superseded(_) => String::new(),
        Outcome::Failed(error) => format!("error: {}\n", error),
    };
    output.write_all(message.as_bytes()).await?;
    Ok(())
}

async fn handle_command<W>(session: &Session, command: &str, output: &mut W) -> AppResult<Step>
where
    W: AsyncWrite + Unpin,
{
    let (name, arg) = match command.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (command, ""),
    };

    match name {
        "q" | "quit" | "exit" => return Ok(Step::Quit),
        "from" if !arg.is_empty() => {
            session.set_source_lang(arg);
            write_state(session, output).await?;
        }
        "to" if !arg.is_empty() => {
            session.set_target_lang(arg);
            write_state(session, output).await?;
        }
        "swap" => {
            if session.swap_languages() {
                write_state(session, output).await?;
            } else {
                output.write_all(b"cannot swap while detecting the source language\n").await?;
            }
        }
        "clear" => {
            session.clear();
            output.write_all(b"cleared\n").await?;
        }
        "history" => {
            let state = session.snapshot();
            let now = chrono::Utc::now();
            let mut listing = String::new();
            for (i, entry) in state.history.iter().enumerate() {
                listing.push_str(&format!(
                    "{:>3}. [{} -> {}] {} => {} ({})\n",
                    i + 1,
                    entry.from_lang,
                    entry.to_lang,
                    entry.source_text,
                    entry.translated_text,
                    entry.relative_age(now)
                ));
            }
            if listing.is_empty() {
                listing.push_str("no history yet\n");
            }
            output.write_all(listing.as_bytes()).await?;
        }
        "reuse" => {
            let state = session.snapshot();
            let entry = arg
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .and_then(|i| state.history.get(i));
            match entry {
                Some(entry) => {
                    session.reuse_history(entry);
                    write_state(session, output).await?;
                }
                None => output.write_all(b"no such history entry\n").await?,
            }
        }
        "state" => write_state(session, output).await?,
        _ => {
            output.write_all(HELP.as_bytes()).await?;
            output.write_all(b"\n").await?;
        }
    }
    Ok(Step::Continue)
}

async fn write_state<W>(session: &Session, output: &mut W) -> AppResult<()>
where
    W: AsyncWrite + Unpin,
{
    let state = session.snapshot();
    let line = format!(
        "{} -> {}\n",
        catalog::name_for(&state.source_lang),
        catalog::name_for(&state.target_lang)
    );
    output.write_all(line.as_bytes()).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::commands::test_support::offline_context;
    use crate::shared::settings::UserPreferences;

    async fn drive(script: &str) -> String {
        let ctx = offline_context();
        let session = Session::new(ctx.translator.clone(), &UserPreferences::default(), 50);
        let mut output = Vec::new();
        run(&session, script.as_bytes(), &mut output).await.unwrap();
        String::from_utf8(output).unwrap()
    }

    #[tokio::test]
    async fn translates_lines_and_runs_commands() {
        let out = drive(":from en\nGood night\n:swap\n:history\n:quit\nignored\n").await;

        assert!(out.starts_with("Auto Detect -> Spanish\n"));
        assert!(out.contains("English -> Spanish\n"));
        assert!(out.contains("Buenas noches\n  [Offline Dictionary]\n"));
        assert!(out.contains("Spanish -> English\n"));
        assert!(out.contains("  1. [en -> es] Good night => Buenas noches (Just now)\n"));
        assert!(!out.contains("ignored"));
    }

    #[tokio::test]
    async fn reports_errors_and_refused_swap() {
        let out = drive(":swap\n:to auto\nhello\n:bogus\n").await;

        assert!(out.contains("cannot swap while detecting the source language\n"));
        assert!(out.contains("error: Validation Error: Unsupported target language: auto\n"));
        assert!(out.contains(":reuse <n>"));
    }
}
