// Chat turn pipeline, shared by the web UI and the interactive terminal chat.

use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::catalog::{self, Model, SUGGESTIONS};
use crate::error::InferenceError;
use crate::inference::InferenceClient;
use crate::prompt::build_prompt;
use crate::session::{Message, Session};

/// A turn whose user message is in the transcript and whose reply is still
/// pending.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingTurn {
    pub prompt: String,
    pub model: Model,
    /// Session epoch when the turn started.
    pub epoch: u64,
}

/// Appends the user's message and builds the prompt for the model.
pub fn begin_turn(session: &mut Session, input: &str) -> PendingTurn {
    session.append(Message::user(input));
    PendingTurn {
        prompt: build_prompt(session.mood, input),
        model: session.model,
        epoch: session.epoch(),
    }
}

/// Appends the reply, unless the session was cleared while the model was
/// running. Returns whether the reply was kept.
pub fn complete_turn(session: &mut Session, turn: &PendingTurn, reply: String) -> bool {
    if session.epoch() != turn.epoch {
        debug!(
            started = turn.epoch,
            current = session.epoch(),
            "Dropping reply for a cleared conversation"
        );
        return false;
    }
    session.append(Message::assistant(reply));
    true
}

/// Runs a full turn against a session owned by the caller. On failure the
/// user message stays in the transcript and no reply is added.
pub async fn run_turn(
    client: &InferenceClient,
    session: &mut Session,
    input: &str,
) -> Result<String, InferenceError> {
    let turn = begin_turn(session, input);
    let reply = client.generate(&turn.prompt, turn.model).await?;
    complete_turn(session, &turn, reply.clone());
    Ok(reply)
}

enum Command<'a> {
    Quit,
    Clear,
    ListSuggestions,
    Suggest(&'a str),
    UnknownSuggestion,
    Say(&'a str),
    Skip,
}

fn parse_command(line: &str) -> Command<'_> {
    let line = line.trim();
    match line {
        "" => Command::Skip,
        "/quit" | "/exit" => Command::Quit,
        "/clear" => Command::Clear,
        "/suggestions" => Command::ListSuggestions,
        _ => match line.strip_prefix("/suggest ") {
            Some(n) => match n.trim().parse::<usize>().ok().and_then(|n| n.checked_sub(1)) {
                Some(index) => catalog::suggestion(index)
                    .map_or(Command::UnknownSuggestion, Command::Suggest),
                None => Command::UnknownSuggestion,
            },
            None => Command::Say(line),
        },
    }
}

fn write_suggestions<W: Write>(out: &mut W) -> Result<()> {
    for (i, suggestion) in SUGGESTIONS.iter().enumerate() {
        writeln!(out, "  {}. {}", i + 1, suggestion)?;
    }
    Ok(())
}

/// Interactive chat over arbitrary line input. Inference failures are
/// reported and the loop carries on.
pub async fn run_terminal_chat<R: BufRead, W: Write>(
    client: &InferenceClient,
    session: &mut Session,
    input: R,
    out: &mut W,
) -> Result<()> {
    info!(model = session.model.repo_id(), mood = session.mood.key(), "Starting terminal chat");

    writeln!(out, "🧘 MindMate – Mental Wellness Assistant")?;
    writeln!(out, "🌞 {}", catalog::random_affirmation(&mut rand::thread_rng()))?;
    writeln!(
        out,
        "Model: {} | Mood: {}. Type /suggestions, /suggest N, /clear or /quit.",
        session.model.label(),
        session.mood.label()
    )?;

    for line in input.lines() {
        let line = line.context("Failed to read chat input")?;
        let text = match parse_command(&line) {
            Command::Quit => break,
            Command::Skip => continue,
            Command::Clear => {
                session.clear();
                writeln!(out, "Conversation cleared.")?;
                continue;
            }
            Command::ListSuggestions => {
                write_suggestions(out)?;
                continue;
            }
            Command::UnknownSuggestion => {
                writeln!(out, "Pick a suggestion between 1 and {}:", SUGGESTIONS.len())?;
                write_suggestions(out)?;
                continue;
            }
            Command::Suggest(text) => {
                writeln!(out, "🧑‍💬 You: {text}")?;
                text
            }
            Command::Say(text) => text,
        };

        writeln!(out, "MindMate is listening...")?;
        out.flush()?;
        match run_turn(client, session, text).await {
            Ok(reply) => writeln!(out, "🧘 MindMate: {reply}")?,
            Err(e) => {
                warn!(error = ?e, "Chat turn failed");
                writeln!(out, "Error: {e}")?;
            }
        }
    }

    info!(messages = session.len(), "Terminal chat finished");
    Ok(())
}
