// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The interactive chat shell.
//!
//! Resumes (or establishes) a session, loads the conversation, then enters
//! a readline REPL: plain input sends a message, slash commands cover the
//! rest (edit, delete, resend, context switching, reload, logout).

use std::sync::Arc;

use colored::Colorize;
use courier_api::HttpBackend;
use courier_chat::{ChatController, DeleteOutcome, EditOutcome, SendOutcome};
use courier_config::CourierConfig;
use courier_core::{ChatMessage, ContextId, CourierError, DeliveryState, Sender, UserProfile};
use courier_session::SessionAccessor;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing::debug;

/// How the shell establishes its session on startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    /// Try the existing session cookie first, fall back to the login form.
    Resume,
    /// Go straight to the login form.
    Login,
    /// Go straight to the signup form.
    Signup,
}

enum Flow {
    Continue,
    Quit,
}

/// Runs the chat shell. Returns `Ok(())` on a normal exit, including a
/// user-aborted login.
pub async fn run(config: CourierConfig, mode: AuthMode) -> Result<(), CourierError> {
    let backend = Arc::new(HttpBackend::new(&config.api)?);
    let mut session = SessionAccessor::new(backend.clone());

    let mut rl = DefaultEditor::new()
        .map_err(|e| CourierError::Internal(format!("failed to initialize readline: {e}")))?;

    let profile = match establish_session(&mut rl, &mut session, mode).await? {
        Some(profile) => profile,
        None => {
            println!("{}", "goodbye".dimmed());
            return Ok(());
        }
    };

    println!(
        "{}",
        format!("signed in as {} <{}>", profile.name, profile.email)
            .bold()
            .green()
    );
    println!("Type {} for commands, {} to exit.\n", "/help".yellow(), "/quit".yellow());

    let mut controller = ChatController::new(backend);
    match controller.load().await {
        Ok(()) => render_conversation(&controller),
        Err(e) => {
            // Fetch failure is not fatal and not silent: say so, stay up,
            // and let /reload retry once the backend is reachable.
            eprintln!("{}: {e}", "history unavailable".red());
            if e.is_retryable() {
                eprintln!("use {} once the backend is reachable", "/reload".yellow());
            } else {
                eprintln!("use {} to retry", "/reload".yellow());
            }
        }
    }

    let prompt = format!("{}> ", config.shell.prompt.green());
    loop {
        match rl.readline(&prompt) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(&line);

                if trimmed == "/quit" || trimmed == "/exit" {
                    break;
                }
                match handle_line(&mut session, &mut controller, trimmed).await {
                    Ok(Flow::Continue) => {}
                    Ok(Flow::Quit) => break,
                    Err(e) => eprintln!("{}: {e}", "error".red()),
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("{}: {e}", "error".red());
                break;
            }
        }
    }

    println!("{}", "goodbye".dimmed());
    Ok(())
}

/// Establishes the session per the auth mode. Returns `None` when the user
/// aborts the form.
async fn establish_session(
    rl: &mut DefaultEditor,
    session: &mut SessionAccessor,
    mode: AuthMode,
) -> Result<Option<UserProfile>, CourierError> {
    match mode {
        AuthMode::Resume => match session.whoami().await {
            Ok(profile) => Ok(Some(profile)),
            Err(CourierError::SessionExpired) => {
                println!("{}", "no active session -- log in".dimmed());
                login_form(rl, session).await
            }
            Err(e) => Err(e),
        },
        AuthMode::Login => login_form(rl, session).await,
        AuthMode::Signup => signup_form(rl, session).await,
    }
}

/// Interactive login form. Rejected credentials show the server's detail
/// message and re-prompt; `/signup` switches to the signup form; an empty
/// email or Ctrl-C aborts.
async fn login_form(
    rl: &mut DefaultEditor,
    session: &mut SessionAccessor,
) -> Result<Option<UserProfile>, CourierError> {
    println!(
        "{} (or {} to create an account)",
        "log in".bold(),
        "/signup".yellow()
    );
    loop {
        let Some(email) = read_field(rl, "email: ")? else {
            return Ok(None);
        };
        if email == "/signup" {
            return signup_form(rl, session).await;
        }
        let Some(password) = read_password()? else {
            return Ok(None);
        };

        match session.login(&email, &password).await {
            Ok(profile) => return Ok(Some(profile)),
            Err(CourierError::Auth { message }) => eprintln!("{}", message.red()),
            Err(CourierError::Validation(message)) => eprintln!("{}", message.red()),
            Err(e) => return Err(e),
        }
    }
}

/// Interactive signup form; same abort and error-display contract as login.
async fn signup_form(
    rl: &mut DefaultEditor,
    session: &mut SessionAccessor,
) -> Result<Option<UserProfile>, CourierError> {
    println!("{}", "create an account".bold());
    loop {
        let Some(email) = read_field(rl, "email: ")? else {
            return Ok(None);
        };
        let Some(name) = read_field(rl, "name: ")? else {
            return Ok(None);
        };
        let Some(password) = read_password()? else {
            return Ok(None);
        };

        match session.signup(&email, &name, &password).await {
            Ok(profile) => return Ok(Some(profile)),
            Err(CourierError::Auth { message }) => eprintln!("{}", message.red()),
            Err(CourierError::Validation(message)) => eprintln!("{}", message.red()),
            Err(e) => return Err(e),
        }
    }
}

/// Reads one non-empty line; `None` means the user aborted.
fn read_field(rl: &mut DefaultEditor, prompt: &str) -> Result<Option<String>, CourierError> {
    match rl.readline(prompt) {
        Ok(line) => {
            let trimmed = line.trim().to_string();
            if trimmed.is_empty() {
                Ok(None)
            } else {
                Ok(Some(trimmed))
            }
        }
        Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(None),
        Err(e) => Err(CourierError::Internal(format!("readline failed: {e}"))),
    }
}

fn read_password() -> Result<Option<String>, CourierError> {
    match rpassword::prompt_password("password: ") {
        Ok(password) if password.is_empty() => Ok(None),
        Ok(password) => Ok(Some(password)),
        Err(e) => Err(CourierError::Internal(format!(
            "password prompt failed: {e}"
        ))),
    }
}

/// Dispatches one REPL line: a slash command or a plain message send.
async fn handle_line(
    session: &mut SessionAccessor,
    controller: &mut ChatController,
    line: &str,
) -> Result<Flow, CourierError> {
    if !line.starts_with('/') {
        send_message(controller, line).await?;
        return Ok(Flow::Continue);
    }

    let (command, rest) = match line.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (line, ""),
    };

    match command {
        "/help" => print_help(),
        "/history" => render_conversation(controller),
        "/reload" => match controller.load().await {
            Ok(()) => render_conversation(controller),
            Err(e) => eprintln!("{}: {e}", "reload failed".red()),
        },
        "/contexts" => render_contexts(controller),
        "/context" => {
            if rest.is_empty() {
                eprintln!("usage: /context <id>");
            } else {
                match controller.select_context(ContextId(rest.to_string())).await {
                    Ok(()) => render_conversation(controller),
                    Err(e) => eprintln!("{}: {e}", "context switch failed".red()),
                }
            }
        }
        "/resend" => resend_message(controller, rest).await?,
        "/edit" => edit_message(controller, rest).await?,
        "/delete" => delete_message(controller, rest).await?,
        "/whoami" => match session.current_user() {
            Some(user) => println!("{} <{}>", user.name, user.email),
            None => println!("{}", "not signed in".dimmed()),
        },
        "/logout" => {
            if let Err(e) = session.logout().await {
                // Identity is cleared regardless; the server call failing
                // only means the cookie dies on its own.
                eprintln!("{}: {e}", "server logout failed".yellow());
            }
            println!("{}", "logged out".dimmed());
            return Ok(Flow::Quit);
        }
        _ => {
            debug!(command, "unknown shell command");
            eprintln!("unknown command {command}; try {}", "/help".yellow());
        }
    }

    Ok(Flow::Continue)
}

async fn send_message(controller: &mut ChatController, text: &str) -> Result<(), CourierError> {
    let (key, outcome) = controller.send(text).await?;
    match outcome {
        SendOutcome::Delivered => {
            // Echo the canonical copy and the bot's reply (the last two).
            let total = controller.messages().len();
            for ordinal in [total.saturating_sub(1), total] {
                if let Some(message) = ordinal
                    .checked_sub(1)
                    .and_then(|i| controller.messages().get(i))
                {
                    println!("{}", format_message(ordinal, message));
                }
            }
        }
        SendOutcome::Failed => {
            let ordinal = ordinal_of(controller, &key);
            eprintln!(
                "{}",
                format!("not delivered -- /resend {ordinal} to retry").red()
            );
        }
        SendOutcome::Skipped => {}
    }
    Ok(())
}

async fn resend_message(
    controller: &mut ChatController,
    arg: &str,
) -> Result<(), CourierError> {
    let Some(key) = parse_ordinal(controller, arg, "/resend") else {
        return Ok(());
    };
    match controller.resend(&key).await? {
        SendOutcome::Delivered => {
            let total = controller.messages().len();
            if let Some(message) = controller.messages().get(total - 1) {
                println!("{}", format_message(total, message));
            }
            println!("{}", "delivered".dimmed());
        }
        SendOutcome::Failed => eprintln!("{}", "still not delivered".red()),
        SendOutcome::Skipped => println!("that message isn't waiting for a resend"),
    }
    Ok(())
}

async fn edit_message(controller: &mut ChatController, arg: &str) -> Result<(), CourierError> {
    let (ordinal_arg, new_text) = match arg.split_once(char::is_whitespace) {
        Some((n, text)) if !text.trim().is_empty() => (n, text.trim()),
        _ => {
            eprintln!("usage: /edit <n> <new text>");
            return Ok(());
        }
    };
    let Some(key) = parse_ordinal(controller, ordinal_arg, "/edit") else {
        return Ok(());
    };
    match controller.edit(&key, new_text).await? {
        EditOutcome::Applied => println!("{}", "edited".dimmed()),
        EditOutcome::Reverted => println!("{}", "edit not saved, original text kept".dimmed()),
        EditOutcome::Skipped => println!("only your delivered messages can be edited"),
    }
    Ok(())
}

async fn delete_message(
    controller: &mut ChatController,
    arg: &str,
) -> Result<(), CourierError> {
    let Some(key) = parse_ordinal(controller, arg, "/delete") else {
        return Ok(());
    };
    match controller.delete(&key).await? {
        DeleteOutcome::Removed => println!("{}", "deleted".dimmed()),
        DeleteOutcome::Reverted => eprintln!("{}", "delete failed, message kept".red()),
        DeleteOutcome::Skipped => println!("only your delivered messages can be deleted"),
    }
    Ok(())
}

/// Resolves a 1-based ordinal argument to a message key, printing usage on
/// bad input.
fn parse_ordinal(
    controller: &ChatController,
    arg: &str,
    command: &str,
) -> Option<courier_core::LocalKey> {
    let Ok(ordinal) = arg.parse::<usize>() else {
        eprintln!("usage: {command} <n>  (message numbers from /history)");
        return None;
    };
    let key = controller.conversation().key_at(ordinal);
    if key.is_none() {
        eprintln!("no message {ordinal}; see /history");
    }
    key
}

fn ordinal_of(controller: &ChatController, key: &courier_core::LocalKey) -> usize {
    controller
        .messages()
        .iter()
        .position(|m| &m.key == key)
        .map_or(0, |i| i + 1)
}

fn render_conversation(controller: &ChatController) {
    let messages = controller.messages();
    if messages.is_empty() {
        println!("{}", "no messages yet -- say hello".dimmed());
        return;
    }
    for (i, message) in messages.iter().enumerate() {
        println!("{}", format_message(i + 1, message));
    }
}

fn render_contexts(controller: &ChatController) {
    for context in controller.contexts() {
        let marker = if &context.id == controller.active_context() {
            "*".green().to_string()
        } else {
            " ".to_string()
        };
        println!("{marker} {}  {}", context.id, context.title);
    }
}

fn format_message(ordinal: usize, message: &ChatMessage) -> String {
    let time = format_timestamp(message.timestamp);
    let who = match message.sender {
        Sender::User => "you".cyan().bold(),
        Sender::System => "bot".magenta().bold(),
    };
    let marker = match message.delivery {
        DeliveryState::Pending | DeliveryState::Sending => format!("  {}", "sending...".dimmed()),
        DeliveryState::Deleting => format!("  {}", "deleting...".dimmed()),
        DeliveryState::Sent if message.sender == Sender::User => {
            format!("  {}", "sent".dimmed())
        }
        DeliveryState::Sent => String::new(),
        DeliveryState::Failed => format!(
            "  {}",
            format!("failed -- /resend {ordinal} to retry").red()
        ),
    };
    format!(
        "{:>3}  {}  {}  {}{}",
        ordinal,
        time.dimmed(),
        who,
        message.text,
        marker
    )
}

fn format_timestamp(timestamp: i64) -> String {
    chrono::DateTime::from_timestamp(timestamp, 0)
        .map(|dt| dt.with_timezone(&chrono::Local).format("%H:%M").to_string())
        .unwrap_or_else(|| "--:--".to_string())
}

fn print_help() {
    println!("plain text        send a message to the active context");
    println!("/history          show the conversation");
    println!("/reload           refetch history and contexts");
    println!("/contexts         list contexts ({} marks active)", "*".green());
    println!("/context <id>     switch the active context");
    println!("/resend <n>       retry a failed message");
    println!("/edit <n> <text>  edit one of your delivered messages");
    println!("/delete <n>       delete one of your delivered messages");
    println!("/whoami           show the signed-in user");
    println!("/logout           end the session and exit");
    println!("/quit             exit without logging out");
}

#[cfg(test)]
mod tests {
    use super::*;
    use courier_core::MessageId;

    #[test]
    fn format_message_flags_failed_with_resend_hint() {
        // Force plain output so assertions see the text, not ANSI codes.
        colored::control::set_override(false);
        let mut message = ChatMessage::pending("hello");
        message.delivery = DeliveryState::Failed;

        let line = format_message(3, &message);
        assert!(line.contains("hello"));
        assert!(line.contains("/resend 3"), "got: {line}");
    }

    #[test]
    fn format_message_marks_user_sent_but_not_bot() {
        colored::control::set_override(false);
        let user = ChatMessage::acknowledged(Sender::User, "hi", 1_700_000_000, MessageId(1));
        let bot = ChatMessage::acknowledged(Sender::System, "hello!", 1_700_000_000, MessageId(2));

        assert!(format_message(1, &user).contains("sent"));
        assert!(!format_message(2, &bot).contains("sent"));
    }

    #[test]
    fn timestamps_render_as_local_clock_time() {
        let rendered = format_timestamp(1_700_000_000);
        assert_eq!(rendered.len(), 5);
        assert!(rendered.contains(':'));
        assert_eq!(format_timestamp(i64::MAX), "--:--");
    }
}
