use std::path::Path;

use calldesk_core::{
    domain::AudioAttachment,
    errors::Error,
    settings::SettingsUpdate,
};

use crate::{app::App, render};

const HELP: &str = "\
Numbers:   /numbers | /add <phone> <audio-file> <text...> | /dup <id>
           /sync | /publish <phone> <audio-file> <text...>
Call logs: /logs | /search [term] | /export
Blast:     /recipients | /draft <text...> | /blast [text...]
Settings:  /settings | /set <key> <value> | /save
Other:     /help | /quit";

/// What the shell prints after a command.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub quit: bool,
}

impl Reply {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            quit: false,
        }
    }

    /// Nothing to add: the view already sent a notice.
    fn none() -> Self {
        Self::default()
    }
}

fn parse_command(text: &str) -> (String, String) {
    let mut parts = text.trim().splitn(2, char::is_whitespace);
    let first = parts.next().unwrap_or("").trim();
    let rest = parts.next().unwrap_or("").trim().to_string();
    let cmd = first.trim_start_matches('/').to_lowercase();
    (cmd, rest)
}

/// `<phone> <audio-file> <text...>`
fn split_number_args(args: &str) -> Option<(&str, &str, &str)> {
    let mut parts = args.splitn(3, char::is_whitespace);
    let phone = parts.next().filter(|s| !s.is_empty())?;
    let path = parts.next().filter(|s| !s.is_empty())?;
    let text = parts.next().unwrap_or("").trim();
    Some((phone, path, text))
}

async fn read_audio(path: &str) -> Result<AudioAttachment, String> {
    let data = tokio::fs::read(path)
        .await
        .map_err(|e| format!("Cannot read audio file {path}: {e}"))?;
    let file_name = Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string());
    Ok(AudioAttachment::new(file_name, data))
}

fn describe(e: &Error) -> String {
    match e {
        Error::NotFound(what) => format!("Not found: {what}"),
        other => other.to_string(),
    }
}

pub async fn handle_line(app: &mut App, line: &str) -> Reply {
    let (cmd, args) = parse_command(line);
    tracing::debug!(cmd = %cmd, "console command");

    match cmd.as_str() {
        "help" | "start" => Reply::text(HELP),

        "quit" | "exit" => Reply {
            text: "Bye.".to_string(),
            quit: true,
        },

        // ============== Numbers ==============
        "numbers" => Reply::text(render::numbers(&app.numbers.list().await, &app.format)),

        "add" | "publish" => {
            let Some((phone, path, text)) = split_number_args(&args) else {
                return Reply::text(format!("Usage: /{cmd} <phone> <audio-file> <text...>"));
            };
            let audio = match read_audio(path).await {
                Ok(a) => a,
                Err(msg) => return Reply::text(msg),
            };

            let res = if cmd == "add" {
                let form = app.numbers.form_mut();
                form.phone_number = phone.to_string();
                form.text_content = text.to_string();
                form.audio = Some(audio);
                app.numbers.open_form();
                let res = app.numbers.submit_form().await;
                app.numbers.cancel_form();
                res
            } else {
                let gateway = app.gateway.clone();
                app.numbers
                    .publish(gateway.as_ref(), phone, text, Some(&audio))
                    .await
            };

            match res {
                Ok(m) => Reply::text(format!("Added #{} {}", m.id, m.phone_number)),
                Err(_) => Reply::none(),
            }
        }

        "dup" | "duplicate" => {
            let Ok(id) = args.trim().parse::<u64>() else {
                return Reply::text("Usage: /dup <id>");
            };
            match app.numbers.duplicate_by_id(id).await {
                Ok(m) => Reply::text(format!("Created #{} from #{id}; set its phone number.", m.id)),
                Err(e) => Reply::text(describe(&e)),
            }
        }

        "sync" => {
            let gateway = app.gateway.clone();
            match app.numbers.pull(gateway.as_ref()).await {
                Ok(n) => Reply::text(format!("Loaded {n} phone numbers.")),
                Err(_) => Reply::none(),
            }
        }

        // ============== Call logs ==============
        "logs" => Reply::text(render::call_logs(
            &app.logs.visible().await,
            &app.format,
            &app.logs.summary().await,
        )),

        "search" => {
            app.logs.set_search_term(args);
            Reply::text(render::call_logs(
                &app.logs.visible().await,
                &app.format,
                &app.logs.summary().await,
            ))
        }

        "export" => match app.logs.export().await {
            Ok(out) => Reply::text(format!("Saved {}", out.path.display())),
            Err(_) => Reply::none(),
        },

        // ============== Blast ==============
        "recipients" => Reply::text(render::recipients(&app.blast.recipients().await)),

        "draft" => {
            app.blast.set_body(args);
            Reply::text(app.blast.counter().await)
        }

        "blast" => {
            if !args.is_empty() {
                app.blast.set_body(args);
            }
            let _ = app.blast.send().await;
            Reply::none()
        }

        // ============== Settings ==============
        "settings" => match render::settings(&app.settings.current().await) {
            Ok(text) => Reply::text(text),
            Err(e) => Reply::text(describe(&e)),
        },

        "set" => {
            let Some((key, value)) = args.split_once(char::is_whitespace) else {
                return Reply::text("Usage: /set <key> <value>");
            };
            let update = match SettingsUpdate::parse(key, value) {
                Ok(u) => u,
                Err(e) => return Reply::text(describe(&e)),
            };
            let field = update.field();
            match app.settings.update(update).await {
                Ok(_) => Reply::text(format!("{field} updated (not saved yet).")),
                Err(_) => Reply::none(),
            }
        }

        "save" => {
            let _ = app.settings.save().await;
            Reply::none()
        }

        _ => Reply::text(format!("Unknown command: /{cmd}")),
    }
}
