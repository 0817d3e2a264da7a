//! Load workflow commands, including the interactive stepper

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Subcommand};
use colored::*;
use serde_json::Map;

use super::prompt::{ask, heading};
use super::{parse_assignment, read_form_file};
use crate::client::ApiClient;
use crate::models::{Attachment, AttachmentKind, Load, LoadStage};
use crate::services::load_workflow::{required_fields, AttachOutcome, LoadWizard, Transition};
use crate::services::upload_queue::{ChatPanel, UploadOutcome};
use crate::utils::errors::{field_label, AppError, AppResult};

#[derive(Debug, Args)]
pub struct LoadArgs {
    #[command(subcommand)]
    pub command: LoadCommand,
}

#[derive(Debug, Subcommand)]
pub enum LoadCommand {
    /// Print the stage sequence and what each stage requires
    Stages,

    /// Validate the current stage and move the load to the next one
    Next { id: i64 },

    /// Persist the load without changing its stage
    Save {
        id: i64,

        /// JSON object with field edits applied before saving
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Upload one attachment field right away
    Attach {
        id: i64,

        /// commercial_invoice, rate_confirmation, document, proof_of_delivery or bill_of_lading
        #[arg(short, long)]
        kind: AttachmentKind,

        #[arg(short, long)]
        file: PathBuf,
    },

    /// Post to the load's chat, re-uploading any attached files
    Chat {
        id: i64,

        #[arg(short, long)]
        message: Option<String>,

        /// kind=path, may be repeated
        #[arg(short, long = "attach", value_parser = parse_attach)]
        attachments: Vec<(AttachmentKind, PathBuf)>,

        /// Print the conversation
        #[arg(long)]
        history: bool,
    },

    /// Step through the workflow interactively; resumes the last created load
    /// when no id is given
    Wizard { id: Option<i64> },
}

fn parse_attach(raw: &str) -> Result<(AttachmentKind, PathBuf), String> {
    let (kind, path) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected kind=path, got '{}'", raw))?;
    Ok((kind.parse()?, PathBuf::from(path.trim())))
}

pub async fn execute(client: &ApiClient, args: LoadArgs) -> AppResult<()> {
    match args.command {
        LoadCommand::Stages => {
            stages();
            Ok(())
        }
        LoadCommand::Next { id } => next(client, id).await,
        LoadCommand::Save { id, file } => save(client, id, file).await,
        LoadCommand::Attach { id, kind, file } => attach(client, id, kind, file).await,
        LoadCommand::Chat {
            id,
            message,
            attachments,
            history,
        } => chat(client, id, message, attachments, history).await,
        LoadCommand::Wizard { id } => wizard(client, id).await,
    }
}

fn stages() {
    println!("{}", "🚚 LOAD STAGES".bright_green().bold());
    for stage in LoadStage::ALL {
        let fields: Vec<String> = required_fields(stage)
            .iter()
            .map(|field| field_label(field.as_str()))
            .collect();
        println!(
            "{:>2}. {:<11} {:<11} requires: {}",
            stage.index() + 1,
            stage.label(),
            stage.status().as_str().dimmed(),
            fields.join(", ")
        );
    }
}

async fn open_wizard(client: &ApiClient, id: i64) -> AppResult<LoadWizard> {
    let load: Load = client.fetch(id).await?;
    Ok(LoadWizard::new(
        Arc::new(client.clone()),
        client.session().clone(),
        load,
    ))
}

fn print_transition(transition: Transition) {
    match transition {
        Transition::Advanced { from, to } => {
            println!("{} {} → {}", "✅".green(), from.label(), to.label().bold())
        }
        Transition::Completed => println!("{} workflow completed", "🏁".green()),
    }
}

async fn next(client: &ApiClient, id: i64) -> AppResult<()> {
    let mut wizard = open_wizard(client, id).await?;
    let transition = wizard.next().await?;
    print_transition(transition);
    Ok(())
}

async fn save(client: &ApiClient, id: i64, file: Option<PathBuf>) -> AppResult<()> {
    let mut wizard = open_wizard(client, id).await?;
    if let Some(file) = file {
        wizard.edit(&read_form_file(&file)?)?;
    }
    wizard.save().await?;
    println!("{} saved load {} at {}", "💾".green(), id, wizard.stage().label());
    Ok(())
}

async fn attach(client: &ApiClient, id: i64, kind: AttachmentKind, file: PathBuf) -> AppResult<()> {
    let mut wizard = open_wizard(client, id).await?;
    match wizard.attach(kind, file).await? {
        AttachOutcome::Uploaded => println!("{} uploaded {}", "📎".green(), kind),
        AttachOutcome::Deferred => println!("{} {} will go out with the next save", "⏳".yellow(), kind),
    }
    Ok(())
}

async fn chat(
    client: &ApiClient,
    id: i64,
    message: Option<String>,
    attachments: Vec<(AttachmentKind, PathBuf)>,
    history: bool,
) -> AppResult<()> {
    let message = message.unwrap_or_default();
    if !message.trim().is_empty() || !attachments.is_empty() {
        let mut load: Load = client.fetch(id).await?;
        for (kind, path) in attachments {
            load.set_attachment(kind, Some(Attachment::Pending(path)));
        }

        let user = client.session().snapshot().await.user_id;
        let panel = ChatPanel::new(client, id, user);
        let (posted, report) = panel.send(&message, &load).await?;

        if posted.is_some() {
            println!("{} message posted", "💬".green());
        }
        for outcome in &report.outcomes {
            match outcome {
                UploadOutcome::Uploaded { kind, .. } => println!("   📎 {} uploaded", kind),
                UploadOutcome::Failed { kind, error, .. } => {
                    println!("   {} {} failed: {}", "⚠️".yellow(), kind, error)
                }
            }
        }
    }

    if history {
        for entry in client.chat_messages(id).await? {
            let when = entry
                .created_at
                .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_default();
            let body = entry
                .message
                .or_else(|| entry.field_name.map(|field| format!("[{}]", field)))
                .unwrap_or_default();
            println!(
                "   {} user {}: {}",
                when.dimmed(),
                entry.user.map(|u| u.to_string()).unwrap_or_else(|| "?".into()),
                body
            );
        }
    }
    Ok(())
}

fn print_wizard(wizard: &LoadWizard) {
    heading(&format!(
        "🚚 LOAD {} · {} ({}/{})",
        wizard
            .load()
            .id
            .map(|id| id.to_string())
            .unwrap_or_else(|| "new".into()),
        wizard.stage().label(),
        wizard.stage().index() + 1,
        LoadStage::ALL.len()
    ));

    let missing = wizard.missing_fields();
    for field in required_fields(wizard.stage()) {
        let mark = if missing.contains(field) { "✗".red() } else { "✓".green() };
        println!("   {} {}", mark, field_label(field.as_str()));
    }
    for kind in AttachmentKind::ALL {
        match wizard.load().attachment(kind) {
            Some(Attachment::Pending(path)) => {
                println!("   📎 {} (local: {})", kind, path.display())
            }
            Some(Attachment::Stored(_)) => println!("   📎 {} (stored)", kind),
            None => {}
        }
    }
    println!("n) next  b) back  s) save  set field=value  attach kind path  q) quit");
}

async fn wizard(client: &ApiClient, id: Option<i64>) -> AppResult<()> {
    let id = match id {
        Some(id) => Some(id),
        None => client.session().load_id().await,
    };
    let mut wizard = match id {
        Some(id) => open_wizard(client, id).await?,
        None => LoadWizard::new(
            Arc::new(client.clone()),
            client.session().clone(),
            Load::default(),
        ),
    };

    loop {
        print_wizard(&wizard);
        let input = ask("> ")?;
        let (command, rest) = input.split_once(' ').unwrap_or((input.as_str(), ""));

        let result = match command {
            "n" | "next" => match wizard.next().await {
                Ok(Transition::Completed) => {
                    print_transition(Transition::Completed);
                    break;
                }
                Ok(transition) => {
                    print_transition(transition);
                    Ok(())
                }
                Err(e) => Err(e),
            },
            "b" | "back" => {
                let stage = wizard.back();
                println!("⬅️  {}", stage.label());
                Ok(())
            }
            "s" | "save" => wizard.save().await.map(|_| println!("{} saved", "💾".green())),
            "set" => match parse_assignment(rest) {
                Some((name, value)) => {
                    let mut edits = Map::new();
                    edits.insert(name, value);
                    wizard.edit(&edits)
                }
                None => {
                    println!("{}", "usage: set field=value".bright_red());
                    Ok(())
                }
            },
            "attach" => match rest.trim().split_once(' ') {
                Some((kind, path)) => match kind.parse::<AttachmentKind>() {
                    Ok(kind) => wizard
                        .attach(kind, PathBuf::from(path.trim()))
                        .await
                        .map(|outcome| println!("📎 {:?}", outcome)),
                    Err(e) => {
                        println!("{}", e.bright_red());
                        Ok(())
                    }
                },
                None => {
                    println!("{}", "usage: attach kind path".bright_red());
                    Ok(())
                }
            },
            "q" | "quit" => break,
            "" => Ok(()),
            other => {
                println!("{}", format!("❌ unknown command '{}'", other).bright_red());
                Ok(())
            }
        };

        match result {
            Ok(()) => {}
            // Validation and backend errors keep the stepper open
            Err(AppError::SessionExpired) => return Err(AppError::SessionExpired),
            Err(e) => println!("{} {}", "❌".red(), e),
        }
    }
    Ok(())
}
