//! Chat attachment uploads
//!
//! The chat panel beside the load wizard re-uploads any attachment that still
//! has a local file. Each file is an independent task; the tasks run
//! concurrently and a failure is logged and reported without touching the
//! wizard.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use futures::future::join_all;
use tracing::{info, warn};
use uuid::Uuid;

use crate::client::ApiClient;
use crate::models::{AttachmentKind, ChatMessage, Load, NewChatMessage};
use crate::utils::errors::AppResult;

/// Chat endpoints the panel needs
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn post_message(&self, message: &NewChatMessage) -> AppResult<ChatMessage>;

    async fn upload_attachment(
        &self,
        load_id: i64,
        kind: AttachmentKind,
        path: &Path,
    ) -> AppResult<ChatMessage>;
}

#[async_trait]
impl ChatBackend for ApiClient {
    async fn post_message(&self, message: &NewChatMessage) -> AppResult<ChatMessage> {
        self.post_chat_message(message).await
    }

    async fn upload_attachment(
        &self,
        load_id: i64,
        kind: AttachmentKind,
        path: &Path,
    ) -> AppResult<ChatMessage> {
        self.upload_chat_attachment(load_id, kind, path).await
    }
}

/// One file waiting to be posted to a load's chat
#[derive(Debug, Clone, PartialEq)]
pub struct UploadTask {
    pub id: Uuid,
    pub load_id: i64,
    pub kind: AttachmentKind,
    pub path: PathBuf,
}

/// Result of one task
#[derive(Debug, Clone, PartialEq)]
pub enum UploadOutcome {
    Uploaded { task: Uuid, kind: AttachmentKind },
    Failed { task: Uuid, kind: AttachmentKind, error: String },
}

impl UploadOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, UploadOutcome::Uploaded { .. })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UploadReport {
    pub outcomes: Vec<UploadOutcome>,
}

impl UploadReport {
    pub fn uploaded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.uploaded()
    }
}

#[derive(Debug, Clone, Default)]
pub struct UploadQueue {
    tasks: Vec<UploadTask>,
}

impl UploadQueue {
    /// One task per attachment of `load` that still points at a local file
    pub fn from_load(load_id: i64, load: &Load) -> Self {
        let tasks = load
            .pending_attachments()
            .into_iter()
            .map(|(kind, path)| UploadTask {
                id: Uuid::new_v4(),
                load_id,
                kind,
                path,
            })
            .collect();
        Self { tasks }
    }

    pub fn tasks(&self) -> &[UploadTask] {
        &self.tasks
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Run every task concurrently. Never fails; see the report.
    pub async fn run(self, backend: &dyn ChatBackend) -> UploadReport {
        let uploads = self.tasks.into_iter().map(|task| async move {
            match backend
                .upload_attachment(task.load_id, task.kind, &task.path)
                .await
            {
                Ok(_) => {
                    info!("📎 Uploaded {} to load {} chat", task.kind.field_name(), task.load_id);
                    UploadOutcome::Uploaded {
                        task: task.id,
                        kind: task.kind,
                    }
                }
                Err(e) => {
                    warn!(
                        "⚠️ Chat upload of {} ({}) failed: {}",
                        task.kind.field_name(),
                        task.path.display(),
                        e
                    );
                    UploadOutcome::Failed {
                        task: task.id,
                        kind: task.kind,
                        error: e.to_string(),
                    }
                }
            }
        });

        UploadReport {
            outcomes: join_all(uploads).await,
        }
    }
}

/// Chat side panel of one load
pub struct ChatPanel<'a> {
    backend: &'a dyn ChatBackend,
    load_id: i64,
    user: Option<i64>,
}

impl<'a> ChatPanel<'a> {
    pub fn new(backend: &'a dyn ChatBackend, load_id: i64, user: Option<i64>) -> Self {
        Self {
            backend,
            load_id,
            user,
        }
    }

    /// Post `message` when it has text, then push any local attachment files
    /// of `load`. The uploads run whether or not a message was posted.
    ///
    /// Only the message can fail the call; uploads end up in the report.
    pub async fn send(
        &self,
        message: &str,
        load: &Load,
    ) -> AppResult<(Option<ChatMessage>, UploadReport)> {
        let posted = if message.trim().is_empty() {
            None
        } else {
            let posted = self
                .backend
                .post_message(&NewChatMessage {
                    load_id: self.load_id,
                    message: message.to_string(),
                    user: self.user,
                })
                .await?;
            Some(posted)
        };

        let report = UploadQueue::from_load(self.load_id, load)
            .run(self.backend)
            .await;
        Ok((posted, report))
    }
}
