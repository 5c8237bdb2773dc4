//! Conversation controller.
//!
//! [`Relay`] is the one entry point the host calls per webhook delivery. It
//! decodes the update, drops redeliveries, classifies it, and runs the
//! matching pipeline while holding the chat's lock.

use crate::command::{Callback, Command, depth_menu, main_menu};
use crate::dedup::{DEFAULT_LEDGER_CAPACITY, DeliveryLedger};
use crate::error::DispatchError;
use crate::intent::{Intent, classify};
use crate::replies::Replies;
use rootcause::prelude::ResultExt;
use std::sync::Arc;
use tracing::{Instrument, debug, error, info, info_span, warn};
use voice_relay_ai::{LlmBackend, LlmMessage, LlmRequest, SpeechSynthesizer, Transcriber};
use voice_relay_conversation::{ChatLocks, ContextPolicy, HistoryStore, Message, Turn};
use voice_relay_core::{CallbackId, ChatId, FileId, RequestId, Result};
use voice_relay_telegram::{ChatSender, FileSource, Update};

/// How one delivery was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InboundOutcome {
    /// The update was processed.
    Handled,
    /// The update id was already processed.
    Duplicate,
    /// The update was unreadable or had no chat to answer.
    Ignored,
    /// A collaborator failed and the pipeline was aborted.
    Failed,
}

/// External systems the relay talks to.
#[derive(Clone)]
pub struct Collaborators {
    pub history: Arc<dyn HistoryStore>,
    pub context: Arc<dyn ContextPolicy>,
    pub completion: Arc<dyn LlmBackend>,
    pub transcriber: Arc<dyn Transcriber>,
    pub synthesizer: Arc<dyn SpeechSynthesizer>,
    pub files: Arc<dyn FileSource>,
    pub sender: Arc<dyn ChatSender>,
}

/// Routes classified updates to their pipelines.
pub struct Relay {
    collab: Collaborators,
    replies: Replies,
    locks: ChatLocks,
    ledger: DeliveryLedger,
}

impl Relay {
    #[must_use]
    pub fn new(collaborators: Collaborators, replies: Replies) -> Self {
        Self {
            collab: collaborators,
            replies,
            locks: ChatLocks::new(),
            ledger: DeliveryLedger::new(DEFAULT_LEDGER_CAPACITY),
        }
    }

    /// Overrides how many update ids are remembered for de-duplication.
    #[must_use]
    pub fn with_ledger_capacity(mut self, capacity: usize) -> Self {
        self.ledger = DeliveryLedger::new(capacity);
        self
    }

    /// Handles one raw webhook body.
    ///
    /// Never fails: undecodable bodies are ignored and pipeline failures are
    /// logged, so the host can always acknowledge the delivery.
    pub async fn handle_inbound_update(&self, raw: &[u8]) -> InboundOutcome {
        let request_id = RequestId::new();
        let span = info_span!("inbound_update", %request_id);

        async move {
            let update: Update = match serde_json::from_slice(raw) {
                Ok(update) => update,
                Err(e) => {
                    warn!(error = %e, "ignoring undecodable update");
                    return InboundOutcome::Ignored;
                }
            };

            match self.handle_update(update).await {
                Ok(outcome) => outcome,
                Err(report) => {
                    let chat_id = report.current_context().chat_id();
                    error!(%chat_id, error = %report, "update handling failed");
                    InboundOutcome::Failed
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Handles one decoded update.
    ///
    /// # Errors
    ///
    /// Returns an error if any collaborator fails; the rest of the pipeline
    /// is skipped.
    pub async fn handle_update(&self, update: Update) -> Result<InboundOutcome, DispatchError> {
        let update_id = update.update_id;
        if !self.ledger.first_delivery(update_id) {
            info!(%update_id, "skipping redelivered update");
            return Ok(InboundOutcome::Duplicate);
        }

        let intent = classify(&update);
        let Some(chat_id) = intent.chat_id() else {
            info!(%update_id, %intent, "update has no chat to answer");
            return Ok(InboundOutcome::Ignored);
        };

        let _guard = self.locks.acquire(chat_id).await;
        info!(%update_id, %chat_id, %intent, "dispatching update");
        self.dispatch(chat_id, intent).await?;
        Ok(InboundOutcome::Handled)
    }

    async fn dispatch(&self, chat_id: ChatId, intent: Intent) -> Result<(), DispatchError> {
        match intent {
            Intent::Command { text, .. } => self.on_command(chat_id, &text).await,
            Intent::TextMessage { text, .. } => self.converse(chat_id, text).await,
            Intent::VoiceMessage { file_id, .. } => {
                let text = self.transcribe(chat_id, &file_id).await?;
                self.converse(chat_id, text).await
            }
            Intent::CallbackReplay {
                callback_id, data, ..
            } => self.on_callback(chat_id, &callback_id, &data).await,
            Intent::Unknown { .. } => self.send_text(chat_id, &self.replies.fallback).await,
        }
    }

    async fn transcribe(&self, chat_id: ChatId, file_id: &FileId) -> Result<String, DispatchError> {
        let audio = self
            .collab
            .files
            .download(file_id)
            .await
            .context(DispatchError::Download { chat_id })?;
        let text = self
            .collab
            .transcriber
            .transcribe(&audio)
            .await
            .context(DispatchError::Transcription { chat_id })?;
        debug!(%chat_id, chars = text.chars().count(), "voice transcribed");
        Ok(text)
    }

    /// Runs one conversation turn: context, completion, synthesis, replies,
    /// then history.
    async fn converse(&self, chat_id: ChatId, user_text: String) -> Result<(), DispatchError> {
        let depth = self
            .collab
            .context
            .context_depth(chat_id)
            .await
            .context(DispatchError::ContextDepth { chat_id })?;
        let context = self
            .collab
            .history
            .context_slice(chat_id, depth)
            .await
            .context(DispatchError::History { chat_id })?;

        let request = LlmRequest::new(user_text.as_str())
            .with_context(context.into_iter().map(to_llm).collect());
        let response = self
            .collab
            .completion
            .generate(&request)
            .await
            .context(DispatchError::Completion { chat_id })?;
        if response.content.is_none() {
            warn!(%chat_id, "completion degraded to fallback reply");
        }
        let answer = response.text_or(&self.replies.fallback);

        let audio = self
            .collab
            .synthesizer
            .synthesize(&answer)
            .await
            .context(DispatchError::Synthesis { chat_id })?;

        self.send_text(chat_id, &Replies::turn_reply(&user_text, &answer))
            .await?;
        self.collab
            .sender
            .send_voice(chat_id, audio)
            .await
            .context(DispatchError::Delivery {
                chat_id,
                what: "voice reply",
            })?;

        let history = self
            .collab
            .history
            .append_turn(chat_id, Turn::new(user_text, answer))
            .await
            .context(DispatchError::History { chat_id })?;
        debug!(%chat_id, depth, turns = history.len(), "turn recorded");
        Ok(())
    }

    async fn on_command(&self, chat_id: ChatId, text: &str) -> Result<(), DispatchError> {
        match Command::parse(text) {
            Command::OpenMenu => {
                self.collab
                    .sender
                    .send_menu(chat_id, &self.replies.menu_prompt, &main_menu())
                    .await
                    .context(DispatchError::Delivery {
                        chat_id,
                        what: "menu",
                    })?;
                Ok(())
            }
            Command::Invalid => {
                debug!(%chat_id, command = text, "unrecognized command");
                self.send_text(chat_id, &self.replies.invalid_operation).await
            }
        }
    }

    async fn on_callback(
        &self,
        chat_id: ChatId,
        callback_id: &CallbackId,
        data: &str,
    ) -> Result<(), DispatchError> {
        match Callback::parse(data) {
            Callback::ShowContext => {
                let depth = self
                    .collab
                    .context
                    .context_depth(chat_id)
                    .await
                    .context(DispatchError::ContextDepth { chat_id })?;
                self.collab
                    .sender
                    .send_menu(chat_id, &self.replies.context_prompt(depth), &depth_menu())
                    .await
                    .context(DispatchError::Delivery {
                        chat_id,
                        what: "depth menu",
                    })?;
            }
            Callback::Tools => {
                self.send_text(chat_id, &self.replies.under_development)
                    .await?;
            }
            Callback::ClearHistory => {
                let cleared = self
                    .collab
                    .history
                    .clear_history(chat_id)
                    .await
                    .context(DispatchError::History { chat_id })?;
                info!(%chat_id, cleared = cleared.len(), "history cleared");
                self.send_text(chat_id, &self.replies.cleared_history(&cleared))
                    .await?;
            }
            Callback::SetDepth(depth) => {
                self.collab
                    .context
                    .set_context_depth(chat_id, depth)
                    .await
                    .context(DispatchError::ContextDepth { chat_id })?;
                info!(%chat_id, depth, "context depth set");
                self.send_text(chat_id, &self.replies.depth_set(depth)).await?;
            }
            Callback::Unrecognized => {
                debug!(%chat_id, data, "unrecognized callback");
            }
        }

        self.collab
            .sender
            .answer_callback(callback_id)
            .await
            .context(DispatchError::Delivery {
                chat_id,
                what: "callback answer",
            })?;
        Ok(())
    }

    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<(), DispatchError> {
        self.collab
            .sender
            .send_text(chat_id, text)
            .await
            .context(DispatchError::Delivery {
                chat_id,
                what: "text reply",
            })?;
        Ok(())
    }
}

fn to_llm(message: Message) -> LlmMessage {
    use voice_relay_conversation::MessageRole;

    match message.role {
        MessageRole::User => LlmMessage::user(message.content),
        MessageRole::Assistant => LlmMessage::assistant(message.content),
    }
}
