//! services/app/src/app/chat.rs
//!
//! The AI tutoring chat panel: one chat per user, its id cached locally so
//! the transcript survives a reload. Sends are optimistic: the user's
//! message appears immediately as `Pending` and is marked `Confirmed` or
//! `Failed` when the round trip resolves. Each send carries a monotonic
//! sequence number; a response that resolves after a newer one has been
//! accepted is discarded instead of appended out of order.

use std::sync::Arc;

use learnx_core::domain::{ChatMessage, ChatReply, ChatRole, Delivery};
use learnx_core::ports::{ChatIdCache, ChatService, PortResult};
use tracing::warn;
use uuid::Uuid;

use crate::app::notify::Toasts;

/// One prepared outgoing round trip.
struct Outgoing {
    seq: u64,
    chat_id: Option<Uuid>,
    body: String,
    history: Vec<(ChatRole, String)>,
    file_id: Option<Uuid>,
}

/// The chat panel view-model.
pub struct ChatPanel {
    chat: Arc<dyn ChatService>,
    cache: Arc<dyn ChatIdCache>,
    user_id: Uuid,
    /// The subject file, attached only on the turn that creates the chat.
    file_id: Option<Uuid>,
    pub chat_id: Option<Uuid>,
    pub messages: Vec<ChatMessage>,
    pub busy: bool,
    next_seq: u64,
    last_accepted: u64,
    pub toasts: Toasts,
}

impl ChatPanel {
    pub fn new(
        chat: Arc<dyn ChatService>,
        cache: Arc<dyn ChatIdCache>,
        user_id: Uuid,
        file_id: Option<Uuid>,
    ) -> Self {
        Self {
            chat,
            cache,
            user_id,
            file_id,
            chat_id: None,
            messages: Vec::new(),
            busy: false,
            next_seq: 0,
            last_accepted: 0,
            toasts: Toasts::default(),
        }
    }

    /// On mount: restore the cached chat id and its transcript. A stale id
    /// (the backend no longer knows it) clears the cache and starts fresh.
    pub async fn mount(&mut self) {
        let cached = match self.cache.load(self.user_id).await {
            Ok(cached) => cached,
            Err(e) => {
                warn!("could not read chat-id cache: {}", e);
                None
            }
        };
        let Some(chat_id) = cached else { return };

        match self.chat.fetch_messages(chat_id).await {
            Ok(transcript) => {
                self.chat_id = Some(chat_id);
                self.messages = transcript
                    .into_iter()
                    .map(|(role, content)| ChatMessage::confirmed(role, content))
                    .collect();
            }
            Err(e) => {
                warn!(%chat_id, "cached chat could not be loaded: {}", e);
                if let Err(e) = self.cache.clear(self.user_id).await {
                    warn!("could not clear chat-id cache: {}", e);
                }
                self.chat_id = None;
                self.messages.clear();
            }
        }
    }

    /// Sends one message: optimistic append, round trip, resolution.
    pub async fn send(&mut self, input: &str) {
        let Some(outgoing) = self.prepare(input) else {
            return;
        };
        let result = self
            .chat
            .send(
                outgoing.chat_id,
                &outgoing.body,
                &outgoing.history,
                outgoing.file_id,
            )
            .await;
        self.apply(outgoing.seq, result).await;
    }

    /// Re-sends a failed message under a fresh sequence number.
    pub async fn retry(&mut self, seq: u64) {
        let Some(ix) = self
            .messages
            .iter()
            .position(|m| m.seq == seq && m.delivery == Delivery::Failed)
        else {
            return;
        };
        let content = self.messages.remove(ix).content;
        self.send(&content).await;
    }

    /// Drops a failed message from the transcript.
    pub fn discard_failed(&mut self, seq: u64) {
        self.messages
            .retain(|m| !(m.seq == seq && m.delivery == Delivery::Failed));
    }

    /// Appends the user's message as `Pending` and captures everything the
    /// request needs. The history sent to the backend is the transcript as
    /// it stood before this message, confirmed entries only.
    fn prepare(&mut self, input: &str) -> Option<Outgoing> {
        let body = input.trim();
        if body.is_empty() {
            return None;
        }
        self.next_seq += 1;
        let seq = self.next_seq;
        let history: Vec<(ChatRole, String)> = self
            .messages
            .iter()
            .filter(|m| m.delivery == Delivery::Confirmed)
            .map(|m| (m.role, m.content.clone()))
            .collect();
        self.messages.push(ChatMessage {
            role: ChatRole::User,
            content: body.to_string(),
            delivery: Delivery::Pending,
            seq,
        });
        self.busy = true;
        let file_id = if self.chat_id.is_none() {
            self.file_id
        } else {
            None
        };
        Some(Outgoing {
            seq,
            chat_id: self.chat_id,
            body: body.to_string(),
            history,
            file_id,
        })
    }

    /// Resolves one round trip against the transcript.
    async fn apply(&mut self, seq: u64, result: PortResult<ChatReply>) {
        self.busy = false;
        match result {
            Ok(reply) => {
                if seq < self.last_accepted {
                    // Superseded: a newer round trip already landed. The
                    // user's message was delivered, but the stale reply is
                    // not appended.
                    self.mark(seq, Delivery::Confirmed);
                    return;
                }
                self.last_accepted = seq;
                self.mark(seq, Delivery::Confirmed);
                self.messages.push(ChatMessage {
                    role: ChatRole::Assistant,
                    content: reply.assistant,
                    delivery: Delivery::Confirmed,
                    seq,
                });
                if self.chat_id.is_none() {
                    if let Some(chat_id) = reply.chat_id {
                        self.chat_id = Some(chat_id);
                        if let Err(e) = self.cache.store(self.user_id, chat_id).await {
                            warn!("could not cache chat id: {}", e);
                        }
                    }
                }
            }
            Err(e) => {
                self.mark(seq, Delivery::Failed);
                self.toasts.port_error("Could not send your message.", &e);
            }
        }
    }

    fn mark(&mut self, seq: u64, delivery: Delivery) {
        if let Some(message) = self
            .messages
            .iter_mut()
            .find(|m| m.seq == seq && m.role == ChatRole::User)
        {
            message.delivery = delivery;
        }
    }
}
