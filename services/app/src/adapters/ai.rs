//! services/app/src/adapters/ai.rs
//!
//! Adapters for the AI-backed endpoints: the tutoring chat, the one-shot
//! file personalization, and document suggestions. The AI itself lives
//! behind the backend; these are plain HTTP round trips.

use async_trait::async_trait;
use learnx_core::domain::{ChatReply, ChatRole, PersonalizedFile, Suggestion, UserProfile};
use learnx_core::ports::{
    ChatService, PersonalizationService, PortError, PortResult, SuggestionService,
};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::adapters::http::Backend;

//=========================================================================================
// Chat
//=========================================================================================

/// An adapter that implements `ChatService` against `POST /ai-chat`.
#[derive(Clone)]
pub struct HttpChatService {
    backend: Backend,
}

impl HttpChatService {
    pub fn new(backend: Backend) -> Self {
        Self { backend }
    }
}

#[derive(Serialize)]
struct OutgoingMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    id: Option<Uuid>,
    #[serde(rename = "userMessage")]
    user_message: &'a str,
    messages: Vec<OutgoingMessage<'a>>,
    /// Attached only on the turn that creates the chat.
    #[serde(rename = "fileId", skip_serializing_if = "Option::is_none")]
    file_id: Option<Uuid>,
}

#[derive(Deserialize)]
struct ChatReplyRecord {
    assistant: String,
    #[serde(rename = "chatId", default)]
    chat_id: Option<Uuid>,
}

#[derive(Deserialize)]
struct TranscriptRecord {
    role: String,
    content: String,
}

fn parse_chat_role(role: &str) -> ChatRole {
    match role {
        "assistant" => ChatRole::Assistant,
        _ => ChatRole::User,
    }
}

#[async_trait]
impl ChatService for HttpChatService {
    async fn send(
        &self,
        chat_id: Option<Uuid>,
        user_message: &str,
        history: &[(ChatRole, String)],
        file_id: Option<Uuid>,
    ) -> PortResult<ChatReply> {
        let request = ChatRequest {
            id: chat_id,
            user_message,
            messages: history
                .iter()
                .map(|(role, content)| OutgoingMessage {
                    role: role.as_str(),
                    content,
                })
                .collect(),
            file_id,
        };
        let record: ChatReplyRecord = self.backend.post_json("/ai-chat", &request).await?;
        Ok(ChatReply {
            assistant: record.assistant,
            chat_id: record.chat_id,
        })
    }

    async fn fetch_messages(&self, chat_id: Uuid) -> PortResult<Vec<(ChatRole, String)>> {
        // A stale cached id comes back as `{"error": ...}`; surface it as
        // NotFound so the panel clears its cache and starts a fresh chat.
        let body = self
            .backend
            .get_text(&format!("/student/chats/{}/messages", chat_id))
            .await?;

        if let Ok(records) = serde_json::from_str::<Vec<TranscriptRecord>>(&body) {
            return Ok(records
                .into_iter()
                .map(|r| (parse_chat_role(&r.role), r.content))
                .collect());
        }

        #[derive(Deserialize)]
        struct ErrorBody {
            error: String,
        }
        if let Ok(err) = serde_json::from_str::<ErrorBody>(&body) {
            return Err(PortError::NotFound(err.error));
        }

        warn!(%chat_id, "unexpected transcript shape; treating as empty");
        Ok(Vec::new())
    }
}

//=========================================================================================
// Personalization
//=========================================================================================

/// An adapter that implements `PersonalizationService`.
#[derive(Clone)]
pub struct HttpPersonalizationService {
    backend: Backend,
}

impl HttpPersonalizationService {
    pub fn new(backend: Backend) -> Self {
        Self { backend }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersonalizedFileRecord {
    id: Uuid,
    original_file_id: Uuid,
    #[serde(default)]
    title: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateUserProfile<'a> {
    role: &'a str,
    traits: &'a str,
    learning_style: &'a str,
    depth: &'a str,
    interests: &'a str,
    /// The backend calls the topics answer "personalization".
    personalization: &'a str,
    schedule: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    name: &'a str,
    message: &'static str,
    file_id: Uuid,
    user_profile: GenerateUserProfile<'a>,
}

#[derive(Deserialize)]
struct GenerateResponse {
    id: Uuid,
    #[serde(default)]
    title: String,
}

#[async_trait]
impl PersonalizationService for HttpPersonalizationService {
    async fn list_personalized(&self) -> PortResult<Vec<PersonalizedFile>> {
        let records: Vec<PersonalizedFileRecord> = self
            .backend
            .get_list("/student/personalized-files", None)
            .await?;
        Ok(records
            .into_iter()
            .map(|r| PersonalizedFile {
                id: r.id,
                original_file_id: r.original_file_id,
                title: r.title,
            })
            .collect())
    }

    async fn fetch_personalized(&self, id: Uuid) -> PortResult<PersonalizedFile> {
        let record: PersonalizedFileRecord = self
            .backend
            .get_json(&format!("/student/personalized-files/{}", id))
            .await?;
        Ok(PersonalizedFile {
            id: record.id,
            original_file_id: record.original_file_id,
            title: record.title,
        })
    }

    async fn generate(
        &self,
        profile: &UserProfile,
        file_id: Uuid,
    ) -> PortResult<PersonalizedFile> {
        let answers = &profile.answers;
        let request = GenerateRequest {
            name: &profile.name,
            message: "personalize this PDF",
            file_id,
            user_profile: GenerateUserProfile {
                role: &answers.job,
                traits: &answers.traits,
                learning_style: &answers.learning_style,
                depth: &answers.depth,
                interests: &answers.interests,
                personalization: &answers.topics,
                schedule: &answers.schedule,
            },
        };
        let response: GenerateResponse = self
            .backend
            .post_json("/generatepersonalizedfilecontent", &request)
            .await?;
        Ok(PersonalizedFile {
            id: response.id,
            original_file_id: file_id,
            title: response.title,
        })
    }
}

//=========================================================================================
// Suggestions
//=========================================================================================

/// An adapter that implements `SuggestionService`.
#[derive(Clone)]
pub struct HttpSuggestionService {
    backend: Backend,
}

impl HttpSuggestionService {
    pub fn new(backend: Backend) -> Self {
        Self { backend }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SuggestionRecord {
    id: Uuid,
    original_text: String,
    suggested_text: String,
}

#[async_trait]
impl SuggestionService for HttpSuggestionService {
    async fn fetch_suggestions(&self, document_id: Uuid) -> PortResult<Vec<Suggestion>> {
        let records: Vec<SuggestionRecord> = self
            .backend
            .get_list(&format!("/suggestions?documentId={}", document_id), None)
            .await?;
        Ok(records
            .into_iter()
            .map(|r| Suggestion {
                id: r.id,
                original_text: r.original_text,
                suggested_text: r.suggested_text,
            })
            .collect())
    }
}
