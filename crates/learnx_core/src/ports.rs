//! crates/learnx_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the client's core logic.
//! These traits form the boundary of the hexagonal architecture: the
//! view-models depend only on them, and the HTTP / filesystem adapters in
//! the app service provide the concrete implementations.

use async_trait::async_trait;
use bytes::Bytes;
use uuid::Uuid;

use crate::domain::{
    ChatReply, ChatRole, Classmate, Course, CourseDetails, CourseDraft, EnrolledStudent,
    FileSummary, Identity, Module, PersonalizedFile, Registration, Role, Suggestion, UserProfile,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// The error taxonomy every port operation reports.
///
/// `Unauthorized` means the session is missing or expired and the caller
/// must route to the login view. `Api` is a business/validation rejection
/// carrying the backend's message for the user. `Transport` is a network
/// failure; it is logged and surfaced generically, never retried.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Request rejected ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Transport failure: {0}")]
    Transport(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// Session establishment and identity resolution.
#[async_trait]
pub trait IdentityService: Send + Sync {
    /// Creates the backend's account record for a new user. Only the
    /// `Student` and `Instructor` roles can register.
    async fn register(&self, role: Role, registration: &Registration) -> PortResult<()>;

    /// Exchanges an identity-provider credential for the backend session
    /// cookie.
    async fn session_login(&self, id_token: &str) -> PortResult<()>;

    /// Resolves the signed-in user. Fails with `Unauthorized` when no valid
    /// session exists.
    async fn fetch_me(&self) -> PortResult<Identity>;

    /// Destroys the backend session.
    async fn sign_out(&self) -> PortResult<()>;
}

/// Everything the instructor dashboard talks to.
#[async_trait]
pub trait InstructorBackend: Send + Sync {
    // --- Courses ---
    async fn list_courses(&self) -> PortResult<Vec<Course>>;
    async fn create_course(&self, draft: &CourseDraft) -> PortResult<()>;
    async fn update_course(&self, course_id: Uuid, draft: &CourseDraft) -> PortResult<()>;
    async fn delete_course(&self, course_id: Uuid) -> PortResult<()>;
    async fn course_details(&self, course_id: Uuid) -> PortResult<CourseDetails>;

    // --- Modules & Files ---
    async fn list_modules(&self, course_id: Uuid) -> PortResult<Vec<Module>>;
    async fn create_module(&self, course_id: Uuid, title: &str) -> PortResult<()>;
    async fn delete_module(&self, module_id: Uuid) -> PortResult<()>;
    async fn list_files(&self, module_id: Uuid) -> PortResult<Vec<FileSummary>>;
    async fn upload_file(&self, module_id: Uuid, filename: &str, content: Bytes)
        -> PortResult<()>;
    async fn delete_file(&self, file_id: Uuid) -> PortResult<()>;

    /// Fetches a file's content for a transient preview; never retained.
    async fn file_content(&self, file_id: Uuid) -> PortResult<String>;

    // --- Enrollment ---
    async fn list_students(&self, course_id: Uuid) -> PortResult<Vec<EnrolledStudent>>;
    async fn delete_enrollment(&self, enrollment_id: Uuid) -> PortResult<()>;
}

/// Everything the student dashboard talks to.
#[async_trait]
pub trait StudentBackend: Send + Sync {
    async fn list_courses(&self) -> PortResult<Vec<Course>>;
    async fn list_modules(&self, course_id: Uuid) -> PortResult<Vec<Module>>;
    async fn list_classmates(&self, course_id: Uuid) -> PortResult<Vec<Classmate>>;
    async fn list_files(&self, module_id: Uuid) -> PortResult<Vec<FileSummary>>;

    /// Fetches a file's content for a transient preview; never retained.
    async fn file_content(&self, file_id: Uuid) -> PortResult<String>;

    /// Creates an enrollment from an access code. Deleting it later removes
    /// the link, not the course.
    async fn enroll(&self, access_code: &str) -> PortResult<()>;

    // --- Profile / onboarding ---
    async fn fetch_profile(&self) -> PortResult<UserProfile>;
    async fn save_profile(&self, profile: &UserProfile) -> PortResult<()>;
    async fn update_profile(&self, profile: &UserProfile) -> PortResult<()>;

    /// The same answers `fetch_profile` returns, from the legacy
    /// positional-array endpoint. Kept as a fallback profile source.
    async fn fetch_onboarding(&self) -> PortResult<UserProfile>;
}

/// The AI tutoring chat endpoint.
#[async_trait]
pub trait ChatService: Send + Sync {
    /// One chat round trip. `chat_id` is `None` for the first message of a
    /// new chat; `file_id` is attached only on that creating turn.
    async fn send(
        &self,
        chat_id: Option<Uuid>,
        user_message: &str,
        history: &[(ChatRole, String)],
        file_id: Option<Uuid>,
    ) -> PortResult<ChatReply>;

    /// Loads the stored transcript of an existing chat.
    async fn fetch_messages(&self, chat_id: Uuid) -> PortResult<Vec<(ChatRole, String)>>;
}

/// The one-shot file personalization endpoint.
#[async_trait]
pub trait PersonalizationService: Send + Sync {
    async fn list_personalized(&self) -> PortResult<Vec<PersonalizedFile>>;
    async fn fetch_personalized(&self, id: Uuid) -> PortResult<PersonalizedFile>;
    async fn generate(&self, profile: &UserProfile, file_id: Uuid)
        -> PortResult<PersonalizedFile>;
}

/// Editing suggestions for a structured document.
#[async_trait]
pub trait SuggestionService: Send + Sync {
    async fn fetch_suggestions(&self, document_id: Uuid) -> PortResult<Vec<Suggestion>>;
}

/// Local persistent storage for the chat id, keyed by user id. The browser
/// client kept this in localStorage; here it is a small file. Writes are
/// idempotent and single-writer per session, so no locking is required.
#[async_trait]
pub trait ChatIdCache: Send + Sync {
    async fn load(&self, user_id: Uuid) -> PortResult<Option<Uuid>>;
    async fn store(&self, user_id: Uuid, chat_id: Uuid) -> PortResult<()>;
    async fn clear(&self, user_id: Uuid) -> PortResult<()>;
}
