//! crates/learnx_core/src/domain.rs
//!
//! Defines the pure, core data structures for the client.
//! These structs are independent of the wire format; the HTTP adapters own
//! the serde record types and map them into these.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Coarse permission class resolved from the backend's role descriptor.
///
/// Always consumed through exhaustive matching; any role string the client
/// does not recognize maps to `Unknown`, which renders the loading
/// placeholder and nothing else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Student,
    Instructor,
    Admin,
    Unknown,
}

impl Role {
    /// Parses the backend's role string. Unrecognized values are `Unknown`.
    pub fn parse(s: &str) -> Self {
        match s {
            "student" => Role::Student,
            "instructor" => Role::Instructor,
            "admin" => Role::Admin,
            _ => Role::Unknown,
        }
    }
}

/// The signed-in user as reported by `GET /me`.
#[derive(Debug, Clone)]
pub struct Identity {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
}

/// A new account: the identity-provider credential plus the fields the
/// backend keeps. `name` and `university` are instructor-only.
#[derive(Debug, Clone)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub id_token: String,
    pub name: Option<String>,
    pub university: Option<String>,
}

/// Free-text onboarding answers collected at registration and used to
/// personalize generated content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OnboardingAnswers {
    pub job: String,
    pub traits: String,
    pub learning_style: String,
    pub depth: String,
    pub topics: String,
    pub interests: String,
    pub schedule: String,
}

/// A student's profile: display name plus onboarding answers.
#[derive(Debug, Clone, Default)]
pub struct UserProfile {
    pub name: String,
    pub answers: OnboardingAnswers,
    pub want_quizzes: bool,
}

/// A course as listed on a dashboard. Instructors own courses; students hold
/// an enrollment reference to them.
#[derive(Debug, Clone)]
pub struct Course {
    pub id: Uuid,
    pub title: String,
    pub code: String,
    pub term: String,
    pub description: String,
    pub published: bool,
    /// Shared secret students submit to enroll. Only present on
    /// instructor-owned rows.
    pub access_code: Option<String>,
    pub students: Option<u32>,
    pub last_updated: Option<DateTime<Utc>>,
}

/// Fields for creating or updating a course.
#[derive(Debug, Clone, Default)]
pub struct CourseDraft {
    pub title: String,
    pub description: String,
    pub code: String,
    pub term: String,
    pub published: bool,
}

/// The detail view fetched when an instructor opens a course; merged over
/// the summary row.
#[derive(Debug, Clone)]
pub struct CourseDetails {
    pub description: String,
    pub access_code: String,
    pub students: u32,
    pub published: bool,
    pub last_updated: Option<DateTime<Utc>>,
}

/// A named subdivision of a course containing uploaded files. Ordered as
/// returned by the backend; the order is not contractual.
#[derive(Debug, Clone)]
pub struct Module {
    pub id: Uuid,
    pub title: String,
}

/// An uploaded file. The client never holds the binary content beyond an
/// upload buffer or a transient preview.
#[derive(Debug, Clone)]
pub struct FileSummary {
    pub id: Uuid,
    pub title: String,
    pub filename: String,
}

/// A student enrolled in an instructor's course.
#[derive(Debug, Clone)]
pub struct EnrolledStudent {
    pub user_id: Uuid,
    pub enrollment_id: Uuid,
    pub name: String,
    pub email: String,
    pub enrolled_at: Option<DateTime<Utc>>,
}

/// A fellow student, as visible on the student side. Name only.
#[derive(Debug, Clone)]
pub struct Classmate {
    pub name: String,
}

/// Who authored a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        }
    }
}

/// Client-side delivery state of an outgoing chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Appended optimistically; the request has not resolved yet.
    Pending,
    /// The backend acknowledged the round trip.
    Confirmed,
    /// The request failed; the message stays visible for retry or removal.
    Failed,
}

/// One entry of a chat transcript, with the client-side bookkeeping the
/// panel needs (delivery state and the per-conversation sequence number).
#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
    pub delivery: Delivery,
    pub seq: u64,
}

impl ChatMessage {
    /// A message that came back from the server transcript and is therefore
    /// already confirmed.
    pub fn confirmed(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            delivery: Delivery::Confirmed,
            seq: 0,
        }
    }
}

/// The backend's reply to one chat round trip.
#[derive(Debug, Clone)]
pub struct ChatReply {
    pub assistant: String,
    /// Server-assigned chat id, reported on every reply and cached by the
    /// client on first creation.
    pub chat_id: Option<Uuid>,
}

/// A learner-tailored variant of an uploaded file.
#[derive(Debug, Clone)]
pub struct PersonalizedFile {
    pub id: Uuid,
    pub original_file_id: Uuid,
    pub title: String,
}

/// An editing suggestion fetched for a document.
#[derive(Debug, Clone)]
pub struct Suggestion {
    pub id: Uuid,
    pub original_text: String,
    pub suggested_text: String,
}
