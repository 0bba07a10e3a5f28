pub mod ai;
pub mod chat_cache;
pub mod http;
pub mod identity;
pub mod instructor;
pub mod student;

pub use ai::{HttpChatService, HttpPersonalizationService, HttpSuggestionService};
pub use chat_cache::JsonFileChatIdCache;
pub use http::Backend;
pub use identity::HttpIdentityService;
pub use instructor::HttpInstructorBackend;
pub use student::HttpStudentBackend;
