pub mod chat;
pub mod instructor;
pub mod notify;
pub mod personalize;
pub mod router;
pub mod session;
pub mod student;
pub mod suggestions;

// Re-export the pieces the binary wires together.
pub use chat::ChatPanel;
pub use instructor::InstructorDashboard;
pub use notify::{Toast, ToastLevel, Toasts};
pub use personalize::{PersonalizeFlow, PersonalizeState};
pub use router::DashboardView;
pub use session::{AuthProvider, AuthState, Route};
pub use student::StudentDashboard;
pub use suggestions::SuggestionOverlay;
