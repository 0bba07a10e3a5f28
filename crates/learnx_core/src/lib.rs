pub mod document;
pub mod domain;
pub mod ports;

pub use document::{find_first, project, replace_span, DocNode, LocatedSuggestion, Span};
pub use domain::{
    ChatMessage, ChatReply, ChatRole, Classmate, Course, CourseDetails, CourseDraft, Delivery,
    EnrolledStudent, FileSummary, Identity, Module, OnboardingAnswers, PersonalizedFile,
    Registration, Role, Suggestion, UserProfile,
};
pub use ports::{
    ChatIdCache, ChatService, IdentityService, InstructorBackend, PersonalizationService,
    PortError, PortResult, StudentBackend, SuggestionService,
};
