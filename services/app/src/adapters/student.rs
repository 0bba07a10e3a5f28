//! services/app/src/adapters/student.rs
//!
//! The student-side backend adapter: enrolled courses, module trees,
//! classmates, enrollment by access code, and the onboarding profile.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use learnx_core::domain::{Classmate, Course, FileSummary, Module, OnboardingAnswers, UserProfile};
use learnx_core::ports::{PortResult, StudentBackend};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::adapters::http::Backend;

/// An adapter that implements the `StudentBackend` port.
#[derive(Clone)]
pub struct HttpStudentBackend {
    backend: Backend,
}

impl HttpStudentBackend {
    pub fn new(backend: Backend) -> Self {
        Self { backend }
    }
}

//=========================================================================================
// "Impure" Wire Record Structs
//=========================================================================================

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CourseRecord {
    id: Uuid,
    title: String,
    code: String,
    #[serde(default)]
    term: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    published: bool,
    #[serde(default)]
    last_updated: Option<DateTime<Utc>>,
}

impl CourseRecord {
    fn to_domain(self) -> Course {
        Course {
            id: self.id,
            title: self.title,
            code: self.code,
            term: self.term,
            description: self.description.unwrap_or_default(),
            published: self.published,
            access_code: None,
            students: None,
            last_updated: self.last_updated,
        }
    }
}

#[derive(Deserialize)]
struct ModuleRecord {
    id: Uuid,
    title: String,
}

#[derive(Deserialize)]
struct FileRecord {
    id: Uuid,
    title: String,
    #[serde(default)]
    filename: String,
}

#[derive(Deserialize)]
struct ClassmateRecord {
    name: String,
}

#[derive(Serialize)]
struct EnrollBody<'a> {
    #[serde(rename = "accessCode")]
    access_code: &'a str,
}

// The profile payload mixes conventions: snake_case at the top level with
// camelCase inside the answers object. Reproduced as the backend expects it.
#[derive(Serialize, Deserialize, Default)]
struct OnboardAnswersRecord {
    #[serde(default)]
    job: String,
    #[serde(default)]
    traits: String,
    #[serde(default, rename = "learningStyle")]
    learning_style: String,
    #[serde(default)]
    depth: String,
    #[serde(default)]
    topics: String,
    #[serde(default)]
    interests: String,
    #[serde(default)]
    schedule: String,
}

#[derive(Serialize, Deserialize, Default)]
struct ProfileRecord {
    #[serde(default)]
    name: String,
    #[serde(default)]
    onboard_answers: OnboardAnswersRecord,
    #[serde(default)]
    want_quizzes: bool,
}

// The legacy endpoint returns the answers as a positional array:
// [job, traits, learningStyle, depth, topics, interests, schedule].
#[derive(Deserialize, Default)]
struct OnboardingRecord {
    #[serde(default)]
    name: String,
    #[serde(default)]
    answers: Vec<String>,
    #[serde(default)]
    quizzes: bool,
}

impl OnboardingRecord {
    fn to_domain(self) -> UserProfile {
        // Short arrays fill the remaining answers with empty strings.
        let mut answers = self.answers.into_iter();
        let mut next = move || answers.next().unwrap_or_default();
        UserProfile {
            name: self.name,
            answers: OnboardingAnswers {
                job: next(),
                traits: next(),
                learning_style: next(),
                depth: next(),
                topics: next(),
                interests: next(),
                schedule: next(),
            },
            want_quizzes: self.quizzes,
        }
    }
}

impl ProfileRecord {
    fn from_domain(profile: &UserProfile) -> Self {
        Self {
            name: profile.name.clone(),
            onboard_answers: OnboardAnswersRecord {
                job: profile.answers.job.clone(),
                traits: profile.answers.traits.clone(),
                learning_style: profile.answers.learning_style.clone(),
                depth: profile.answers.depth.clone(),
                topics: profile.answers.topics.clone(),
                interests: profile.answers.interests.clone(),
                schedule: profile.answers.schedule.clone(),
            },
            want_quizzes: profile.want_quizzes,
        }
    }

    fn to_domain(self) -> UserProfile {
        UserProfile {
            name: self.name,
            answers: OnboardingAnswers {
                job: self.onboard_answers.job,
                traits: self.onboard_answers.traits,
                learning_style: self.onboard_answers.learning_style,
                depth: self.onboard_answers.depth,
                topics: self.onboard_answers.topics,
                interests: self.onboard_answers.interests,
                schedule: self.onboard_answers.schedule,
            },
            want_quizzes: self.want_quizzes,
        }
    }
}

//=========================================================================================
// `StudentBackend` Trait Implementation
//=========================================================================================

#[async_trait]
impl StudentBackend for HttpStudentBackend {
    async fn list_courses(&self) -> PortResult<Vec<Course>> {
        let records: Vec<CourseRecord> = self.backend.get_list("/student/courses", None).await?;
        Ok(records.into_iter().map(CourseRecord::to_domain).collect())
    }

    async fn list_modules(&self, course_id: Uuid) -> PortResult<Vec<Module>> {
        let records: Vec<ModuleRecord> = self
            .backend
            .get_list(
                &format!("/student/courses/{}/modules", course_id),
                Some("modules"),
            )
            .await?;
        Ok(records
            .into_iter()
            .map(|r| Module {
                id: r.id,
                title: r.title,
            })
            .collect())
    }

    async fn list_classmates(&self, course_id: Uuid) -> PortResult<Vec<Classmate>> {
        let records: Vec<ClassmateRecord> = self
            .backend
            .get_list(&format!("/student/courses/{}/classmates", course_id), None)
            .await?;
        Ok(records
            .into_iter()
            .map(|r| Classmate { name: r.name })
            .collect())
    }

    async fn list_files(&self, module_id: Uuid) -> PortResult<Vec<FileSummary>> {
        let records: Vec<FileRecord> = self
            .backend
            .get_list(&format!("/student/modules/{}/files", module_id), None)
            .await?;
        Ok(records
            .into_iter()
            .map(|r| FileSummary {
                id: r.id,
                title: r.title,
                filename: r.filename,
            })
            .collect())
    }

    async fn file_content(&self, file_id: Uuid) -> PortResult<String> {
        self.backend
            .get_text(&format!("/student/files/{}/content", file_id))
            .await
    }

    async fn enroll(&self, access_code: &str) -> PortResult<()> {
        self.backend
            .post_unit("/student/enrollments", &EnrollBody { access_code })
            .await
    }

    async fn fetch_profile(&self) -> PortResult<UserProfile> {
        let record: ProfileRecord = self.backend.get_json("/student/profile").await?;
        Ok(record.to_domain())
    }

    async fn save_profile(&self, profile: &UserProfile) -> PortResult<()> {
        self.backend
            .post_unit("/student/profile", &ProfileRecord::from_domain(profile))
            .await
    }

    async fn update_profile(&self, profile: &UserProfile) -> PortResult<()> {
        self.backend
            .patch_unit("/student/profile", &ProfileRecord::from_domain(profile))
            .await
    }

    async fn fetch_onboarding(&self) -> PortResult<UserProfile> {
        let record: OnboardingRecord = self.backend.get_json("/onboarding").await?;
        Ok(record.to_domain())
    }
}
