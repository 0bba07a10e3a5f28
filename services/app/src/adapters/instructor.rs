//! services/app/src/adapters/instructor.rs
//!
//! The instructor-side backend adapter: the concrete implementation of the
//! `InstructorBackend` port over the `/instructor/...` HTTP API. Owns the
//! wire record types and maps them into domain structs.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use learnx_core::domain::{Course, CourseDetails, CourseDraft, EnrolledStudent, FileSummary, Module};
use learnx_core::ports::{InstructorBackend, PortResult};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::adapters::http::Backend;

/// An adapter that implements the `InstructorBackend` port.
#[derive(Clone)]
pub struct HttpInstructorBackend {
    backend: Backend,
}

impl HttpInstructorBackend {
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
    access_code: Option<String>,
    #[serde(default)]
    students: Option<u32>,
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
            access_code: self.access_code,
            students: self.students,
            last_updated: self.last_updated,
        }
    }
}

#[derive(Serialize)]
struct CourseDraftBody<'a> {
    title: &'a str,
    description: &'a str,
    code: &'a str,
    term: &'a str,
    published: bool,
}

impl<'a> CourseDraftBody<'a> {
    fn from_domain(draft: &'a CourseDraft) -> Self {
        Self {
            title: &draft.title,
            description: &draft.description,
            code: &draft.code,
            term: &draft.term,
            published: draft.published,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CourseDetailsRecord {
    #[serde(default)]
    description: String,
    access_code: String,
    students: u32,
    #[serde(default)]
    published: bool,
    #[serde(default)]
    last_updated: Option<DateTime<Utc>>,
}

impl CourseDetailsRecord {
    fn to_domain(self) -> CourseDetails {
        CourseDetails {
            description: self.description,
            access_code: self.access_code,
            students: self.students,
            published: self.published,
            last_updated: self.last_updated,
        }
    }
}

#[derive(Deserialize)]
struct ModuleRecord {
    id: Uuid,
    title: String,
}

impl ModuleRecord {
    fn to_domain(self) -> Module {
        Module {
            id: self.id,
            title: self.title,
        }
    }
}

#[derive(Deserialize)]
struct FileRecord {
    id: Uuid,
    title: String,
    #[serde(default)]
    filename: String,
}

impl FileRecord {
    fn to_domain(self) -> FileSummary {
        FileSummary {
            id: self.id,
            title: self.title,
            filename: self.filename,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StudentRecord {
    user_id: Uuid,
    enrollment_id: Uuid,
    name: String,
    email: String,
    #[serde(default)]
    enrolled_at: Option<DateTime<Utc>>,
}

impl StudentRecord {
    fn to_domain(self) -> EnrolledStudent {
        EnrolledStudent {
            user_id: self.user_id,
            enrollment_id: self.enrollment_id,
            name: self.name,
            email: self.email,
            enrolled_at: self.enrolled_at,
        }
    }
}

//=========================================================================================
// `InstructorBackend` Trait Implementation
//=========================================================================================

#[async_trait]
impl InstructorBackend for HttpInstructorBackend {
    async fn list_courses(&self) -> PortResult<Vec<Course>> {
        let records: Vec<CourseRecord> = self.backend.get_list("/instructor/courses", None).await?;
        Ok(records.into_iter().map(CourseRecord::to_domain).collect())
    }

    async fn create_course(&self, draft: &CourseDraft) -> PortResult<()> {
        self.backend
            .post_unit("/instructor/courses", &CourseDraftBody::from_domain(draft))
            .await
    }

    async fn update_course(&self, course_id: Uuid, draft: &CourseDraft) -> PortResult<()> {
        self.backend
            .patch_unit(
                &format!("/instructor/courses/{}", course_id),
                &CourseDraftBody::from_domain(draft),
            )
            .await
    }

    async fn delete_course(&self, course_id: Uuid) -> PortResult<()> {
        self.backend
            .delete_unit(&format!("/instructor/courses/{}", course_id))
            .await
    }

    async fn course_details(&self, course_id: Uuid) -> PortResult<CourseDetails> {
        let record: CourseDetailsRecord = self
            .backend
            .get_json(&format!("/instructor/courses/{}/details", course_id))
            .await?;
        Ok(record.to_domain())
    }

    async fn list_modules(&self, course_id: Uuid) -> PortResult<Vec<Module>> {
        let records: Vec<ModuleRecord> = self
            .backend
            .get_list(
                &format!("/instructor/courses/{}/modules", course_id),
                Some("modules"),
            )
            .await?;
        Ok(records.into_iter().map(ModuleRecord::to_domain).collect())
    }

    async fn create_module(&self, course_id: Uuid, title: &str) -> PortResult<()> {
        self.backend
            .post_unit(
                &format!("/instructor/courses/{}/modules", course_id),
                &serde_json::json!({ "title": title }),
            )
            .await
    }

    async fn delete_module(&self, module_id: Uuid) -> PortResult<()> {
        self.backend
            .delete_unit(&format!("/instructor/modules/{}", module_id))
            .await
    }

    async fn list_files(&self, module_id: Uuid) -> PortResult<Vec<FileSummary>> {
        let records: Vec<FileRecord> = self
            .backend
            .get_list(&format!("/instructor/modules/{}/files", module_id), None)
            .await?;
        Ok(records.into_iter().map(FileRecord::to_domain).collect())
    }

    async fn upload_file(
        &self,
        module_id: Uuid,
        filename: &str,
        content: Bytes,
    ) -> PortResult<()> {
        let part = reqwest::multipart::Part::bytes(content.to_vec())
            .file_name(filename.to_string());
        let form = reqwest::multipart::Form::new().part("file", part);
        self.backend
            .post_multipart(&format!("/instructor/modules/{}/files", module_id), form)
            .await
    }

    async fn delete_file(&self, file_id: Uuid) -> PortResult<()> {
        self.backend
            .delete_unit(&format!("/instructor/files/{}", file_id))
            .await
    }

    async fn file_content(&self, file_id: Uuid) -> PortResult<String> {
        self.backend
            .get_text(&format!("/instructor/files/{}/content", file_id))
            .await
    }

    async fn list_students(&self, course_id: Uuid) -> PortResult<Vec<EnrolledStudent>> {
        let records: Vec<StudentRecord> = self
            .backend
            .get_list(&format!("/instructor/courses/{}/students", course_id), None)
            .await?;
        Ok(records.into_iter().map(StudentRecord::to_domain).collect())
    }

    async fn delete_enrollment(&self, enrollment_id: Uuid) -> PortResult<()> {
        self.backend
            .delete_unit(&format!("/instructor/enrollments/{}", enrollment_id))
            .await
    }
}
