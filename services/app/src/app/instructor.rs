//! services/app/src/app/instructor.rs
//!
//! The instructor dashboard view-model: the course grid, and once a course
//! is opened, its module tree, files, and enrolled students. Every state
//! here is transient and refetchable; after any mutation the affected
//! collection is re-fetched rather than patched locally.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use bytes::Bytes;
use learnx_core::domain::{Course, CourseDraft, EnrolledStudent, FileSummary, Module};
use learnx_core::ports::InstructorBackend;
use uuid::Uuid;

use crate::app::notify::Toasts;

/// The detail view of one opened course.
pub struct OpenCourse {
    pub course: Course,
    pub modules: Vec<Module>,
    /// The one expanded module, if any.
    pub expanded: Option<Uuid>,
    /// Files per module, fetched lazily on first expansion.
    pub files: HashMap<Uuid, Vec<FileSummary>>,
    pub loading_files: Option<Uuid>,
    /// Modules with an upload in flight. The flag disables the control for
    /// that module; there is no server-side lock.
    uploading: HashSet<Uuid>,
    pub students: Vec<EnrolledStudent>,
    pub loading_students: bool,
}

impl OpenCourse {
    fn new(course: Course) -> Self {
        Self {
            course,
            modules: Vec::new(),
            expanded: None,
            files: HashMap::new(),
            loading_files: None,
            uploading: HashSet::new(),
            students: Vec::new(),
            loading_students: false,
        }
    }
}

/// The instructor dashboard.
pub struct InstructorDashboard {
    api: Arc<dyn InstructorBackend>,
    pub courses: Vec<Course>,
    pub search: String,
    pub selected: Option<OpenCourse>,
    pub loading: bool,
    pub toasts: Toasts,
}

impl InstructorDashboard {
    pub fn new(api: Arc<dyn InstructorBackend>) -> Self {
        Self {
            api,
            courses: Vec::new(),
            search: String::new(),
            selected: None,
            loading: false,
            toasts: Toasts::default(),
        }
    }

    /// Fetch-on-mount: loads the course list.
    pub async fn load(&mut self) {
        self.loading = true;
        self.refetch_courses().await;
        self.loading = false;
    }

    /// Case-insensitive substring filter over title and code. All courses
    /// are held in memory; there is no pagination.
    pub fn filtered_courses(&self) -> Vec<&Course> {
        let query = self.search.to_lowercase();
        self.courses
            .iter()
            .filter(|c| {
                c.title.to_lowercase().contains(&query) || c.code.to_lowercase().contains(&query)
            })
            .collect()
    }

    pub async fn create_course(&mut self, draft: CourseDraft) {
        match self.api.create_course(&draft).await {
            Ok(()) => self.refetch_courses().await,
            Err(e) => self.toasts.port_error("Failed to create course.", &e),
        }
    }

    pub async fn update_course(&mut self, course_id: Uuid, draft: CourseDraft) {
        match self.api.update_course(course_id, &draft).await {
            Ok(()) => self.refetch_courses().await,
            Err(e) => self.toasts.port_error("Failed to update course.", &e),
        }
    }

    /// Flips the published flag via a full update, then re-fetches.
    pub async fn toggle_published(&mut self, course_id: Uuid) {
        let Some(course) = self.courses.iter().find(|c| c.id == course_id) else {
            return;
        };
        let draft = CourseDraft {
            title: course.title.clone(),
            description: course.description.clone(),
            code: course.code.clone(),
            term: course.term.clone(),
            published: !course.published,
        };
        self.update_course(course_id, draft).await;
    }

    pub async fn delete_course(&mut self, course_id: Uuid) {
        match self.api.delete_course(course_id).await {
            Ok(()) => {
                // Deleting the open course navigates back to the grid.
                if self.selected.as_ref().map(|s| s.course.id) == Some(course_id) {
                    self.selected = None;
                }
                self.refetch_courses().await;
            }
            Err(e) => self.toasts.port_error("Failed to delete course.", &e),
        }
    }

    /// Opens a course: merges the detail fetch over the summary row, then
    /// loads the module tree. A failed detail fetch still opens the course
    /// with what the summary had.
    pub async fn open_course(&mut self, course_id: Uuid) {
        let Some(course) = self.courses.iter().find(|c| c.id == course_id).cloned() else {
            return;
        };
        let mut open = OpenCourse::new(course);
        match self.api.course_details(course_id).await {
            Ok(details) => {
                open.course.description = details.description;
                open.course.access_code = Some(details.access_code);
                open.course.students = Some(details.students);
                open.course.published = details.published;
                open.course.last_updated = details.last_updated;
            }
            Err(e) => self.toasts.port_error("Failed to fetch course details.", &e),
        }
        self.selected = Some(open);
        self.refetch_modules().await;
    }

    pub fn close_course(&mut self) {
        self.selected = None;
    }

    pub async fn add_module(&mut self, title: &str) {
        if title.trim().is_empty() {
            return;
        }
        let Some(course_id) = self.selected.as_ref().map(|s| s.course.id) else {
            return;
        };
        match self.api.create_module(course_id, title.trim()).await {
            Ok(()) => self.refetch_modules().await,
            Err(e) => self.toasts.port_error("Error adding module.", &e),
        }
    }

    pub async fn delete_module(&mut self, module_id: Uuid) {
        match self.api.delete_module(module_id).await {
            Ok(()) => {
                if let Some(open) = self.selected.as_mut() {
                    open.files.remove(&module_id);
                    if open.expanded == Some(module_id) {
                        open.expanded = None;
                    }
                }
                self.refetch_modules().await;
            }
            Err(e) => self.toasts.port_error("Could not delete module.", &e),
        }
    }

    /// Expands or collapses a module; the first expansion lazily fetches
    /// its file list. An error degrades to an empty list.
    pub async fn toggle_module(&mut self, module_id: Uuid) {
        let Some(open) = self.selected.as_mut() else {
            return;
        };
        if open.expanded == Some(module_id) {
            open.expanded = None;
            return;
        }
        open.expanded = Some(module_id);
        if open.files.contains_key(&module_id) {
            return;
        }
        open.loading_files = Some(module_id);
        let result = self.api.list_files(module_id).await;
        if let Some(open) = self.selected.as_mut() {
            open.loading_files = None;
            match result {
                Ok(files) => {
                    open.files.insert(module_id, files);
                }
                Err(e) => {
                    open.files.insert(module_id, Vec::new());
                    self.toasts.port_error("Failed to fetch files.", &e);
                }
            }
        }
    }

    /// Whether an upload to this module is in flight.
    pub fn upload_busy(&self, module_id: Uuid) -> bool {
        self.selected
            .as_ref()
            .map(|s| s.uploading.contains(&module_id))
            .unwrap_or(false)
    }

    /// Marks a module busy for one upload. Returns `false` when one is
    /// already pending there; the caller must not start a second one.
    pub fn begin_upload(&mut self, module_id: Uuid) -> bool {
        match self.selected.as_mut() {
            Some(open) => open.uploading.insert(module_id),
            None => false,
        }
    }

    /// Uploads one file into a module and re-fetches that module's file
    /// list. At most one upload per module is in flight; a concurrent
    /// attempt is rejected client-side.
    pub async fn upload_file(&mut self, module_id: Uuid, filename: &str, content: Bytes) {
        if !self.begin_upload(module_id) {
            self.toasts
                .error("An upload to this module is already in progress.");
            return;
        }
        let result = self.api.upload_file(module_id, filename, content).await;
        if let Some(open) = self.selected.as_mut() {
            open.uploading.remove(&module_id);
        }
        match result {
            Ok(()) => {
                self.toasts.success("Uploaded!");
                self.refetch_files(module_id).await;
            }
            Err(e) => self.toasts.port_error("Upload failed.", &e),
        }
    }

    /// Deletes a file and re-fetches that module's list; no other module's
    /// list is touched.
    pub async fn delete_file(&mut self, file_id: Uuid, module_id: Uuid) {
        match self.api.delete_file(file_id).await {
            Ok(()) => self.refetch_files(module_id).await,
            Err(e) => self.toasts.port_error("Could not delete file.", &e),
        }
    }

    pub async fn load_students(&mut self) {
        let Some(course_id) = self.selected.as_ref().map(|s| s.course.id) else {
            return;
        };
        if let Some(open) = self.selected.as_mut() {
            open.loading_students = true;
        }
        let result = self.api.list_students(course_id).await;
        if let Some(open) = self.selected.as_mut() {
            open.loading_students = false;
            match result {
                Ok(students) => open.students = students,
                Err(e) => {
                    open.students = Vec::new();
                    self.toasts.port_error("Failed to fetch students.", &e);
                }
            }
        }
    }

    /// Removes a student's enrollment; the course itself is untouched.
    pub async fn remove_student(&mut self, enrollment_id: Uuid) {
        match self.api.delete_enrollment(enrollment_id).await {
            Ok(()) => self.load_students().await,
            Err(e) => self.toasts.port_error("Failed to remove student.", &e),
        }
    }

    async fn refetch_courses(&mut self) {
        match self.api.list_courses().await {
            Ok(courses) => self.courses = courses,
            Err(e) => self.toasts.port_error("Failed to fetch courses.", &e),
        }
    }

    async fn refetch_modules(&mut self) {
        let Some(course_id) = self.selected.as_ref().map(|s| s.course.id) else {
            return;
        };
        let result = self.api.list_modules(course_id).await;
        if let Some(open) = self.selected.as_mut() {
            match result {
                Ok(modules) => open.modules = modules,
                Err(e) => {
                    open.modules = Vec::new();
                    self.toasts.port_error("Error fetching modules.", &e);
                }
            }
        }
    }

    async fn refetch_files(&mut self, module_id: Uuid) {
        let result = self.api.list_files(module_id).await;
        if let Some(open) = self.selected.as_mut() {
            match result {
                Ok(files) => {
                    open.files.insert(module_id, files);
                }
                Err(e) => self.toasts.port_error("Failed to fetch files.", &e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use learnx_core::domain::CourseDetails;
    use learnx_core::ports::{PortError, PortResult};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeBackend {
        courses: Mutex<Vec<Course>>,
        modules: Mutex<Vec<Module>>,
        files: Mutex<HashMap<Uuid, Vec<FileSummary>>>,
        students: Mutex<Vec<EnrolledStudent>>,
        uploads: AtomicUsize,
    }

    fn course(title: &str, code: &str) -> Course {
        Course {
            id: Uuid::new_v4(),
            title: title.into(),
            code: code.into(),
            term: "Fall 2025".into(),
            description: String::new(),
            published: false,
            access_code: None,
            students: None,
            last_updated: None,
        }
    }

    fn file(title: &str) -> FileSummary {
        FileSummary {
            id: Uuid::new_v4(),
            title: title.into(),
            filename: format!("{}.pdf", title),
        }
    }

    #[async_trait]
    impl InstructorBackend for FakeBackend {
        async fn list_courses(&self) -> PortResult<Vec<Course>> {
            Ok(self.courses.lock().unwrap().clone())
        }

        async fn create_course(&self, draft: &CourseDraft) -> PortResult<()> {
            let mut c = course(&draft.title, &draft.code);
            c.published = draft.published;
            self.courses.lock().unwrap().push(c);
            Ok(())
        }

        async fn update_course(&self, course_id: Uuid, draft: &CourseDraft) -> PortResult<()> {
            let mut courses = self.courses.lock().unwrap();
            let c = courses
                .iter_mut()
                .find(|c| c.id == course_id)
                .ok_or_else(|| PortError::NotFound("course".into()))?;
            c.title = draft.title.clone();
            c.published = draft.published;
            Ok(())
        }

        async fn delete_course(&self, course_id: Uuid) -> PortResult<()> {
            self.courses.lock().unwrap().retain(|c| c.id != course_id);
            Ok(())
        }

        async fn course_details(&self, _course_id: Uuid) -> PortResult<CourseDetails> {
            Ok(CourseDetails {
                description: "about".into(),
                access_code: "ABC123".into(),
                students: 2,
                published: true,
                last_updated: None,
            })
        }

        async fn list_modules(&self, _course_id: Uuid) -> PortResult<Vec<Module>> {
            Ok(self.modules.lock().unwrap().clone())
        }

        async fn create_module(&self, _course_id: Uuid, title: &str) -> PortResult<()> {
            self.modules.lock().unwrap().push(Module {
                id: Uuid::new_v4(),
                title: title.into(),
            });
            Ok(())
        }

        async fn delete_module(&self, module_id: Uuid) -> PortResult<()> {
            self.modules.lock().unwrap().retain(|m| m.id != module_id);
            Ok(())
        }

        async fn list_files(&self, module_id: Uuid) -> PortResult<Vec<FileSummary>> {
            Ok(self
                .files
                .lock()
                .unwrap()
                .get(&module_id)
                .cloned()
                .unwrap_or_default())
        }

        async fn upload_file(
            &self,
            module_id: Uuid,
            filename: &str,
            _content: Bytes,
        ) -> PortResult<()> {
            self.uploads.fetch_add(1, Ordering::SeqCst);
            self.files
                .lock()
                .unwrap()
                .entry(module_id)
                .or_default()
                .push(file(filename));
            Ok(())
        }

        async fn delete_file(&self, file_id: Uuid) -> PortResult<()> {
            for files in self.files.lock().unwrap().values_mut() {
                files.retain(|f| f.id != file_id);
            }
            Ok(())
        }

        async fn file_content(&self, _file_id: Uuid) -> PortResult<String> {
            Ok("content".into())
        }

        async fn list_students(&self, _course_id: Uuid) -> PortResult<Vec<EnrolledStudent>> {
            Ok(self.students.lock().unwrap().clone())
        }

        async fn delete_enrollment(&self, enrollment_id: Uuid) -> PortResult<()> {
            self.students
                .lock()
                .unwrap()
                .retain(|s| s.enrollment_id != enrollment_id);
            Ok(())
        }
    }

    fn dashboard_with(courses: Vec<Course>) -> (Arc<FakeBackend>, InstructorDashboard) {
        let backend = Arc::new(FakeBackend::default());
        *backend.courses.lock().unwrap() = courses;
        let dash = InstructorDashboard::new(backend.clone());
        (backend, dash)
    }

    #[tokio::test]
    async fn search_filters_by_title_and_code_case_insensitively() {
        let (_, mut dash) = dashboard_with(vec![
            course("Finance 101", "FIN101"),
            course("Biology", "BIO200"),
            course("Philosophy of Finland", "PHI301"),
        ]);
        dash.load().await;

        dash.search = "fin".into();
        let titles: Vec<_> = dash.filtered_courses().iter().map(|c| &c.title).collect();
        assert_eq!(titles, ["Finance 101", "Philosophy of Finland"]);

        dash.search = "bio200".into();
        assert_eq!(dash.filtered_courses().len(), 1);

        dash.search.clear();
        assert_eq!(dash.filtered_courses().len(), 3);
    }

    #[tokio::test]
    async fn creating_a_course_refetches_and_lists_it_exactly_once() {
        let (_, mut dash) = dashboard_with(vec![course("Biology", "BIO200")]);
        dash.load().await;

        dash.create_course(CourseDraft {
            title: "Finance 101".into(),
            code: "FIN101".into(),
            ..Default::default()
        })
        .await;

        let count = dash
            .courses
            .iter()
            .filter(|c| c.title == "Finance 101")
            .count();
        assert_eq!(count, 1);
        assert_eq!(dash.courses.len(), 2);
    }

    #[tokio::test]
    async fn deleting_a_file_only_touches_its_module() {
        let module_a = Uuid::new_v4();
        let module_b = Uuid::new_v4();
        let doomed = file("doomed");
        let doomed_id = doomed.id;

        let (backend, mut dash) = dashboard_with(vec![course("Finance 101", "FIN101")]);
        backend
            .files
            .lock()
            .unwrap()
            .extend([(module_a, vec![doomed, file("kept")]), (module_b, vec![file("other")])]);
        dash.load().await;
        let course_id = dash.courses[0].id;
        dash.open_course(course_id).await;
        dash.toggle_module(module_a).await;
        dash.selected.as_mut().unwrap().expanded = None;
        dash.toggle_module(module_b).await;

        dash.delete_file(doomed_id, module_a).await;

        let open = dash.selected.as_ref().unwrap();
        let module_a_ids: Vec<_> = open.files[&module_a].iter().map(|f| f.id).collect();
        assert!(!module_a_ids.contains(&doomed_id));
        assert_eq!(open.files[&module_a].len(), 1);
        assert_eq!(open.files[&module_b].len(), 1);
    }

    #[tokio::test]
    async fn a_second_upload_to_a_busy_module_is_rejected() {
        let module_id = Uuid::new_v4();
        let (backend, mut dash) = dashboard_with(vec![course("Finance 101", "FIN101")]);
        dash.load().await;
        let course_id = dash.courses[0].id;
        dash.open_course(course_id).await;

        // First upload claims the module.
        assert!(dash.begin_upload(module_id));
        assert!(dash.upload_busy(module_id));

        // A concurrent attempt is refused and never reaches the backend.
        dash.upload_file(module_id, "notes.pdf", Bytes::from_static(b"%PDF"))
            .await;
        assert_eq!(backend.uploads.load(Ordering::SeqCst), 0);
        assert!(!dash.toasts.is_empty());

        // Once the slot frees up the upload goes through and the module's
        // file list is re-fetched.
        dash.selected.as_mut().unwrap().uploading.remove(&module_id);
        dash.upload_file(module_id, "notes.pdf", Bytes::from_static(b"%PDF"))
            .await;
        assert_eq!(backend.uploads.load(Ordering::SeqCst), 1);
        assert_eq!(dash.selected.as_ref().unwrap().files[&module_id].len(), 1);
        assert!(!dash.upload_busy(module_id));
    }

    #[tokio::test]
    async fn opening_a_course_merges_details_over_the_summary() {
        let (_, mut dash) = dashboard_with(vec![course("Finance 101", "FIN101")]);
        dash.load().await;
        let course_id = dash.courses[0].id;

        dash.open_course(course_id).await;

        let open = dash.selected.as_ref().unwrap();
        assert_eq!(open.course.access_code.as_deref(), Some("ABC123"));
        assert_eq!(open.course.students, Some(2));
        assert!(open.course.published);
    }
}
