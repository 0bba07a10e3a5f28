//! services/app/src/app/student.rs
//!
//! The student dashboard view-model: enrolled courses (published only),
//! module trees with lazily fetched files, classmates, and enrollment by
//! access code. Mutations re-fetch the affected collection.

use std::collections::HashMap;
use std::sync::Arc;

use learnx_core::domain::{Classmate, Course, FileSummary, Module, UserProfile};
use learnx_core::ports::StudentBackend;
use uuid::Uuid;

use crate::app::notify::Toasts;

/// The detail view of one opened course.
pub struct OpenCourse {
    pub course: Course,
    pub modules: Vec<Module>,
    pub expanded: Option<Uuid>,
    pub files: HashMap<Uuid, Vec<FileSummary>>,
    pub loading_files: Option<Uuid>,
    pub classmates: Vec<Classmate>,
    pub loading_classmates: bool,
}

impl OpenCourse {
    fn new(course: Course) -> Self {
        Self {
            course,
            modules: Vec::new(),
            expanded: None,
            files: HashMap::new(),
            loading_files: None,
            classmates: Vec::new(),
            loading_classmates: false,
        }
    }
}

/// The student dashboard.
pub struct StudentDashboard {
    api: Arc<dyn StudentBackend>,
    pub courses: Vec<Course>,
    pub search: String,
    pub selected: Option<OpenCourse>,
    /// Loaded once per mount; feeds the personalization flow.
    pub profile: Option<UserProfile>,
    pub loading: bool,
    pub toasts: Toasts,
}

impl StudentDashboard {
    pub fn new(api: Arc<dyn StudentBackend>) -> Self {
        Self {
            api,
            courses: Vec::new(),
            search: String::new(),
            selected: None,
            profile: None,
            loading: false,
            toasts: Toasts::default(),
        }
    }

    /// Fetch-on-mount: the enrolled course list. Students only ever see
    /// published courses.
    pub async fn load(&mut self) {
        self.loading = true;
        self.refetch_courses().await;
        self.loading = false;
    }

    /// Same substring filter as the instructor grid.
    pub fn filtered_courses(&self) -> Vec<&Course> {
        let query = self.search.to_lowercase();
        self.courses
            .iter()
            .filter(|c| {
                c.title.to_lowercase().contains(&query) || c.code.to_lowercase().contains(&query)
            })
            .collect()
    }

    pub async fn open_course(&mut self, course_id: Uuid) {
        let Some(course) = self.courses.iter().find(|c| c.id == course_id).cloned() else {
            return;
        };
        self.selected = Some(OpenCourse::new(course));
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

    pub fn close_course(&mut self) {
        self.selected = None;
    }

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

    pub async fn load_classmates(&mut self) {
        let Some(course_id) = self.selected.as_ref().map(|s| s.course.id) else {
            return;
        };
        if let Some(open) = self.selected.as_mut() {
            open.loading_classmates = true;
        }
        let result = self.api.list_classmates(course_id).await;
        if let Some(open) = self.selected.as_mut() {
            open.loading_classmates = false;
            match result {
                Ok(classmates) => open.classmates = classmates,
                Err(e) => {
                    open.classmates = Vec::new();
                    self.toasts.port_error("Failed to fetch classmates.", &e);
                }
            }
        }
    }

    /// Creates an enrollment from an access code, then re-fetches the
    /// course list.
    pub async fn enroll(&mut self, access_code: &str) {
        let code = access_code.trim();
        if code.is_empty() {
            return;
        }
        match self.api.enroll(code).await {
            Ok(()) => {
                self.toasts.success("Enrolled!");
                self.refetch_courses().await;
            }
            Err(e) => self.toasts.port_error("Failed to enroll.", &e),
        }
    }

    /// Loads the profile, falling back to the legacy positional-answers
    /// endpoint when the profile route fails.
    pub async fn load_profile(&mut self) {
        match self.api.fetch_profile().await {
            Ok(profile) => self.profile = Some(profile),
            Err(first) => match self.api.fetch_onboarding().await {
                Ok(profile) => self.profile = Some(profile),
                Err(_) => self.toasts.port_error("Error loading onboarding.", &first),
            },
        }
    }

    /// Saves onboarding answers (first run) or updates them from settings.
    pub async fn save_profile(&mut self, profile: UserProfile, first_run: bool) {
        let result = if first_run {
            self.api.save_profile(&profile).await
        } else {
            self.api.update_profile(&profile).await
        };
        match result {
            Ok(()) => self.profile = Some(profile),
            Err(e) => self.toasts.port_error("Failed to save onboarding.", &e),
        }
    }

    async fn refetch_courses(&mut self) {
        match self.api.list_courses().await {
            Ok(courses) => {
                self.courses = courses.into_iter().filter(|c| c.published).collect();
            }
            Err(e) => self.toasts.port_error("Failed to fetch courses.", &e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use learnx_core::ports::PortResult;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeBackend {
        courses: Mutex<Vec<Course>>,
        enrollable: Mutex<HashMap<String, Course>>,
        profile_endpoint_broken: bool,
    }

    fn course(title: &str, code: &str, published: bool) -> Course {
        Course {
            id: Uuid::new_v4(),
            title: title.into(),
            code: code.into(),
            term: "Fall 2025".into(),
            description: String::new(),
            published,
            access_code: None,
            students: None,
            last_updated: None,
        }
    }

    #[async_trait]
    impl StudentBackend for FakeBackend {
        async fn list_courses(&self) -> PortResult<Vec<Course>> {
            Ok(self.courses.lock().unwrap().clone())
        }

        async fn list_modules(&self, _course_id: Uuid) -> PortResult<Vec<Module>> {
            Ok(Vec::new())
        }

        async fn list_classmates(&self, _course_id: Uuid) -> PortResult<Vec<Classmate>> {
            Ok(vec![Classmate { name: "Ada".into() }])
        }

        async fn list_files(&self, _module_id: Uuid) -> PortResult<Vec<FileSummary>> {
            Ok(Vec::new())
        }

        async fn file_content(&self, _file_id: Uuid) -> PortResult<String> {
            Ok("content".into())
        }

        async fn enroll(&self, access_code: &str) -> PortResult<()> {
            let joined = self
                .enrollable
                .lock()
                .unwrap()
                .remove(access_code)
                .ok_or_else(|| learnx_core::ports::PortError::Api {
                    status: 400,
                    message: "Invalid access code".into(),
                })?;
            self.courses.lock().unwrap().push(joined);
            Ok(())
        }

        async fn fetch_profile(&self) -> PortResult<UserProfile> {
            if self.profile_endpoint_broken {
                return Err(learnx_core::ports::PortError::Transport("down".into()));
            }
            Ok(UserProfile::default())
        }

        async fn save_profile(&self, _profile: &UserProfile) -> PortResult<()> {
            Ok(())
        }

        async fn update_profile(&self, _profile: &UserProfile) -> PortResult<()> {
            Ok(())
        }

        async fn fetch_onboarding(&self) -> PortResult<UserProfile> {
            Ok(UserProfile {
                name: "Ada".into(),
                ..Default::default()
            })
        }
    }

    #[tokio::test]
    async fn only_published_courses_are_listed() {
        let backend = Arc::new(FakeBackend::default());
        *backend.courses.lock().unwrap() = vec![
            course("Finance 101", "FIN101", true),
            course("Drafts", "WIP000", false),
        ];
        let mut dash = StudentDashboard::new(backend);
        dash.load().await;

        assert_eq!(dash.courses.len(), 1);
        assert_eq!(dash.courses[0].title, "Finance 101");
    }

    #[tokio::test]
    async fn enrolling_refetches_the_course_list() {
        let backend = Arc::new(FakeBackend::default());
        backend
            .enrollable
            .lock()
            .unwrap()
            .insert("ABC123".into(), course("Finance 101", "FIN101", true));
        let mut dash = StudentDashboard::new(backend);
        dash.load().await;
        assert!(dash.courses.is_empty());

        dash.enroll("ABC123").await;
        assert_eq!(dash.courses.len(), 1);
    }

    #[tokio::test]
    async fn profile_loading_falls_back_to_the_legacy_endpoint() {
        let backend = Arc::new(FakeBackend {
            profile_endpoint_broken: true,
            ..Default::default()
        });
        let mut dash = StudentDashboard::new(backend);

        dash.load_profile().await;

        assert_eq!(dash.profile.as_ref().map(|p| p.name.as_str()), Some("Ada"));
        assert!(dash.toasts.is_empty());
    }

    #[tokio::test]
    async fn a_rejected_access_code_surfaces_the_backend_message() {
        let backend = Arc::new(FakeBackend::default());
        let mut dash = StudentDashboard::new(backend);
        dash.load().await;

        dash.enroll("WRONG").await;
        let toasts = dash.toasts.drain();
        assert_eq!(toasts.len(), 1);
        assert_eq!(toasts[0].message, "Invalid access code");
        assert!(dash.courses.is_empty());
    }
}
