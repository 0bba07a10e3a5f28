//! services/app/src/app/personalize.rs
//!
//! The one-shot personalization flow: turn an uploaded file into a
//! learner-tailored variant. If a variant already exists the flow
//! short-circuits to it; otherwise it asks the backend to generate one.
//! The user can cancel while the request is in flight, which creates
//! nothing and returns the UI to its pre-request state. This is the only
//! cancellable request in the client.

use std::sync::Arc;

use learnx_core::domain::UserProfile;
use learnx_core::ports::PersonalizationService;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::app::notify::Toasts;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersonalizeState {
    Idle,
    Generating,
    /// A personalized file is ready to open.
    Ready(Uuid),
}

/// The personalization view-model.
pub struct PersonalizeFlow {
    api: Arc<dyn PersonalizationService>,
    pub state: PersonalizeState,
    token: CancellationToken,
    pub toasts: Toasts,
}

impl PersonalizeFlow {
    pub fn new(api: Arc<dyn PersonalizationService>) -> Self {
        Self {
            api,
            state: PersonalizeState::Idle,
            token: CancellationToken::new(),
            toasts: Toasts::default(),
        }
    }

    /// The handle the cancel control holds while a generation is in flight.
    pub fn cancel_handle(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Runs the flow for one file. Cancellation wins over a late result.
    pub async fn personalize(&mut self, file_id: Uuid, profile: &UserProfile) {
        self.state = PersonalizeState::Generating;
        let token = self.token.clone();
        let api = self.api.clone();

        let flow = async move {
            let existing = api.list_personalized().await?;
            if let Some(found) = existing.into_iter().find(|f| f.original_file_id == file_id) {
                return Ok(found);
            }
            api.generate(profile, file_id).await
        };

        tokio::select! {
            biased;
            _ = token.cancelled() => {
                self.state = PersonalizeState::Idle;
                self.toasts.info("Personalization cancelled.");
                // Re-arm for the next run.
                self.token = CancellationToken::new();
            }
            result = flow => match result {
                Ok(file) => {
                    self.state = PersonalizeState::Ready(file.id);
                    self.toasts.success("Personalized content generated!");
                }
                Err(e) => {
                    self.state = PersonalizeState::Idle;
                    self.toasts
                        .port_error("Something went wrong during personalization.", &e);
                }
            }
        }
    }
}
