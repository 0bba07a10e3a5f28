//! services/app/src/bin/learnx.rs
//!
//! The terminal entry point: wires configuration, the HTTP adapters and the
//! view-models together, resolves the session, and renders the dashboard
//! that matches the signed-in role.

use app_lib::{
    adapters::{
        Backend, HttpChatService, HttpIdentityService, HttpInstructorBackend,
        HttpPersonalizationService, HttpStudentBackend, HttpSuggestionService,
        JsonFileChatIdCache,
    },
    app::{
        AuthProvider, ChatPanel, DashboardView, InstructorDashboard, PersonalizeFlow,
        PersonalizeState, Route, StudentDashboard, SuggestionOverlay, ToastLevel, Toasts,
    },
    config::Config,
    error::AppError,
};
use learnx_core::document::DocNode;
use learnx_core::domain::{ChatRole, Delivery, Identity};
use learnx_core::ports::{
    ChatIdCache, ChatService, InstructorBackend, PersonalizationService, StudentBackend,
    SuggestionService,
};
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            config.log_level.to_string(),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Backend at {}", config.api_base_url);

    // --- 2. Build the Transport & Service Adapters ---
    let backend = Backend::new(config.api_base_url.clone(), config.http_timeout)?;
    let identity_adapter = Arc::new(HttpIdentityService::new(backend.clone()));
    let instructor_api: Arc<dyn InstructorBackend> =
        Arc::new(HttpInstructorBackend::new(backend.clone()));
    let student_api: Arc<dyn StudentBackend> = Arc::new(HttpStudentBackend::new(backend.clone()));
    let chat_api: Arc<dyn ChatService> = Arc::new(HttpChatService::new(backend.clone()));
    let personalization_api: Arc<dyn PersonalizationService> =
        Arc::new(HttpPersonalizationService::new(backend.clone()));
    let suggestion_api: Arc<dyn SuggestionService> =
        Arc::new(HttpSuggestionService::new(backend));
    let chat_cache: Arc<dyn ChatIdCache> = Arc::new(JsonFileChatIdCache::new(&config.state_dir));

    // --- 3. Resolve the Session ---
    // One attempt; a failure routes to login, exactly like a page load.
    let auth = AuthProvider::new(identity_adapter);
    let route = auth.bootstrap(config.id_token.as_deref()).await;

    // --- 4. Route by Role ---
    match route {
        Route::Login => {
            println!(
                "Not signed in. Set ID_TOKEN to a valid identity-provider credential and retry."
            );
        }
        Route::Dashboard(identity) => match DashboardView::for_role(identity.role) {
            DashboardView::Loading => {
                // An unresolved role renders the placeholder and nothing else.
                println!("Loading...");
            }
            DashboardView::Instructor => run_instructor(instructor_api).await,
            DashboardView::Student => {
                run_student(
                    student_api,
                    chat_api,
                    chat_cache,
                    personalization_api,
                    suggestion_api,
                    &identity,
                )
                .await;
            }
            DashboardView::Admin => {
                println!("Signed in as admin; this client has no admin console.");
            }
        },
    }

    Ok(())
}

async fn run_instructor(api: Arc<dyn InstructorBackend>) {
    let mut dash = InstructorDashboard::new(api);
    dash.load().await;
    drain_toasts(&mut dash.toasts);

    println!("Your courses ({}):", dash.courses.len());
    for course in dash.filtered_courses() {
        let status = if course.published {
            "published"
        } else {
            "unpublished"
        };
        println!(
            "  {}  {} [{}] ({})",
            course.code, course.title, course.term, status
        );
    }
}

async fn run_student(
    api: Arc<dyn StudentBackend>,
    chat_api: Arc<dyn ChatService>,
    chat_cache: Arc<dyn ChatIdCache>,
    personalization_api: Arc<dyn PersonalizationService>,
    suggestion_api: Arc<dyn SuggestionService>,
    identity: &Identity,
) {
    let mut dash = StudentDashboard::new(api.clone());
    dash.load().await;
    dash.load_profile().await;
    drain_toasts(&mut dash.toasts);

    if dash.courses.is_empty() {
        println!("You are not enrolled in any courses yet.");
    } else {
        println!("Enrolled courses ({}):", dash.courses.len());
        for course in dash.filtered_courses() {
            println!("  {}  {} [{}]", course.code, course.title, course.term);
        }
    }

    let mut panel = ChatPanel::new(chat_api, chat_cache, identity.id, None);
    panel.mount().await;
    for message in &panel.messages {
        print_message(message.role, &message.content, message.delivery);
    }

    let mut flow = PersonalizeFlow::new(personalization_api.clone());

    println!("Ask the AI assistant a question, or:");
    println!("  /personalize <file-id>   generate a tailored variant of a file");
    println!("  /suggest <file-id>       review suggestions for a file");
    println!("(empty line to quit)");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        let _ = std::io::stdout().flush();
        let Ok(Some(line)) = lines.next_line().await else {
            break;
        };
        let input = line.trim();
        if input.is_empty() {
            break;
        }

        if let Some(rest) = input.strip_prefix("/personalize ") {
            match rest.trim().parse::<Uuid>() {
                Ok(file_id) => {
                    let profile = dash.profile.clone().unwrap_or_default();
                    flow.personalize(file_id, &profile).await;
                    drain_toasts(&mut flow.toasts);
                    if let PersonalizeState::Ready(id) = flow.state {
                        match personalization_api.fetch_personalized(id).await {
                            Ok(file) if !file.title.is_empty() => {
                                println!("Personalized file ready: {} ({})", file.title, file.id);
                            }
                            _ => println!("Personalized file ready: {}", id),
                        }
                    }
                }
                Err(_) => println!("Usage: /personalize <file-id>"),
            }
            continue;
        }

        if let Some(rest) = input.strip_prefix("/suggest ") {
            match rest.trim().parse::<Uuid>() {
                Ok(file_id) => {
                    review_suggestions(api.clone(), suggestion_api.clone(), file_id).await;
                }
                Err(_) => println!("Usage: /suggest <file-id>"),
            }
            continue;
        }

        panel.send(input).await;
        drain_toasts(&mut panel.toasts);
        if let Some(message) = panel.messages.last() {
            if message.role == ChatRole::Assistant {
                print_message(message.role, &message.content, message.delivery);
            }
        }
    }
}

/// Fetches a file's text, projects its suggestions, and applies them all.
async fn review_suggestions(
    api: Arc<dyn StudentBackend>,
    suggestion_api: Arc<dyn SuggestionService>,
    file_id: Uuid,
) {
    let content = match api.file_content(file_id).await {
        Ok(content) => content,
        Err(e) => {
            println!("Could not fetch the file: {}", e);
            return;
        }
    };
    // One paragraph block per line, mirroring the editor's document shape.
    let mut doc = DocNode::Block(
        content
            .lines()
            .map(|line| DocNode::Block(vec![DocNode::Text(line.to_string())]))
            .collect(),
    );

    let mut overlay = SuggestionOverlay::new(suggestion_api);
    overlay.load(&doc, file_id).await;
    if overlay.highlights.is_empty() {
        println!("No suggestions.");
        return;
    }

    let pending: Vec<_> = overlay
        .highlights
        .iter()
        .map(|h| (h.suggestion.id, h.suggestion.original_text.clone(), h.span))
        .collect();
    for (id, original, span) in pending {
        match span {
            Some(_) => {
                if overlay.apply(&mut doc, id) {
                    println!("applied: {:?}", original);
                }
            }
            None => println!("not located: {:?}", original),
        }
    }
    println!("--- revised ---\n{}", doc.plain_text());
}

fn print_message(role: ChatRole, content: &str, delivery: Delivery) {
    let marker = match delivery {
        Delivery::Pending => " (sending)",
        Delivery::Failed => " (failed)",
        Delivery::Confirmed => "",
    };
    println!("[{}]{} {}", role.as_str(), marker, content);
}

fn drain_toasts(toasts: &mut Toasts) {
    for toast in toasts.drain() {
        let prefix = match toast.level {
            ToastLevel::Info => "info",
            ToastLevel::Success => "ok",
            ToastLevel::Error => "error",
        };
        eprintln!("[{}] {}", prefix, toast.message);
    }
}
