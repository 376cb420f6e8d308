use std::{
    net::SocketAddr,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{Context, Result};
use axum::{
    extract::{Path as UrlPath, State},
    http::{
        header::{COOKIE, SET_COOKIE},
        HeaderMap, HeaderValue, StatusCode,
    },
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    serve, Form, Json, Router,
};
use minijinja::{path_loader, Environment};
use minijinja_autoreload::AutoReloader;
use serde::{Deserialize, Serialize};
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::catalog::{self, Model, Mood, SUGGESTIONS};
use crate::chat::{begin_turn, complete_turn};
use crate::constants::SESSION_COOKIE;
use crate::error::AppError;
use crate::inference::InferenceClient;
use crate::session::{Message, Role, SessionStore};

/// Where the web server listens and where it finds its assets.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub templates_dir: PathBuf,
    pub static_dir: PathBuf,
}

// Shared application state
#[derive(Clone)]
pub struct AppState {
    templates: Arc<AutoReloader>,
    sessions: SessionStore,
    client: InferenceClient,
}

impl AppState {
    pub fn new(templates_dir: impl Into<PathBuf>, client: InferenceClient) -> Self {
        Self {
            templates: Arc::new(create_minijinja_env(templates_dir.into())),
            sessions: SessionStore::new(),
            client,
        }
    }
}

// Minijinja Environment setup
fn create_minijinja_env(templates_dir: PathBuf) -> AutoReloader {
    AutoReloader::new(move |notifier| {
        let mut env = Environment::new();
        env.set_loader(path_loader(templates_dir.clone()));
        notifier.watch_path(&templates_dir, true);
        Ok(env)
    })
}

#[derive(Serialize)]
struct OptionView {
    key: &'static str,
    label: &'static str,
    selected: bool,
}

#[derive(Serialize)]
struct MessageView<'a> {
    is_user: bool,
    content: &'a str,
}

#[derive(Deserialize)]
pub struct ChatForm {
    pub message: String,
}

#[derive(Deserialize)]
pub struct SettingsForm {
    pub model: Model,
    pub mood: Mood,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct TranscriptResponse {
    pub model: Model,
    pub mood: Mood,
    pub messages: Vec<Message>,
}

fn session_id_from_headers(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| Uuid::parse_str(value).ok())
}

fn session_cookie(id: Uuid) -> Option<HeaderValue> {
    HeaderValue::from_str(&format!(
        "{SESSION_COOKIE}={id}; Path=/; HttpOnly; SameSite=Lax"
    ))
    .ok()
}

/// Resolves the caller's session, creating one when the cookie is missing
/// or stale. Returns the cookie to set for a new session.
async fn resolve_session(state: &AppState, headers: &HeaderMap) -> (Uuid, Option<HeaderValue>) {
    let (id, created) = state.sessions.ensure(session_id_from_headers(headers)).await;
    (id, if created { session_cookie(id) } else { None })
}

fn with_cookie(response: impl IntoResponse, cookie: Option<HeaderValue>) -> Response {
    let mut response = response.into_response();
    if let Some(cookie) = cookie {
        response.headers_mut().insert(SET_COOKIE, cookie);
    }
    response
}

async fn index_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let (id, cookie) = resolve_session(&state, &headers).await;
    let session = state.sessions.snapshot(id).await.unwrap_or_default();

    let messages: Vec<MessageView> = session
        .messages()
        .iter()
        .map(|m| MessageView {
            is_user: m.role == Role::User,
            content: &m.content,
        })
        .collect();
    let models: Vec<OptionView> = Model::ALL
        .iter()
        .map(|m| OptionView {
            key: m.key(),
            label: m.label(),
            selected: *m == session.model,
        })
        .collect();
    let moods: Vec<OptionView> = Mood::ALL
        .iter()
        .map(|m| OptionView {
            key: m.key(),
            label: m.label(),
            selected: *m == session.mood,
        })
        .collect();

    let env = state.templates.acquire_env()?;
    let html = env.get_template("index.html")?.render(minijinja::context! {
        title => "MindMate – Mental Wellness Assistant",
        affirmation => catalog::random_affirmation(&mut rand::thread_rng()),
        messages => messages,
        models => models,
        moods => moods,
        suggestions => SUGGESTIONS,
        model_label => session.model.label(),
    })?;

    Ok(with_cookie(Html(html), cookie))
}

/// One chat turn. The session lock is released while the model is running.
async fn submit_message(state: &AppState, headers: &HeaderMap, text: &str) -> Result<Response, AppError> {
    let (id, cookie) = resolve_session(state, headers).await;

    if text.trim().is_empty() {
        debug!(%id, "Ignoring empty message");
        return Ok(with_cookie(Redirect::to("/"), cookie));
    }

    let Some(turn) = state.sessions.with_session(id, |s| begin_turn(s, text)).await else {
        warn!(%id, "Session vanished before the turn started");
        return Ok(with_cookie(Redirect::to("/"), cookie));
    };

    info!(%id, model = turn.model.repo_id(), "MindMate is listening...");
    let reply = state.client.generate(&turn.prompt, turn.model).await?;

    let kept = state
        .sessions
        .with_session(id, |s| complete_turn(s, &turn, reply))
        .await;
    if kept != Some(true) {
        info!(%id, "Conversation cleared during the turn; reply dropped");
    }

    Ok(with_cookie(Redirect::to("/"), cookie))
}

async fn chat_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<ChatForm>,
) -> Result<Response, AppError> {
    submit_message(&state, &headers, &form.message).await
}

async fn suggestion_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    UrlPath(index): UrlPath<usize>,
) -> Result<Response, AppError> {
    let text = catalog::suggestion(index).ok_or(AppError::SuggestionNotFound(index))?;
    submit_message(&state, &headers, text).await
}

async fn settings_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<SettingsForm>,
) -> Response {
    let (id, cookie) = resolve_session(&state, &headers).await;
    state
        .sessions
        .with_session(id, |s| {
            s.model = form.model;
            s.mood = form.mood;
        })
        .await;
    info!(%id, model = form.model.key(), mood = form.mood.key(), "Updated session settings");
    with_cookie(Redirect::to("/"), cookie)
}

async fn clear_handler(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let (id, cookie) = resolve_session(&state, &headers).await;
    state.sessions.with_session(id, |s| s.clear()).await;
    info!(%id, "Cleared conversation");
    with_cookie(Redirect::to("/"), cookie)
}

/// Read-only: answers with an empty transcript instead of creating a
/// session for unknown callers.
async fn transcript_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Json<TranscriptResponse> {
    let session = match session_id_from_headers(&headers) {
        Some(id) => state.sessions.snapshot(id).await.unwrap_or_default(),
        None => Default::default(),
    };
    let body = TranscriptResponse {
        model: session.model,
        mood: session.mood,
        messages: session.messages().to_vec(),
    };
    Json(body)
}

async fn health_handler() -> &'static str {
    "ok"
}

/// Builds the application router.
pub fn build_router(state: AppState, static_dir: &Path) -> Router {
    // Serve static files from the static directory
    let static_files_service =
        ServeDir::new(static_dir).not_found_service(tower::service_fn(
            |_: axum::extract::Request| async {
                Ok::<_, std::convert::Infallible>(
                    (StatusCode::NOT_FOUND, "Not Found").into_response(),
                )
            },
        ));

    Router::new()
        .route("/", get(index_handler))
        .route("/chat", post(chat_handler))
        .route("/suggest/:index", post(suggestion_handler))
        .route("/settings", post(settings_handler))
        .route("/clear", post(clear_handler))
        .route("/api/transcript", get(transcript_handler))
        .route("/health", get(health_handler))
        .nest_service("/static", static_files_service)
        .with_state(state)
        .layer(TraceLayer::new_for_http()) // Add request logging
}

pub async fn start_web_server(config: ServerConfig, client: InferenceClient) -> Result<()> {
    if !client.has_token() {
        warn!("HF_TOKEN is not set; requests to the inference provider will be unauthenticated");
    }

    let state = AppState::new(&config.templates_dir, client);
    let app = build_router(state, &config.static_dir);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .with_context(|| format!("Invalid listen address {}:{}", config.host, config.port))?;
    info!("Web server listening on http://{}", addr);

    // Bind using tokio::net::TcpListener
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context(format!("Failed to bind to address {}", addr))?;

    serve(listener, app.into_make_service())
        .with_graceful_shutdown(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Ctrl-C received, initiating shutdown...");
            }
        })
        .await
        .context("Web server failed")?;

    info!("Shutdown complete.");
    Ok(())
}
