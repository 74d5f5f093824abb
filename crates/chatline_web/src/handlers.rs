//! HTTP handlers for the chat page and JSON API

use axum::{
    extract::{Path, State},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use tracing::debug;

use chatline_core::{ChatError, Exchange, SharedSession, Variant};

use crate::error::{status_for, ApiError};
use crate::render::render_page;
use crate::AppState;

/// Cookie carrying the browser's session id
pub const SESSION_COOKIE: &str = "chatline_session";

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Chat page
        .route("/", get(index))
        .route("/send", post(send_message))
        // JSON API
        .route("/api/history", get(get_history))
        .route("/api/messages", post(post_message))
        .route("/api/sessions/:id", get(get_session))
        // Version
        .route("/version", get(get_version))
        .with_state(state)
}

fn session_cookie(id: &str) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, id.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

/// The live session named by the cookie, if any. Never creates one.
fn existing_session(state: &AppState, jar: &CookieJar) -> Option<(String, SharedSession)> {
    let id = jar.get(SESSION_COOKIE)?.value().to_string();
    let session = state.sessions.get(&id)?;
    Some((id, session))
}

/// Resolve the cookie to a session, creating one on first interaction
fn resolve_session(state: &AppState, jar: CookieJar) -> (CookieJar, SharedSession) {
    let cookie_id = jar.get(SESSION_COOKIE).map(|c| c.value().to_string());
    let (id, session, created) = state.sessions.get_or_create(cookie_id.as_deref());
    if created {
        debug!(session = %id, "issuing session cookie");
    }
    (jar.add(session_cookie(&id)), session)
}

// ============================================================
// Chat page
// ============================================================

async fn index(State(state): State<AppState>, jar: CookieJar) -> Html<String> {
    let exchanges = match existing_session(&state, &jar) {
        Some((_, session)) => {
            let session = session.lock().await;
            session.exchanges()
        }
        None => Vec::new(),
    };
    Html(render_page(state.manager.variant(), &exchanges, None))
}

#[derive(Debug, Deserialize)]
struct SendForm {
    #[serde(default)]
    message: String,
}

async fn send_message(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<SendForm>,
) -> Response {
    // Blank input never reaches a session.
    if form.message.trim().is_empty() {
        return Redirect::to("/").into_response();
    }

    let (jar, session) = resolve_session(&state, jar);
    let mut session = session.lock().await;

    let delay = state.config.typing_delay;
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }

    let result = state.manager.submit(&mut session, &form.message).await;
    state.sessions.touch(session.id());

    match result {
        Ok(_) | Err(ChatError::EmptyInput) => (jar, Redirect::to("/")).into_response(),
        Err(e) => {
            let page = render_page(
                state.manager.variant(),
                &session.exchanges(),
                Some(&e.to_string()),
            );
            (status_for(&e), jar, Html(page)).into_response()
        }
    }
}

// ============================================================
// JSON API
// ============================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct HistoryResponse {
    session_id: Option<String>,
    variant: Variant,
    exchanges: Vec<Exchange>,
}

async fn get_history(State(state): State<AppState>, jar: CookieJar) -> Json<HistoryResponse> {
    let (session_id, exchanges) = match existing_session(&state, &jar) {
        Some((id, session)) => {
            let session = session.lock().await;
            (Some(id), session.exchanges())
        }
        None => (None, Vec::new()),
    };
    Json(HistoryResponse {
        session_id,
        variant: state.manager.variant(),
        exchanges,
    })
}

/// History of a session named in the path; unknown ids are 404
async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let session = state
        .sessions
        .get(&id)
        .ok_or_else(|| ChatError::SessionNotFound(id.clone()))?;
    let exchanges = session.lock().await.exchanges();
    Ok(Json(HistoryResponse {
        session_id: Some(id),
        variant: state.manager.variant(),
        exchanges,
    }))
}

#[derive(Debug, Deserialize)]
struct MessageRequest {
    content: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MessageResponse {
    session_id: String,
    exchange: Exchange,
}

async fn post_message(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<MessageRequest>,
) -> Response {
    if req.content.trim().is_empty() {
        return ApiError(ChatError::EmptyInput).into_response();
    }

    let (jar, session) = resolve_session(&state, jar);
    let mut session = session.lock().await;

    let result = state.manager.submit(&mut session, &req.content).await;
    state.sessions.touch(session.id());

    match result {
        Ok(exchange) => {
            let body = MessageResponse {
                session_id: session.id().to_string(),
                exchange,
            };
            (jar, Json(body)).into_response()
        }
        Err(e) => (jar, ApiError(e)).into_response(),
    }
}

async fn get_version() -> &'static str {
    concat!("chatline ", env!("CARGO_PKG_VERSION"))
}
