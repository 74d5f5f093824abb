//! Router tests driving the chat page and JSON API end to end

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use chatline_core::{
    ChatError, ChatManager, ChatResult, Pipeline, RecordingSink, Reply, Responder, Role,
    SessionRegistry, Turn, Variant,
};
use chatline_web::{create_router, AppState, WebConfig, SESSION_COOKIE};

/// Replays queued results, then answers "ok"
#[derive(Default)]
struct ScriptedResponder {
    script: Mutex<VecDeque<ChatResult<Reply>>>,
}

impl ScriptedResponder {
    fn replying(replies: &[&str]) -> Self {
        Self {
            script: Mutex::new(replies.iter().map(|r| Ok(Reply::text(*r))).collect()),
        }
    }

    fn failing(message: &str) -> Self {
        Self {
            script: Mutex::new(VecDeque::from(vec![Err(ChatError::Responder(
                message.to_string(),
            ))])),
        }
    }
}

#[async_trait]
impl Responder for ScriptedResponder {
    async fn respond(&self, _turns: &[Turn]) -> ChatResult<Reply> {
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Reply::text("ok")))
    }
}

/// Sleeps before answering and records how many turns each call saw
struct SlowResponder {
    delay: Duration,
    seen: Mutex<Vec<usize>>,
}

#[async_trait]
impl Responder for SlowResponder {
    async fn respond(&self, turns: &[Turn]) -> ChatResult<Reply> {
        self.seen.lock().unwrap().push(turns.len());
        tokio::time::sleep(self.delay).await;
        Ok(Reply::text(format!("reply to {}", turns[turns.len() - 1].content)))
    }
}

fn app(variant: Variant, responder: ScriptedResponder) -> (Router, AppState) {
    app_with(variant, Arc::new(responder))
}

fn app_with(variant: Variant, responder: Arc<dyn Responder>) -> (Router, AppState) {
    let pipeline = Pipeline::for_variant(variant, responder, Arc::new(RecordingSink::new()));
    let state = AppState::new(
        ChatManager::new(pipeline),
        SessionRegistry::new(),
        WebConfig::default(),
    );
    (create_router(state.clone()), state)
}

fn form_post(body: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/send")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn json_post(body: Value, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/api/messages")
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

/// `name=value` part of the session cookie set by a response
fn session_cookie(response: &Response) -> Option<String> {
    let value = response.headers().get(header::SET_COOKIE)?.to_str().ok()?;
    let pair = value.split(';').next()?.trim().to_string();
    pair.starts_with(SESSION_COOKIE).then_some(pair)
}

async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn body_json(response: Response) -> Value {
    serde_json::from_str(&body_text(response).await).unwrap()
}

#[tokio::test]
async fn test_fresh_page_has_no_session() {
    let (router, state) = app(Variant::MultiAgent, ScriptedResponder::default());

    let response = router.oneshot(get("/", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(session_cookie(&response).is_none());

    let page = body_text(response).await;
    assert!(page.contains("Multi-Agent Chatbot"));
    assert!(page.contains("Your Message:"));
    assert!(state.sessions.is_empty());
}

#[tokio::test]
async fn test_form_submission_round_trip() {
    let (router, _) = app(
        Variant::MultiAgent,
        ScriptedResponder::replying(&["Glad to hear it"]),
    );

    let response = router
        .clone()
        .oneshot(form_post("message=I+am+so+happy+today", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/");
    let cookie = session_cookie(&response).expect("session cookie");

    let page = body_text(router.oneshot(get("/", Some(&cookie))).await.unwrap()).await;
    assert!(page.contains("👤 I am so happy today"));
    assert!(page.contains("background-color:#32CD32;\">🤖 Glad to hear it 😄"));
    assert!(page.contains("Sentiment: positive"));
}

#[tokio::test]
async fn test_blank_submission_creates_nothing() {
    let (router, state) = app(Variant::MultiAgent, ScriptedResponder::default());

    let response = router
        .oneshot(form_post("message=+++", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(session_cookie(&response).is_none());
    assert!(state.sessions.is_empty());
}

#[tokio::test]
async fn test_responder_failure_renders_bad_gateway() {
    let (router, _) = app(
        Variant::MultiAgent,
        ScriptedResponder::failing("upstream timed out"),
    );

    let response = router
        .clone()
        .oneshot(form_post("message=hello", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let cookie = session_cookie(&response).expect("session cookie");

    let page = body_text(response).await;
    assert!(page.contains("role=\"alert\">Responder error: upstream timed out"));
    assert!(page.contains("👤 hello"));
    assert!(page.contains("background-color:#888;\">🤖 ...</div>"));

    // The user turn survived; the next message gets a reply.
    router
        .clone()
        .oneshot(form_post("message=again", Some(&cookie)))
        .await
        .unwrap();
    let history = body_json(
        router
            .oneshot(get("/api/history", Some(&cookie)))
            .await
            .unwrap(),
    )
    .await;
    let exchanges = history["exchanges"].as_array().unwrap();
    assert_eq!(exchanges.len(), 2);
    assert!(exchanges[0].get("reply").is_none());
    assert_eq!(exchanges[1]["reply"]["content"], "ok");
}

#[tokio::test]
async fn test_api_message_and_history() {
    let (router, _) = app(
        Variant::MultiAgent,
        ScriptedResponder::replying(&["Sorry to hear that"]),
    );

    let response = router
        .clone()
        .oneshot(json_post(json!({"content": "This is a bad and sad day"}), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = session_cookie(&response).expect("session cookie");

    let body = body_json(response).await;
    assert_eq!(body["exchange"]["user"]["content"], "This is a bad and sad day");
    assert_eq!(body["exchange"]["user"]["role"], "user");
    assert_eq!(body["exchange"]["reply"]["content"], "Sorry to hear that");
    assert_eq!(body["exchange"]["sentiment"], "negative");
    assert_eq!(
        format!("{}={}", SESSION_COOKIE, body["sessionId"].as_str().unwrap()),
        cookie
    );

    let history = body_json(
        router
            .oneshot(get("/api/history", Some(&cookie)))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(history["variant"], "multi-agent");
    assert_eq!(history["exchanges"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_api_rejects_blank_message() {
    let (router, state) = app(Variant::MultiAgent, ScriptedResponder::default());

    let response = router
        .oneshot(json_post(json!({"content": "   "}), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Message is empty");
    assert!(state.sessions.is_empty());
}

#[tokio::test]
async fn test_api_history_without_session() {
    let (router, _) = app(Variant::SingleAgent, ScriptedResponder::default());

    let body = body_json(router.oneshot(get("/api/history", None)).await.unwrap()).await;
    assert!(body["sessionId"].is_null());
    assert_eq!(body["variant"], "single-agent");
    assert_eq!(body["exchanges"], json!([]));
}

#[tokio::test]
async fn test_unknown_cookie_starts_new_session() {
    let (router, state) = app(Variant::MultiAgent, ScriptedResponder::default());

    let stale = format!("{}=no-such-session", SESSION_COOKIE);
    let response = router
        .oneshot(form_post("message=hi", Some(&stale)))
        .await
        .unwrap();
    let cookie = session_cookie(&response).expect("session cookie");
    assert_ne!(cookie, stale);
    assert_eq!(state.sessions.len(), 1);
}

#[tokio::test]
async fn test_single_agent_page() {
    let (router, _) = app(
        Variant::SingleAgent,
        ScriptedResponder::replying(&["Hello there"]),
    );

    let response = router
        .clone()
        .oneshot(form_post("message=I+feel+good", None))
        .await
        .unwrap();
    let cookie = session_cookie(&response).expect("session cookie");

    let page = body_text(router.oneshot(get("/", Some(&cookie))).await.unwrap()).await;
    assert!(page.contains("<h1>Single-Agent Chatbot</h1>"));
    assert!(page.contains("<p><strong>You:</strong> I feel good</p>"));
    assert!(page.contains("<p><strong>Assistant:</strong> Hello there</p>"));
    assert!(!page.contains("Sentiment"));
}

#[tokio::test]
async fn test_same_session_submissions_run_one_at_a_time() {
    let responder = Arc::new(SlowResponder {
        delay: Duration::from_millis(50),
        seen: Mutex::new(Vec::new()),
    });
    let (router, state) = app_with(Variant::MultiAgent, responder.clone());
    let (id, session) = state.sessions.create();
    let cookie = format!("{}={}", SESSION_COOKIE, id);

    let (first, second) = tokio::join!(
        router
            .clone()
            .oneshot(json_post(json!({"content": "first"}), Some(&cookie))),
        router
            .clone()
            .oneshot(json_post(json!({"content": "second"}), Some(&cookie))),
    );
    assert_eq!(first.unwrap().status(), StatusCode::OK);
    assert_eq!(second.unwrap().status(), StatusCode::OK);

    // The second run only started once the first reply was stored.
    assert_eq!(*responder.seen.lock().unwrap(), vec![1, 3]);

    let session = session.lock().await;
    let roles: Vec<Role> = session.read_all().iter().map(|t| t.role).collect();
    assert_eq!(
        roles,
        vec![Role::User, Role::Assistant, Role::User, Role::Assistant]
    );
    let turns = session.read_all();
    for pair in turns.chunks(2) {
        assert_eq!(pair[1].content, format!("reply to {}", pair[0].content));
    }
}

#[tokio::test]
async fn test_session_lookup_by_id() {
    let (router, state) = app(Variant::MultiAgent, ScriptedResponder::replying(&["hi"]));
    let (id, session) = state.sessions.create();
    session.lock().await.append(Turn::user("hello"));

    let response = router
        .clone()
        .oneshot(get(&format!("/api/sessions/{}", id), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["sessionId"], id.as_str());
    assert_eq!(body["exchanges"][0]["user"]["content"], "hello");

    let response = router
        .oneshot(get("/api/sessions/no-such-session", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Chat session not found: no-such-session");
    assert_eq!(state.sessions.len(), 1);
}

#[tokio::test]
async fn test_version() {
    let (router, _) = app(Variant::MultiAgent, ScriptedResponder::default());
    let body = body_text(router.oneshot(get("/version", None)).await.unwrap()).await;
    assert!(body.starts_with("chatline "));
}
