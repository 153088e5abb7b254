use std::sync::Arc;

use agent_store::{JsonStore, MemoryFilesystem};
use moltbook_agent::{App, AppError, AppExit, ClaimFlow, ClaimMode, LifecycleError};
use moltbook_api_mock::ScriptedTransport;
use moltbook_api::{ApiConfig, MoltbookClient};
use moltbook_tui::prompt::ScriptedPrompt;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

const BASE: &str = "https://moltbook.test/api/v1";

const STORED_WITH_CLAIM: &str = r#"{
  "api_key": "moltbook_sk_saved",
  "agent_name": "Coral Kestrel",
  "claim_url": "https://moltbook.test/claim/saved",
  "verification_code": "tide-7"
}"#;

struct Run {
    exit: Result<AppExit, AppError>,
    output: String,
    fs: Arc<MemoryFilesystem>,
    transport: Arc<ScriptedTransport>,
}

impl Run {
    fn urls(&self) -> Vec<String> {
        self.transport
            .requests()
            .into_iter()
            .map(|request| request.url.trim_start_matches(BASE).to_string())
            .collect()
    }

    fn saved_json(&self, path: &str) -> Value {
        serde_json::from_str(&self.fs.file(path).expect("document written")).expect("json")
    }
}

async fn run_app(
    fs: MemoryFilesystem,
    transport: ScriptedTransport,
    mode: ClaimMode,
    answers: &[&str],
) -> Run {
    let fs = Arc::new(fs);
    let transport = Arc::new(transport);
    let config = ApiConfig::default().with_base_url(BASE).with_data_dir("/data");
    let client = MoltbookClient::with_parts(config, transport.clone(), JsonStore::new(fs.clone()))
        .expect("client");
    let app = App::new(client, ClaimFlow::new(mode)).with_width(60);

    let mut prompt = ScriptedPrompt::new(answers.iter().copied());
    let mut out = Vec::new();
    let exit = app.run(&mut prompt, &mut out).await;

    Run {
        exit,
        output: String::from_utf8(out).expect("utf8"),
        fs,
        transport,
    }
}

fn pending() -> Value {
    json!({"success": true, "status": "pending_claim"})
}

#[tokio::test]
async fn first_run_registers_checks_once_and_opens_feed() {
    let transport = ScriptedTransport::new()
        .with_json(
            201,
            json!({"success": true, "agent": {
                "api_key": "moltbook_sk_new",
                "claim_url": "https://moltbook.test/claim/new",
                "verification_code": "reef-1"
            }}),
        )
        .with_json(200, pending())
        .with_json(200, pending())
        .with_json(200, json!({"success": true, "data": [{"title": "Hello reef"}]}))
        .with_json(200, json!([]));

    let run = run_app(
        MemoryFilesystem::new(),
        transport,
        ClaimMode::Simple,
        &["Reef Watcher", "Watches reefs.", "", "n", "q"],
    )
    .await;

    assert_eq!(*run.exit.as_ref().expect("run"), AppExit::Finished);
    assert_eq!(
        run.urls(),
        vec![
            "/agents/register",
            "/agents/status",
            "/agents/status",
            "/feed?sort=new&limit=10&page=1",
            "/feed?sort=new&limit=10&page=2",
        ]
    );
    assert_eq!(
        run.saved_json("/data/credentials.json"),
        json!({
            "api_key": "moltbook_sk_new",
            "agent_name": "Reef Watcher",
            "claim_url": "https://moltbook.test/claim/new",
            "verification_code": "reef-1",
        })
    );

    let requests = run.transport.requests();
    assert_eq!(requests[0].headers.get("Authorization"), None);
    assert_eq!(
        requests[1].headers.get("Authorization"),
        Some("Bearer moltbook_sk_new")
    );

    for expected in [
        "   https://moltbook.test/claim/new",
        "   reef-1",
        "Still pending claim. Continuing anyway...",
        "== Feed (Page 1) ==",
        "  1. Hello reef",
        "== Feed (Page 2) ==",
        "  (no posts)",
    ] {
        assert!(run.output.contains(expected), "missing {expected:?} in\n{}", run.output);
    }
}

#[tokio::test]
async fn claimed_agent_posts_and_reloads() {
    let fs = MemoryFilesystem::new().with_file("/data/credentials.json", STORED_WITH_CLAIM);
    let transport = ScriptedTransport::new()
        .with_json(200, json!({"success": true, "status": "claimed"}))
        .with_json(200, json!({"success": true, "data": []}))
        .with_json(201, json!({"success": true, "post": {"id": "p1"}}))
        .with_json(200, json!({"success": true, "data": [{"title": "Hello from the reef"}]}));

    let run = run_app(fs, transport, ClaimMode::Panel, &["Hello from the reef", "q"]).await;

    assert_eq!(*run.exit.as_ref().expect("run"), AppExit::Finished);
    assert_eq!(
        run.urls(),
        vec![
            "/agents/status",
            "/feed?sort=new&limit=10&page=1",
            "/posts",
            "/feed?sort=new&limit=10&page=1",
        ]
    );

    let post = &run.transport.requests()[2];
    assert_eq!(post.method.as_str(), "POST");
    assert_eq!(
        post.headers.get("Authorization"),
        Some("Bearer moltbook_sk_saved")
    );
    let body: Value = serde_json::from_slice(post.body.as_deref().expect("body")).expect("json");
    assert_eq!(
        body,
        json!({"submolt": "general", "title": "Posted from TUI", "content": "Hello from the reef"})
    );
    assert_eq!(
        run.saved_json("/data/posts.json"),
        json!({"success": true, "post": {"id": "p1"}})
    );
    assert!(run.output.contains("Agent: Coral Kestrel"));
    assert!(!run.output.contains("Agent not yet claimed."));
}

#[tokio::test]
async fn panel_quit_skips_the_feed() {
    let fs = MemoryFilesystem::new().with_file("/data/credentials.json", STORED_WITH_CLAIM);
    let transport = ScriptedTransport::new().with_json(200, pending());

    let run = run_app(fs, transport, ClaimMode::Panel, &["q"]).await;

    assert_eq!(*run.exit.as_ref().expect("run"), AppExit::Quit);
    assert_eq!(run.urls(), vec!["/agents/status"]);
    assert!(run.output.contains("Press ENTER to check status now, or type q to quit."));
}

#[tokio::test]
async fn panel_without_claim_info_goes_straight_to_feed() {
    let fs = MemoryFilesystem::new()
        .with_file("/data/credentials.json", r#"{"api_key": "moltbook_sk_bare"}"#);
    let transport = ScriptedTransport::new()
        .with_json(200, pending())
        .with_json(200, json!({"success": true, "data": []}));

    let run = run_app(fs, transport, ClaimMode::Panel, &[]).await;

    assert_eq!(*run.exit.as_ref().expect("run"), AppExit::Finished);
    assert_eq!(
        run.urls(),
        vec!["/agents/status", "/feed?sort=new&limit=10&page=1"]
    );
    assert!(run.output.contains("Using stored API key."));
    assert!(run.output.contains("No claim URL or verification code available."));
}

#[tokio::test]
async fn confirm_mode_waits_for_done() {
    let fs = MemoryFilesystem::new().with_file("/data/credentials.json", STORED_WITH_CLAIM);
    let transport = ScriptedTransport::new()
        .with_json(200, pending())
        .with_json(200, json!({"success": true, "data": []}));

    let run = run_app(fs, transport, ClaimMode::Confirm, &["soon", "done"]).await;

    assert_eq!(*run.exit.as_ref().expect("run"), AppExit::Finished);
    assert_eq!(run.transport.request_count(), 2);
    assert!(run.output.contains("Verification confirmed."));
}

#[tokio::test]
async fn feed_errors_are_shown_not_fatal() {
    let fs = MemoryFilesystem::new().with_file("/data/credentials.json", STORED_WITH_CLAIM);
    let transport = ScriptedTransport::new()
        .with_json(200, json!({"success": true, "status": "claimed"}))
        .with_json(500, json!({"success": false, "error": "Feed unavailable"}))
        .with_json(200, json!({"success": false}))
        .with_json(200, json!({"status": "pending_claim"}));

    let run = run_app(fs, transport, ClaimMode::Simple, &["p", "Draft", "s", "q"]).await;

    assert_eq!(*run.exit.as_ref().expect("run"), AppExit::Finished);
    assert_eq!(
        run.urls(),
        vec![
            "/agents/status",
            "/feed?sort=new&limit=10&page=1",
            "/posts",
            "/agents/status",
        ]
    );
    assert!(run.output.contains("== Feed (Error: Feed unavailable) =="));
    assert!(run.output.contains("Post failed: Request failed"));
    assert!(run.output.contains("Status: pending_claim"));
}

#[tokio::test]
async fn closed_input_during_registration_aborts() {
    let run = run_app(
        MemoryFilesystem::new(),
        ScriptedTransport::new(),
        ClaimMode::Simple,
        &[],
    )
    .await;

    assert!(matches!(
        run.exit,
        Err(AppError::Lifecycle(LifecycleError::Aborted))
    ));
    assert_eq!(run.transport.request_count(), 0);
    assert!(run.fs.file("/data/credentials.json").is_none());
}
