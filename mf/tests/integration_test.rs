//! Integration tests for MindFlow
//!
//! These exercise the library against a file-backed store and drive the `mf`
//! binary end to end.

use std::path::Path;
use std::sync::{Arc, Mutex};

use assert_cmd::Command;
use async_trait::async_trait;
use predicates::prelude::*;
use tempfile::TempDir;

use kvstore::{FileStore, KeyValueStore};
use mindflow::domain::{Task, TaskDraft, UuidGenerator};
use mindflow::llm::{GenerateRequest, GenerateResponse, LlmClient, LlmError};
use mindflow::persistence::{STORAGE_KEY, TaskSlot};
use mindflow::planning::{PlanError, PlanningClient};
use mindflow::prompts::PromptLoader;
use mindflow::store::TaskStore;
use mindflow::workspace::{ActionError, BreakdownOutcome, Workspace};
use mindflow::{Category, CategoryFilter, CompletionFilter, Priority, filter};

/// Replies with canned text, in order
struct ScriptedClient {
    replies: Mutex<Vec<String>>,
}

impl ScriptedClient {
    fn new(replies: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.iter().rev().map(|r| r.to_string()).collect()),
        })
    }
}

#[async_trait]
impl LlmClient for ScriptedClient {
    async fn generate(&self, _request: GenerateRequest) -> Result<GenerateResponse, LlmError> {
        let next = self.replies.lock().expect("lock").pop();
        match next {
            Some(text) => Ok(GenerateResponse::with_text(text)),
            None => Err(LlmError::InvalidResponse("script exhausted".to_string())),
        }
    }
}

fn open_workspace(dir: &Path, llm: Option<Arc<dyn LlmClient>>) -> Workspace {
    let kv = FileStore::open(dir).expect("open store");
    let store = TaskStore::open(TaskSlot::new(Arc::new(kv)), Arc::new(UuidGenerator));
    Workspace::new(store, PlanningClient::new(llm, PromptLoader::embedded_only()))
}

fn stored_tasks(dir: &Path) -> Vec<Task> {
    let bytes = std::fs::read(dir.join(STORAGE_KEY)).expect("read slot file");
    serde_json::from_slice(&bytes).expect("parse slot file")
}

// =============================================================================
// Library
// =============================================================================

#[tokio::test]
async fn test_tasks_survive_restart() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");

    let (kept, gone) = {
        let mut ws = open_workspace(temp_dir.path(), None);
        let kept = ws
            .add_task(TaskDraft::new("Buy milk").with_category(Category::Personal), false)
            .await
            .unwrap();
        let gone = ws.add_task(TaskDraft::new("Old chore"), false).await.unwrap();
        ws.store_mut().toggle_completion(&kept.id).unwrap();
        ws.store_mut().remove(&gone.id).unwrap();
        (kept, gone)
    };

    let ws = open_workspace(temp_dir.path(), None);
    assert_eq!(ws.store().len(), 1);
    let task = ws.store().get(&kept.id).unwrap();
    assert!(task.completed);
    assert_eq!(task.category, Category::Personal);
    assert!(ws.store().get(&gone.id).is_none());
    assert_eq!(stored_tasks(temp_dir.path()), ws.store().tasks());
}

#[tokio::test]
async fn test_corrupt_slot_loads_empty() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let kv = FileStore::open(temp_dir.path()).unwrap();
    kv.set(STORAGE_KEY, b"{not json").unwrap();

    let mut ws = open_workspace(temp_dir.path(), None);
    assert!(ws.store().is_empty());

    // Next mutation overwrites the bad value
    ws.add_task(TaskDraft::new("Fresh start"), false).await.unwrap();
    assert_eq!(stored_tasks(temp_dir.path()).len(), 1);
}

#[tokio::test]
async fn test_plan_then_breakdown() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let client = ScriptedClient::new(&[
        r#"{"tasks":[
            {"title":"Buy gear","description":"Tent and bags","priority":"High","category":"Personal","subtasks":["Buy tent","Buy sleeping bag"]},
            {"title":"Book site","priority":"Medium","category":"Personal","subtasks":["Compare parks"]}
        ]}"#,
        r#"["Check weather", "Pack snacks"]"#,
    ]);
    let mut ws = open_workspace(temp_dir.path(), Some(client));
    ws.add_task(TaskDraft::new("Existing").with_priority(Priority::Low), false)
        .await
        .unwrap();

    let ids = ws.plan_goal("Plan a 2-day camping trip").await.unwrap();
    let titles: Vec<_> = ws.store().tasks().iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, ["Buy gear", "Book site", "Existing"]);

    let outcomes = ws.breakdown(&[ids[1].clone()]).await.unwrap();
    assert_eq!(
        outcomes,
        [BreakdownOutcome::Added {
            task_id: ids[1].clone(),
            count: 2
        }]
    );

    let reopened = open_workspace(temp_dir.path(), None);
    let site = reopened.store().get(&ids[1]).unwrap();
    let subtasks: Vec<_> = site.subtasks.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(subtasks, ["Compare parks", "Check weather", "Pack snacks"]);

    let active_personal = filter(
        reopened.store().tasks(),
        CompletionFilter::Active,
        CategoryFilter::Only(Category::Personal),
    );
    assert_eq!(active_personal.len(), 2);
}

#[tokio::test]
async fn test_failed_plan_leaves_file_untouched() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let client = ScriptedClient::new(&["Sorry, I can't do that"]);
    let mut ws = open_workspace(temp_dir.path(), Some(client));
    ws.add_task(TaskDraft::new("Existing"), false).await.unwrap();
    let before = std::fs::read(temp_dir.path().join(STORAGE_KEY)).unwrap();

    let result = ws.plan_goal("Anything").await;
    assert!(matches!(result, Err(ActionError::Plan(PlanError::MalformedResponse(_)))));
    assert_eq!(std::fs::read(temp_dir.path().join(STORAGE_KEY)).unwrap(), before);
}

// =============================================================================
// CLI
// =============================================================================

/// `mf` isolated from the user's config, data dir and credentials
fn mf(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("mf").expect("mf binary");
    cmd.current_dir(home.path())
        .env("HOME", home.path())
        .env("XDG_DATA_HOME", home.path().join("data"))
        .env("XDG_CONFIG_HOME", home.path().join("config"))
        .env("NO_COLOR", "1")
        .env_remove("GEMINI_API_KEY")
        .arg("--store")
        .arg(home.path().join("store"));
    cmd
}

#[test]
fn test_cli_add_list_toggle_delete() {
    let home = TempDir::new().expect("Failed to create temp dir");
    let store_dir = home.path().join("store");

    mf(&home)
        .args(["add", "Buy milk", "--priority", "high", "--category", "personal"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added task"));

    mf(&home)
        .args(["add", "Read a book", "-C", "learning"])
        .assert()
        .success();

    let tasks = stored_tasks(&store_dir);
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0].title, "Read a book");
    assert_eq!(tasks[1].priority, Priority::High);
    let milk = tasks[1].id.clone();

    mf(&home).args(["toggle", &milk]).assert().success();
    assert!(stored_tasks(&store_dir)[1].completed);

    mf(&home)
        .args(["list", "--filter", "active"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Read a book"))
        .stdout(predicate::str::contains("Buy milk").not());

    mf(&home)
        .args(["list", "--category", "Personal"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Buy milk"));

    mf(&home).args(["delete", &milk]).assert().success();
    let tasks = stored_tasks(&store_dir);
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].title, "Read a book");

    mf(&home)
        .arg("stats")
        .assert()
        .success()
        .stdout(predicate::str::contains("Tasks: 1"));
}

#[test]
fn test_cli_plan_without_key_fails_and_keeps_state() {
    let home = TempDir::new().expect("Failed to create temp dir");
    let store_dir = home.path().join("store");

    mf(&home).args(["add", "Existing"]).assert().success();
    let before = stored_tasks(&store_dir);

    mf(&home)
        .args(["plan", "Learn", "to", "juggle"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to generate plan"));

    assert_eq!(stored_tasks(&store_dir), before);
}

#[test]
fn test_cli_unknown_task() {
    let home = TempDir::new().expect("Failed to create temp dir");

    mf(&home)
        .args(["toggle", "does-not-exist"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No task matches"));
}

#[test]
fn test_cli_rejects_blank_title() {
    let home = TempDir::new().expect("Failed to create temp dir");

    mf(&home).args(["add", "   "]).assert().failure();
    assert!(!home.path().join("store").join(STORAGE_KEY).exists());
}
