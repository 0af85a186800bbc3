//! Workspace: task store plus planning client, with in-flight request tracking
//!
//! AI results only reach the store through here. Goal planning is all or
//! nothing; subtask suggestion runs one request per task, concurrently, and
//! merges whatever comes back.

use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use futures::future::join_all;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::domain::{Task, TaskDraft, TaskId};
use crate::planning::{PlanError, PlanningClient};
use crate::store::{StoreError, TaskStore};

/// Errors from workspace actions
#[derive(Debug, Error)]
pub enum ActionError {
    #[error(transparent)]
    Plan(#[from] PlanError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("A {0} request is already in progress")]
    Busy(RequestKey),
}

/// Identifies one in-flight AI request
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RequestKey {
    Goal,
    Priority,
    Breakdown(TaskId),
}

impl fmt::Display for RequestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Goal => write!(f, "goal"),
            Self::Priority => write!(f, "priority"),
            Self::Breakdown(id) => write!(f, "breakdown:{}", id),
        }
    }
}

/// Shared set of in-flight request keys
#[derive(Debug, Clone, Default)]
pub struct RequestTracker {
    pending: Arc<Mutex<HashSet<RequestKey>>>,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `key` as in flight until the returned guard is dropped
    ///
    /// Returns `None` if the key is already in flight.
    pub fn begin(&self, key: RequestKey) -> Option<RequestGuard> {
        let mut pending = self.lock();
        if !pending.insert(key.clone()) {
            debug!(%key, "begin: already pending");
            return None;
        }
        debug!(%key, "begin: request started");
        Some(RequestGuard {
            key,
            pending: Arc::clone(&self.pending),
        })
    }

    pub fn is_pending(&self, key: &RequestKey) -> bool {
        self.lock().contains(key)
    }

    /// Snapshot of in-flight keys
    pub fn pending(&self) -> Vec<RequestKey> {
        self.lock().iter().cloned().collect()
    }

    fn lock(&self) -> MutexGuard<'_, HashSet<RequestKey>> {
        self.pending.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Clears its key from the tracker on drop
#[derive(Debug)]
pub struct RequestGuard {
    key: RequestKey,
    pending: Arc<Mutex<HashSet<RequestKey>>>,
}

impl RequestGuard {
    pub fn key(&self) -> &RequestKey {
        &self.key
    }
}

impl Drop for RequestGuard {
    fn drop(&mut self) {
        let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        pending.remove(&self.key);
        debug!(key = %self.key, "RequestGuard: request finished");
    }
}

/// Result of breaking down one task
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BreakdownOutcome {
    /// `count` suggested subtasks were appended (0 when none came back)
    Added { task_id: TaskId, count: usize },
    /// No task with this id
    Missing { task_id: TaskId },
    /// A breakdown for this task is already in flight
    Busy { task_id: TaskId },
}

enum Suggestion {
    Missing,
    Busy,
    Steps(Vec<String>),
}

pub struct Workspace {
    store: TaskStore,
    planner: PlanningClient,
    requests: RequestTracker,
}

impl Workspace {
    pub fn new(store: TaskStore, planner: PlanningClient) -> Self {
        Self {
            store,
            planner,
            requests: RequestTracker::new(),
        }
    }

    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut TaskStore {
        &mut self.store
    }

    pub fn planner(&self) -> &PlanningClient {
        &self.planner
    }

    pub fn requests(&self) -> &RequestTracker {
        &self.requests
    }

    /// Create a task manually, optionally asking the model for its priority
    pub async fn add_task(&mut self, draft: TaskDraft, suggest_priority: bool) -> Result<Task, ActionError> {
        debug!(title = %draft.title, suggest_priority, "add_task: called");
        let mut draft = draft;
        if suggest_priority && !draft.title.trim().is_empty() {
            if let Some(_guard) = self.requests.begin(RequestKey::Priority) {
                draft.priority = self.planner.suggest_priority(&draft.title).await;
            }
        }
        Ok(self.store.create(draft)?)
    }

    /// Plan a goal and prepend the resulting tasks as one block
    ///
    /// The store is untouched unless the whole plan is inserted. Fails with
    /// `ActionError::Busy` if a goal request is already in flight.
    pub async fn plan_goal(&mut self, goal: &str) -> Result<Vec<TaskId>, ActionError> {
        debug!(%goal, "plan_goal: called");
        let plan = {
            let _guard = self
                .requests
                .begin(RequestKey::Goal)
                .ok_or(ActionError::Busy(RequestKey::Goal))?;
            self.planner.plan_goal(goal).await?
        };
        let ids = self.store.insert_drafts(plan.into_drafts())?;
        info!(count = ids.len(), "Inserted planned tasks");
        Ok(ids)
    }

    /// Ask for subtask suggestions for each task, all requests in flight at once
    ///
    /// Suggestions are appended to each task's existing subtasks. Duplicate
    /// ids in `task_ids` are only requested once.
    pub async fn breakdown(&mut self, task_ids: &[TaskId]) -> Result<Vec<BreakdownOutcome>, ActionError> {
        debug!(count = task_ids.len(), "breakdown: called");

        let mut seen = HashSet::new();
        let targets: Vec<(TaskId, Option<String>)> = task_ids
            .iter()
            .filter(|id| seen.insert(id.as_str()))
            .map(|id| (id.clone(), self.store.get(id).map(|t| t.title.clone())))
            .collect();

        let planner = &self.planner;
        let requests = &self.requests;
        let suggestions = join_all(targets.into_iter().map(|(task_id, title)| async move {
            let Some(title) = title else {
                return (task_id, Suggestion::Missing);
            };
            let Some(_guard) = requests.begin(RequestKey::Breakdown(task_id.clone())) else {
                return (task_id, Suggestion::Busy);
            };
            let steps = planner.plan_subtasks(&title).await;
            (task_id, Suggestion::Steps(steps))
        }))
        .await;

        let mut outcomes = Vec::with_capacity(suggestions.len());
        for (task_id, suggestion) in suggestions {
            let outcome = match suggestion {
                Suggestion::Missing => {
                    warn!(%task_id, "breakdown: no such task");
                    BreakdownOutcome::Missing { task_id }
                }
                Suggestion::Busy => BreakdownOutcome::Busy { task_id },
                Suggestion::Steps(steps) => {
                    let count = self.store.append_subtasks(&task_id, &steps)?;
                    BreakdownOutcome::Added { task_id, count }
                }
            };
            outcomes.push(outcome);
        }
        Ok(outcomes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Category, Priority, SequentialIds};
    use crate::llm::client::mock::{MockLlmClient, MockReply};
    use crate::llm::{GenerateRequest, GenerateResponse, LlmClient, LlmError};
    use crate::persistence::TaskSlot;
    use crate::persistence::mock::SwitchableStore;
    use crate::prompts::PromptLoader;
    use async_trait::async_trait;
    use kvstore::MemoryStore;

    fn workspace_with(llm: Option<Arc<dyn LlmClient>>) -> (Workspace, TaskSlot) {
        let slot = TaskSlot::new(Arc::new(MemoryStore::new()));
        let store = TaskStore::open(slot.clone(), Arc::new(SequentialIds::new("id")));
        let planner = PlanningClient::new(llm, PromptLoader::embedded_only());
        (Workspace::new(store, planner), slot)
    }

    #[test]
    fn test_tracker_guard_clears_on_drop() {
        let tracker = RequestTracker::new();
        let key = RequestKey::Breakdown("t1".to_string());

        let guard = tracker.begin(key.clone()).unwrap();
        assert_eq!(guard.key(), &key);
        assert!(tracker.is_pending(&key));
        assert!(tracker.begin(key.clone()).is_none());

        drop(guard);
        assert!(!tracker.is_pending(&key));
        assert!(tracker.pending().is_empty());
    }

    #[tokio::test]
    async fn test_plan_goal_camping_trip() {
        let mock = Arc::new(MockLlmClient::text(
            r#"{"tasks":[{"title":"Buy gear","priority":"High","category":"Personal","subtasks":["Buy tent","Buy sleeping bag"]}]}"#,
        ));
        let (mut ws, slot) = workspace_with(Some(mock));

        let ids = ws.plan_goal("Plan a 2-day camping trip").await.unwrap();
        assert_eq!(ids.len(), 1);

        let task = ws.store().get(&ids[0]).unwrap();
        assert_eq!(task.title, "Buy gear");
        assert_eq!(task.priority, Priority::High);
        assert_eq!(task.category, Category::Personal);
        assert!(!task.completed);
        let titles: Vec<_> = task.subtasks.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, ["Buy tent", "Buy sleeping bag"]);
        assert!(task.subtasks.iter().all(|s| !s.completed));
        assert_eq!(slot.load(), ws.store().tasks());
        assert!(!ws.requests().is_pending(&RequestKey::Goal));
    }

    #[tokio::test]
    async fn test_plan_goal_failure_leaves_store_unchanged() {
        let mock = Arc::new(MockLlmClient::text("Sure! Here's a plan..."));
        let (mut ws, slot) = workspace_with(Some(mock));
        ws.store_mut().create(TaskDraft::new("Existing")).unwrap();
        let before = ws.store().tasks().to_vec();

        let result = ws.plan_goal("Anything").await;
        assert!(matches!(result, Err(ActionError::Plan(PlanError::MalformedResponse(_)))));
        assert_eq!(ws.store().tasks(), before.as_slice());
        assert_eq!(slot.load(), before);
    }

    #[tokio::test]
    async fn test_plan_goal_without_credential() {
        let (mut ws, _) = workspace_with(None);
        let result = ws.plan_goal("Anything").await;
        assert!(matches!(result, Err(ActionError::Plan(PlanError::EmptyCredential))));
        assert!(ws.store().is_empty());
    }

    #[tokio::test]
    async fn test_breakdown_empty_suggestions_keep_subtasks() {
        let mock = Arc::new(MockLlmClient::text("[]"));
        let (mut ws, _) = workspace_with(Some(mock));
        let task = ws
            .store_mut()
            .create(TaskDraft::new("Clean garage").with_subtasks(["Sort", "Sweep"]))
            .unwrap();

        let outcomes = ws.breakdown(&[task.id.clone()]).await.unwrap();
        assert_eq!(
            outcomes,
            [BreakdownOutcome::Added {
                task_id: task.id.clone(),
                count: 0
            }]
        );
        assert_eq!(ws.store().get(&task.id).unwrap().subtasks, task.subtasks);
    }

    #[tokio::test]
    async fn test_breakdown_appends_and_reports_missing() {
        let mock = Arc::new(MockLlmClient::new(vec![MockReply::Text(
            r#"["Empty shelves", "Label bins"]"#.to_string(),
        )]));
        let (mut ws, _) = workspace_with(Some(mock.clone()));
        let task = ws
            .store_mut()
            .create(TaskDraft::new("Clean garage").with_subtasks(["Sort"]))
            .unwrap();

        let outcomes = ws
            .breakdown(&[task.id.clone(), "ghost".to_string(), task.id.clone()])
            .await
            .unwrap();
        assert_eq!(
            outcomes,
            [
                BreakdownOutcome::Added {
                    task_id: task.id.clone(),
                    count: 2
                },
                BreakdownOutcome::Missing {
                    task_id: "ghost".to_string()
                },
            ]
        );
        assert_eq!(mock.call_count(), 1);

        let titles: Vec<_> = ws
            .store()
            .get(&task.id)
            .unwrap()
            .subtasks
            .iter()
            .map(|s| s.title.as_str())
            .collect();
        assert_eq!(titles, ["Sort", "Empty shelves", "Label bins"]);
    }

    /// Blocks every call until `expected` calls are in flight together
    struct GatedClient {
        barrier: tokio::sync::Barrier,
        tracker: RequestTracker,
        observed: Mutex<Vec<usize>>,
    }

    #[async_trait]
    impl LlmClient for GatedClient {
        async fn generate(&self, _request: GenerateRequest) -> Result<GenerateResponse, LlmError> {
            self.barrier.wait().await;
            if let Ok(mut observed) = self.observed.lock() {
                observed.push(self.tracker.pending().len());
            }
            Ok(GenerateResponse::with_text(r#"["Step"]"#))
        }
    }

    #[tokio::test]
    async fn test_breakdown_requests_are_concurrent() {
        let tracker = RequestTracker::new();
        let client = Arc::new(GatedClient {
            barrier: tokio::sync::Barrier::new(2),
            tracker: tracker.clone(),
            observed: Mutex::new(Vec::new()),
        });

        let slot = TaskSlot::new(Arc::new(MemoryStore::new()));
        let mut ws = Workspace {
            store: TaskStore::open(slot, Arc::new(SequentialIds::new("id"))),
            planner: PlanningClient::new(Some(client.clone()), PromptLoader::embedded_only()),
            requests: tracker.clone(),
        };
        let a = ws.store_mut().create(TaskDraft::new("A")).unwrap();
        let b = ws.store_mut().create(TaskDraft::new("B")).unwrap();

        // Sequential requests would never get past the barrier
        let outcomes = tokio::time::timeout(
            std::time::Duration::from_secs(5),
            ws.breakdown(&[a.id.clone(), b.id.clone()]),
        )
        .await
        .expect("breakdown requests did not run concurrently")
        .unwrap();
        assert_eq!(outcomes.len(), 2);

        let observed = client.observed.lock().unwrap().clone();
        assert_eq!(observed.len(), 2);
        assert_eq!(observed.iter().max(), Some(&2));
        assert!(tracker.pending().is_empty());
        assert_eq!(ws.store().get(&a.id).unwrap().subtasks.len(), 1);
        assert_eq!(ws.store().get(&b.id).unwrap().subtasks.len(), 1);
    }

    #[tokio::test]
    async fn test_add_task_with_suggested_priority() {
        let mock = Arc::new(MockLlmClient::text("High"));
        let (mut ws, _) = workspace_with(Some(mock.clone()));

        let task = ws.add_task(TaskDraft::new("File taxes"), true).await.unwrap();
        assert_eq!(task.priority, Priority::High);

        let plain = ws
            .add_task(TaskDraft::new("Water plants").with_priority(Priority::Low), false)
            .await
            .unwrap();
        assert_eq!(plain.priority, Priority::Low);
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn test_add_task_rejects_blank_title() {
        let (mut ws, _) = workspace_with(None);
        let result = ws.add_task(TaskDraft::new("  "), true).await;
        assert!(matches!(result, Err(ActionError::Store(StoreError::EmptyTitle))));
    }

    #[tokio::test]
    async fn test_plan_goal_while_goal_pending_is_busy() {
        let mock = Arc::new(MockLlmClient::text("[]"));
        let (mut ws, _) = workspace_with(Some(mock.clone()));
        let tracker = ws.requests().clone();
        let _held = tracker.begin(RequestKey::Goal).unwrap();

        let result = ws.plan_goal("Anything").await;
        assert!(matches!(result, Err(ActionError::Busy(RequestKey::Goal))));
        assert_eq!(mock.call_count(), 0);
        assert!(ws.store().is_empty());
    }

    #[tokio::test]
    async fn test_plan_goal_write_failure_leaves_store_unchanged() {
        let kv = Arc::new(SwitchableStore::new());
        let slot = TaskSlot::new(kv.clone());
        let store = TaskStore::open(slot.clone(), Arc::new(SequentialIds::new("id")));
        let mock = Arc::new(MockLlmClient::text(
            r#"{"tasks":[{"title":"Pack","priority":"Low","category":"Personal","subtasks":[]}]}"#,
        ));
        let mut ws = Workspace::new(store, PlanningClient::new(Some(mock), PromptLoader::embedded_only()));
        ws.store_mut().create(TaskDraft::new("Existing")).unwrap();
        let before = ws.store().tasks().to_vec();

        kv.fail_writes(true);
        let result = ws.plan_goal("Go camping").await;
        assert!(matches!(result, Err(ActionError::Store(StoreError::Persist(_)))));
        assert_eq!(ws.store().tasks(), before.as_slice());
        assert_eq!(slot.load(), before);
    }

    #[test]
    fn test_tracker_survives_poisoned_lock() {
        let tracker = RequestTracker::new();
        let _guard = tracker.begin(RequestKey::Goal).unwrap();

        let shared = tracker.clone();
        let _ = std::thread::spawn(move || {
            let _lock = shared.pending.lock().unwrap();
            panic!("poison the tracker lock");
        })
        .join();

        assert!(tracker.pending.is_poisoned());
        assert!(tracker.is_pending(&RequestKey::Goal));
        assert_eq!(tracker.pending(), [RequestKey::Goal]);
        assert!(tracker.begin(RequestKey::Goal).is_none());
    }
}
