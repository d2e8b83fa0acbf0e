//! Test Kit
//!
//! In-memory backend, readiness slot and recording sink for driving the
//! controller on a paused tokio clock.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;
use std::time::Duration;

use async_trait::async_trait;
use futures::channel::oneshot;
use futures::future::LocalBoxFuture;
use futures::FutureExt;

use crate::backend::{Backend, BackendHandle, OpResult};
use crate::browser::ResourceBrowser;
use crate::components::{Connectivity, Prompt, ReadinessSlot};
use crate::config::BrowserConfig;
use crate::context::{Notice, ViewSink};
use crate::error::{BackendError, BackendResult};
use crate::models::{Collection, CollectionId, Item, ItemId, NodeKey, SubCollection, SubCollectionId};
use crate::platform::sleep;

// ========================
// Fake backend
// ========================

#[derive(Default)]
struct FakeDb {
    next_id: u32,
    collections: Vec<Collection>,
    sub_collections: Vec<SubCollection>,
    items: Vec<Item>,
}

impl FakeDb {
    fn next_id(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Default)]
struct FakeState {
    db: RefCell<FakeDb>,
    calls: RefCell<Vec<String>>,
    failures: RefCell<HashMap<&'static str, VecDeque<BackendError>>>,
    results: RefCell<HashMap<&'static str, VecDeque<OpResult>>>,
    delays: RefCell<HashMap<&'static str, VecDeque<Duration>>>,
}

/// Backend over an in-memory database. Answers are computed when the call
/// is made and delivered after an optional per-call delay, so a slow call
/// returns the data as it was when issued.
#[derive(Clone, Default)]
pub struct FakeBackend {
    state: Rc<FakeState>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle(&self) -> BackendHandle {
        Rc::new(self.clone())
    }

    // Seeding (not logged as calls)

    pub fn seed_collection(&self, name: &str) -> CollectionId {
        let mut db = self.state.db.borrow_mut();
        let id = CollectionId(db.next_id());
        db.collections.push(Collection { id, name: name.to_string() });
        id
    }

    pub fn seed_sub_collection(&self, collection_id: CollectionId, name: &str) -> SubCollectionId {
        let mut db = self.state.db.borrow_mut();
        let id = SubCollectionId(db.next_id());
        db.sub_collections.push(SubCollection { id, name: name.to_string(), collection_id });
        id
    }

    pub fn seed_item(&self, sub_collection_id: SubCollectionId, content: &str) -> ItemId {
        let mut db = self.state.db.borrow_mut();
        let id = ItemId(db.next_id());
        db.items.push(Item { id, content: content.to_string(), sub_collection_id });
        id
    }

    /// Change the database behind the controller's back
    pub fn rename_collection(&self, id: CollectionId, name: &str) {
        let mut db = self.state.db.borrow_mut();
        if let Some(c) = db.collections.iter_mut().find(|c| c.id == id) {
            c.name = name.to_string();
        }
    }

    pub fn item_content(&self, id: ItemId) -> Option<String> {
        self.state.db.borrow().items.iter().find(|i| i.id == id).map(|i| i.content.clone())
    }

    // Scripting

    /// Next call of `op` fails with `err`
    pub fn fail_next(&self, op: &'static str, err: BackendError) {
        self.state.failures.borrow_mut().entry(op).or_default().push_back(err);
    }

    /// Next mutating call of `op` answers `result` without touching the database
    pub fn answer_next(&self, op: &'static str, result: OpResult) {
        self.state.results.borrow_mut().entry(op).or_default().push_back(result);
    }

    /// Next call of `op` answers after `delay`
    pub fn delay_next(&self, op: &'static str, delay: Duration) {
        self.state.delays.borrow_mut().entry(op).or_default().push_back(delay);
    }

    // Inspection

    pub fn calls(&self) -> Vec<String> {
        self.state.calls.borrow().clone()
    }

    pub fn call_count(&self, op: &str) -> usize {
        let prefix = format!("{}(", op);
        self.state.calls.borrow().iter().filter(|c| c.starts_with(&prefix)).count()
    }

    pub fn total_calls(&self) -> usize {
        self.state.calls.borrow().len()
    }

    fn enter(&self, op: &'static str, args: String) -> (Option<BackendError>, Option<Duration>) {
        self.state.calls.borrow_mut().push(format!("{}({})", op, args));
        let failure = self.state.failures.borrow_mut().get_mut(op).and_then(|q| q.pop_front());
        let delay = self.state.delays.borrow_mut().get_mut(op).and_then(|q| q.pop_front());
        (failure, delay)
    }

    async fn respond<T>(&self, op: &'static str, args: String, answer: impl FnOnce(&mut FakeDb) -> T) -> BackendResult<T> {
        let (failure, delay) = self.enter(op, args);
        let result = match failure {
            Some(err) => Err(err),
            None => Ok(answer(&mut *self.state.db.borrow_mut())),
        };
        if let Some(delay) = delay {
            sleep(delay).await;
        }
        result
    }

    async fn mutate(
        &self,
        op: &'static str,
        args: String,
        apply: impl FnOnce(&mut FakeDb) -> OpResult,
    ) -> BackendResult<OpResult> {
        let scripted = self.state.results.borrow_mut().get_mut(op).and_then(|q| q.pop_front());
        match scripted {
            Some(result) => self.respond(op, args, |_| result).await,
            None => self.respond(op, args, apply).await,
        }
    }
}

#[async_trait(?Send)]
impl Backend for FakeBackend {
    async fn list_collections(&self) -> BackendResult<Vec<Collection>> {
        self.respond("list_collections", String::new(), |db| db.collections.clone()).await
    }

    async fn get_collection(&self, id: CollectionId) -> BackendResult<Option<Collection>> {
        self.respond("get_collection", id.to_string(), |db| db.collections.iter().find(|c| c.id == id).cloned())
            .await
    }

    async fn list_subcollections(&self, collection_id: CollectionId) -> BackendResult<Vec<SubCollection>> {
        self.respond("list_subcollections", collection_id.to_string(), |db| {
            db.sub_collections.iter().filter(|s| s.collection_id == collection_id).cloned().collect()
        })
        .await
    }

    async fn list_items(&self, sub_collection_id: SubCollectionId) -> BackendResult<Vec<Item>> {
        self.respond("list_items", sub_collection_id.to_string(), |db| {
            db.items.iter().filter(|i| i.sub_collection_id == sub_collection_id).cloned().collect()
        })
        .await
    }

    async fn create_collection(&self, name: &str) -> BackendResult<OpResult> {
        let name = name.to_string();
        self.mutate("create_collection", name.clone(), move |db| {
            let id = CollectionId(db.next_id());
            db.collections.push(Collection { id, name });
            OpResult::ok()
        })
        .await
    }

    async fn create_subcollection(&self, name: &str, collection_id: CollectionId) -> BackendResult<OpResult> {
        let name = name.to_string();
        self.mutate("create_subcollection", format!("{}, {}", name, collection_id), move |db| {
            if !db.collections.iter().any(|c| c.id == collection_id) {
                return OpResult::failed("collection not found");
            }
            let id = SubCollectionId(db.next_id());
            db.sub_collections.push(SubCollection { id, name, collection_id });
            OpResult::ok()
        })
        .await
    }

    async fn create_item(&self, content: &str, sub_collection_id: SubCollectionId) -> BackendResult<OpResult> {
        let content = content.to_string();
        self.mutate("create_item", format!("{}", sub_collection_id), move |db| {
            if !db.sub_collections.iter().any(|s| s.id == sub_collection_id) {
                return OpResult::failed("sub-collection not found");
            }
            let id = ItemId(db.next_id());
            db.items.push(Item { id, content, sub_collection_id });
            OpResult::ok()
        })
        .await
    }

    async fn update_item(&self, id: ItemId, content: &str) -> BackendResult<OpResult> {
        let content = content.to_string();
        self.mutate("update_item", id.to_string(), move |db| match db.items.iter_mut().find(|i| i.id == id) {
            Some(item) => {
                item.content = content;
                OpResult::ok()
            }
            None => OpResult::failed("item not found"),
        })
        .await
    }

    async fn delete_collection(&self, id: CollectionId) -> BackendResult<OpResult> {
        self.mutate("delete_collection", id.to_string(), move |db| {
            let subs: Vec<SubCollectionId> =
                db.sub_collections.iter().filter(|s| s.collection_id == id).map(|s| s.id).collect();
            db.items.retain(|i| !subs.contains(&i.sub_collection_id));
            db.sub_collections.retain(|s| s.collection_id != id);
            db.collections.retain(|c| c.id != id);
            OpResult::ok()
        })
        .await
    }

    async fn delete_subcollection(&self, id: SubCollectionId) -> BackendResult<OpResult> {
        self.mutate("delete_subcollection", id.to_string(), move |db| {
            db.items.retain(|i| i.sub_collection_id != id);
            db.sub_collections.retain(|s| s.id != id);
            OpResult::ok()
        })
        .await
    }

    async fn delete_item(&self, id: ItemId) -> BackendResult<OpResult> {
        self.mutate("delete_item", id.to_string(), move |db| {
            db.items.retain(|i| i.id != id);
            OpResult::ok()
        })
        .await
    }

    async fn build_export(&self, collection_id: CollectionId, filename: &str) -> BackendResult<OpResult> {
        let filename = if filename.is_empty() { format!("collection-{}", collection_id) } else { filename.to_string() };
        self.mutate("build_export", format!("{}, {}", collection_id, filename), move |db| {
            if !db.collections.iter().any(|c| c.id == collection_id) {
                return OpResult::failed("collection not found");
            }
            OpResult { success: true, message: None, path: Some(format!("/exports/{}.pdf", filename)) }
        })
        .await
    }
}

// ========================
// Readiness slot
// ========================

#[derive(Default)]
pub struct FakeSlot {
    handle: RefCell<Option<BackendHandle>>,
    listeners: RefCell<Vec<oneshot::Sender<()>>>,
}

impl FakeSlot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with(handle: BackendHandle) -> Self {
        let slot = Self::default();
        slot.populate(handle);
        slot
    }

    pub fn populate(&self, handle: BackendHandle) {
        *self.handle.borrow_mut() = Some(handle);
    }

    pub fn clear(&self) {
        self.handle.borrow_mut().take();
    }

    /// Fire the readiness notification
    pub fn notify(&self) {
        for listener in self.listeners.borrow_mut().drain(..) {
            let _ = listener.send(());
        }
    }
}

impl ReadinessSlot for FakeSlot {
    fn probe(&self) -> Option<BackendHandle> {
        self.handle.borrow().clone()
    }

    fn notified(&self) -> LocalBoxFuture<'static, ()> {
        let (tx, rx) = oneshot::channel();
        self.listeners.borrow_mut().push(tx);
        async move {
            let _ = rx.await;
        }
        .boxed_local()
    }
}

// ========================
// Recording sink
// ========================

#[derive(Default)]
pub struct RecordingSink {
    pub rerenders: RefCell<Vec<NodeKey>>,
    pub toasts: RefCell<Vec<Notice>>,
    pub statuses: RefCell<Vec<Connectivity>>,
    pub prompts: RefCell<Vec<Option<Prompt>>>,
}

impl RecordingSink {
    pub fn rerendered(&self, key: NodeKey) -> bool {
        self.rerenders.borrow().contains(&key)
    }

    pub fn last_toast(&self) -> Option<Notice> {
        self.toasts.borrow().last().cloned()
    }

    pub fn error_toasts(&self) -> usize {
        self.toasts.borrow().iter().filter(|t| t.is_error()).count()
    }

    pub fn clear(&self) {
        self.rerenders.borrow_mut().clear();
        self.toasts.borrow_mut().clear();
    }
}

impl ViewSink for RecordingSink {
    fn rerender(&self, key: NodeKey) {
        self.rerenders.borrow_mut().push(key);
    }

    fn toast(&self, notice: Notice) {
        self.toasts.borrow_mut().push(notice);
    }

    fn status_changed(&self, status: Connectivity) {
        self.statuses.borrow_mut().push(status);
    }

    fn prompt_changed(&self, prompt: Option<Prompt>) {
        self.prompts.borrow_mut().push(prompt);
    }
}

// ========================
// Harness
// ========================

pub fn test_config() -> BrowserConfig {
    BrowserConfig {
        poll_interval_ms: 100,
        bind_timeout_ms: 1_000,
        background_bind_timeout_ms: 3_000,
        log_level: "debug".to_string(),
        ..Default::default()
    }
}

/// Browser wired to `backend` through a slot that is already populated
pub fn bound_browser(backend: &FakeBackend) -> (ResourceBrowser, Rc<RecordingSink>) {
    let slot = Rc::new(FakeSlot::with(backend.handle()));
    browser_with_slot(slot)
}

pub fn browser_with_slot(slot: Rc<FakeSlot>) -> (ResourceBrowser, Rc<RecordingSink>) {
    let _ = browser_logger::init(browser_logger::parse_level(&test_config().log_level));
    let sink = Rc::new(RecordingSink::default());
    let browser = ResourceBrowser::new(test_config(), slot, sink.clone());
    (browser, sink)
}

/// Let timers up to `ms` fire and spawned tasks run
pub async fn settle(ms: u64) {
    sleep(Duration::from_millis(ms)).await;
}
