use crate::core::reminder::{NotificationDispatcher, ReminderRequest};
use crate::core::subscription::SubscriptionId;
use anyhow::{Result, bail};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;
use tracing::debug;

/// In-memory reminder queue. Used for dry runs and tests.
pub struct MemoryDispatcher {
    inner: Mutex<HashMap<SubscriptionId, ReminderRequest>>,
    failing: AtomicBool,
}

impl MemoryDispatcher {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(HashMap::new()),
            failing: AtomicBool::new(false),
        }
    }

    /// Makes every subsequent call fail, to simulate a dispatcher outage.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub async fn get(&self, id: &SubscriptionId) -> Option<ReminderRequest> {
        self.inner.lock().await.get(id).cloned()
    }

    /// Pending requests, earliest first.
    pub async fn pending(&self) -> Vec<ReminderRequest> {
        let mut pending: Vec<ReminderRequest> = self.inner.lock().await.values().cloned().collect();
        pending.sort_by(|a, b| a.fire_at.cmp(&b.fire_at).then_with(|| a.id.cmp(&b.id)));
        pending
    }
}

impl Default for MemoryDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NotificationDispatcher for MemoryDispatcher {
    async fn submit(&self, request: ReminderRequest) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            bail!("Dispatcher unavailable");
        }
        debug!("Queue PUT for id: {}", request.id);
        self.inner.lock().await.insert(request.id.clone(), request);
        Ok(())
    }

    async fn cancel(&self, id: &SubscriptionId) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            bail!("Dispatcher unavailable");
        }
        let removed = self.inner.lock().await.remove(id).is_some();
        debug!("Queue REMOVE for id: {} (present: {})", id, removed);
        Ok(())
    }
}
