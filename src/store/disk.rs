use crate::core::reminder::{NotificationDispatcher, ReminderRequest};
use crate::core::subscription::SubscriptionId;
use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use fjall::{Config, Keyspace, PartitionCreateOptions, PartitionHandle, PersistMode};
use std::path::Path;
use tracing::debug;

const PARTITION: &str = "pending";

/// Reminder queue persisted in a fjall keyspace, one JSON value per id.
pub struct DiskDispatcher {
    keyspace: Keyspace,
    partition: PartitionHandle,
}

impl DiskDispatcher {
    pub fn open(path: &Path) -> Result<Self> {
        std::fs::create_dir_all(path)
            .with_context(|| format!("Failed to create directory: {}", path.display()))?;

        let keyspace = Config::new(path)
            .open()
            .with_context(|| format!("Failed to open reminder queue at {}", path.display()))?;
        let partition = keyspace.open_partition(PARTITION, PartitionCreateOptions::default())?;
        debug!("Opened reminder queue at {}", path.display());
        Ok(Self {
            keyspace,
            partition,
        })
    }

    pub fn get(&self, id: &SubscriptionId) -> Result<Option<ReminderRequest>> {
        match self.partition.get(Self::key(id)?)? {
            Some(value) => Ok(Some(serde_json::from_slice(&value)?)),
            None => Ok(None),
        }
    }

    /// Pending requests, earliest first.
    pub fn pending(&self) -> Result<Vec<ReminderRequest>> {
        let mut pending = Vec::new();
        for item in self.partition.iter() {
            let (key, value) = item?;
            let request: ReminderRequest = serde_json::from_slice(&value).with_context(|| {
                format!(
                    "Corrupt reminder entry for {}",
                    String::from_utf8_lossy(&key)
                )
            })?;
            pending.push(request);
        }
        pending.sort_by(|a, b| a.fire_at.cmp(&b.fire_at).then_with(|| a.id.cmp(&b.id)));
        Ok(pending)
    }

    fn key(id: &SubscriptionId) -> Result<&[u8]> {
        if id.as_str().is_empty() {
            bail!("Reminder id may not be empty");
        }
        Ok(id.as_str().as_bytes())
    }

    fn persist(&self) -> Result<()> {
        self.keyspace.persist(PersistMode::SyncAll)?;
        Ok(())
    }
}

#[async_trait]
impl NotificationDispatcher for DiskDispatcher {
    async fn submit(&self, request: ReminderRequest) -> Result<()> {
        let key = Self::key(&request.id)?;
        let value = serde_json::to_vec(&request)?;
        self.partition.insert(key, value)?;
        self.persist()?;
        debug!("Queue PUT for id: {}", request.id);
        Ok(())
    }

    async fn cancel(&self, id: &SubscriptionId) -> Result<()> {
        self.partition.remove(Self::key(id)?)?;
        self.persist()?;
        debug!("Queue REMOVE for id: {}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use tempfile::tempdir;

    fn request(id: &str, day: u32) -> ReminderRequest {
        ReminderRequest {
            id: SubscriptionId::from(id),
            fire_at: Utc.with_ymd_and_hms(2026, 11, day, 9, 0, 0).unwrap(),
            title: "Payment reminder".to_string(),
            body: format!("Upcoming charge for {id}."),
        }
    }

    #[tokio::test]
    async fn test_disk_queue_submit_replace_cancel() {
        let dir = tempdir().unwrap();
        let queue = DiskDispatcher::open(dir.path()).unwrap();

        assert!(queue.pending().unwrap().is_empty());

        queue.submit(request("a", 5)).await.unwrap();
        queue.submit(request("b", 2)).await.unwrap();
        queue.submit(request("a", 7)).await.unwrap();

        let pending = queue.pending().unwrap();
        assert_eq!(pending, vec![request("b", 2), request("a", 7)]);

        queue.cancel(&SubscriptionId::from("b")).await.unwrap();
        queue.cancel(&SubscriptionId::from("missing")).await.unwrap();

        assert!(queue.get(&SubscriptionId::from("b")).unwrap().is_none());
        assert_eq!(queue.pending().unwrap(), vec![request("a", 7)]);
    }

    #[tokio::test]
    async fn test_disk_queue_rejects_empty_id() {
        let dir = tempdir().unwrap();
        let queue = DiskDispatcher::open(dir.path()).unwrap();

        assert!(queue.submit(request("", 5)).await.is_err());
        assert!(queue.cancel(&SubscriptionId::from("")).await.is_err());
        assert!(queue.get(&SubscriptionId::from("")).is_err());
        assert!(queue.pending().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_scheduler_reports_failure_for_empty_id() {
        use crate::core::currency::Currency;
        use crate::core::reminder::{ReminderOutcome, ReminderScheduler, ReminderSettings};
        use crate::core::subscription::{BillingCycle, SubscriptionRecord};
        use std::sync::Arc;

        let dir = tempdir().unwrap();
        let queue = Arc::new(DiskDispatcher::open(dir.path()).unwrap());
        let scheduler = ReminderScheduler::new(queue.clone(), ReminderSettings::default())
            .with_clock(|| Utc.with_ymd_and_hms(2026, 10, 18, 0, 0, 0).unwrap());

        let mut record =
            SubscriptionRecord::new("", "Music", 4.99, Currency::Usd, BillingCycle::Monthly);
        record.next_billing_date = Some(Utc.with_ymd_and_hms(2026, 11, 17, 0, 0, 0).unwrap());

        assert_eq!(
            scheduler.schedule_reminder(&record).await,
            ReminderOutcome::Failed
        );
        assert!(queue.pending().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_disk_queue_survives_reopen() {
        let dir = tempdir().unwrap();
        {
            let queue = DiskDispatcher::open(dir.path()).unwrap();
            queue.submit(request("a", 5)).await.unwrap();
        }

        let queue = DiskDispatcher::open(dir.path()).unwrap();
        assert_eq!(
            queue.get(&SubscriptionId::from("a")).unwrap(),
            Some(request("a", 5))
        );
    }
}
