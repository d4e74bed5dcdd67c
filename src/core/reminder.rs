//! Reminder scheduling for upcoming renewals.
//!
//! The instant a reminder fires is derived from the billing date, the
//! record's lead time and an explicit [`ReminderSettings`]. Delivery is left to
//! a [`NotificationDispatcher`] injected into the [`ReminderScheduler`].

use crate::core::config::ReminderConfig;
use crate::core::subscription::{SubscriptionId, SubscriptionRecord};
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Days, Duration, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const REMINDER_TITLE: &str = "Payment reminder";

const DEFAULT_TIME_OF_DAY: NaiveTime = match NaiveTime::from_hms_opt(9, 0, 0) {
    Some(time) => time,
    None => panic!("09:00 is a valid time"),
};

/// Local time zone and time of day at which reminders fire.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReminderSettings {
    pub timezone: Tz,
    pub time_of_day: NaiveTime,
}

impl Default for ReminderSettings {
    fn default() -> Self {
        Self {
            timezone: Tz::UTC,
            time_of_day: DEFAULT_TIME_OF_DAY,
        }
    }
}

impl TryFrom<&ReminderConfig> for ReminderSettings {
    type Error = anyhow::Error;

    fn try_from(config: &ReminderConfig) -> Result<Self> {
        let timezone: Tz = config
            .timezone
            .parse()
            .map_err(|e| anyhow!("Invalid timezone {:?}: {}", config.timezone, e))?;
        let time_of_day = NaiveTime::parse_from_str(&config.time_of_day, "%H:%M")
            .with_context(|| format!("Invalid reminder time of day: {:?}", config.time_of_day))?;
        Ok(Self {
            timezone,
            time_of_day,
        })
    }
}

/// Instant at which the reminder for `record` should fire.
///
/// The billing instant is read in the configured time zone, moved back by the
/// lead time in calendar days, and pinned to the configured time of day.
/// Returns `None` when the record has no billing date. Past instants are
/// returned as-is.
pub fn compute_reminder_instant(
    record: &SubscriptionRecord,
    settings: &ReminderSettings,
) -> Option<DateTime<Utc>> {
    let billing = record.next_billing_date?;
    let tz = settings.timezone;

    let reminder_date = billing
        .with_timezone(&tz)
        .date_naive()
        .checked_sub_days(Days::new(record.reminder_lead.days().unsigned_abs()))?;
    let local = reminder_date.and_time(settings.time_of_day);

    // Ambiguous times take the earlier instant; times skipped by a DST
    // transition move forward an hour.
    let fire_at = tz
        .from_local_datetime(&local)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(local + Duration::hours(1))).earliest())?;
    Some(fire_at.with_timezone(&Utc))
}

/// Body text of the reminder notification for `record`.
pub fn reminder_body(record: &SubscriptionRecord) -> String {
    let name = if record.name.trim().is_empty() {
        "subscription"
    } else {
        record.name.as_str()
    };
    format!("Upcoming charge of {} for {}.", record.price_label(), name)
}

/// A scheduled local notification, keyed by subscription id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReminderRequest {
    pub id: SubscriptionId,
    pub fire_at: DateTime<Utc>,
    pub title: String,
    pub body: String,
}

impl ReminderRequest {
    pub fn for_record(record: &SubscriptionRecord, fire_at: DateTime<Utc>) -> Self {
        Self {
            id: record.id.clone(),
            fire_at,
            title: REMINDER_TITLE.to_string(),
            body: reminder_body(record),
        }
    }
}

/// Receives scheduling requests. Implementations own delivery.
#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    /// Inserts `request`, replacing any pending request with the same id.
    async fn submit(&self, request: ReminderRequest) -> Result<()>;

    /// Removes the pending request for `id`. Succeeds if there is none.
    async fn cancel(&self, id: &SubscriptionId) -> Result<()>;
}

/// What the scheduler asked the dispatcher to do for one subscription.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReminderOutcome {
    Scheduled(DateTime<Utc>),
    Cleared,
    /// The dispatcher rejected the request. Already logged.
    Failed,
}

type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

pub struct ReminderScheduler {
    dispatcher: Arc<dyn NotificationDispatcher>,
    settings: ReminderSettings,
    clock: Clock,
}

impl ReminderScheduler {
    pub fn new(dispatcher: Arc<dyn NotificationDispatcher>, settings: ReminderSettings) -> Self {
        Self {
            dispatcher,
            settings,
            clock: Arc::new(Utc::now),
        }
    }

    /// Replaces the wall clock used to decide whether a reminder is still due.
    pub fn with_clock(mut self, clock: impl Fn() -> DateTime<Utc> + Send + Sync + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Upserts the reminder for `record`.
    ///
    /// Archived records, records without a billing date and reminders that
    /// would fire at or before now are cancelled instead, so the dispatcher
    /// never holds a stale entry for them.
    pub async fn schedule_reminder(&self, record: &SubscriptionRecord) -> ReminderOutcome {
        let fire_at = if record.is_active {
            compute_reminder_instant(record, &self.settings)
        } else {
            None
        };
        let now = (self.clock)();

        match fire_at {
            Some(fire_at) if fire_at > now => {
                let request = ReminderRequest::for_record(record, fire_at);
                match self.dispatcher.submit(request).await {
                    Ok(()) => {
                        info!(id = %record.id, %fire_at, "Reminder scheduled");
                        ReminderOutcome::Scheduled(fire_at)
                    }
                    Err(e) => {
                        warn!(id = %record.id, error = %e, "Failed to schedule reminder");
                        ReminderOutcome::Failed
                    }
                }
            }
            Some(fire_at) => {
                debug!(id = %record.id, %fire_at, %now, "Reminder instant has passed");
                self.cancel_reminder(&record.id).await
            }
            None => {
                debug!(id = %record.id, active = record.is_active, "No reminder due");
                self.cancel_reminder(&record.id).await
            }
        }
    }

    /// Drops any pending reminder for `id`. Unknown ids are not an error.
    pub async fn cancel_reminder(&self, id: &SubscriptionId) -> ReminderOutcome {
        match self.dispatcher.cancel(id).await {
            Ok(()) => {
                debug!(%id, "Reminder cleared");
                ReminderOutcome::Cleared
            }
            Err(e) => {
                warn!(%id, error = %e, "Failed to cancel reminder");
                ReminderOutcome::Failed
            }
        }
    }

    /// Schedules every record concurrently. `update_callback` runs once per
    /// record as its request completes.
    pub async fn sync_all(
        &self,
        records: &[SubscriptionRecord],
        update_callback: &(dyn Fn() + Sync),
    ) -> Vec<(SubscriptionId, ReminderOutcome)> {
        let futures = records.iter().map(|record| async move {
            let outcome = self.schedule_reminder(record).await;
            update_callback();
            (record.id.clone(), outcome)
        });
        join_all(futures).await
    }
}
