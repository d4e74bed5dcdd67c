use super::ui;
use crate::core::config::AppConfig;
use crate::core::reminder::{
    NotificationDispatcher, ReminderOutcome, ReminderRequest, ReminderScheduler, ReminderSettings,
};
use crate::core::subscription::{SubscriptionId, SubscriptionRecord};
use crate::store::{self, MemoryDispatcher};
use anyhow::{Result, bail};
use comfy_table::Cell;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info};

fn format_instant(instant: chrono::DateTime<chrono::Utc>, settings: &ReminderSettings) -> String {
    instant
        .with_timezone(&settings.timezone)
        .format("%Y-%m-%d %H:%M %Z")
        .to_string()
}

pub fn outcomes_as_table(
    records: &[SubscriptionRecord],
    outcomes: &[(SubscriptionId, ReminderOutcome)],
    settings: &ReminderSettings,
) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Subscription"),
        ui::header_cell("Status"),
        ui::header_cell("Fires At"),
    ]);

    for (id, outcome) in outcomes {
        let name = records
            .iter()
            .find(|r| &r.id == id)
            .map_or_else(|| id.to_string(), |r| r.name.clone());
        let (status, fires_at) = match outcome {
            ReminderOutcome::Scheduled(at) => {
                (ui::status_cell("scheduled", false), Cell::new(format_instant(*at, settings)))
            }
            ReminderOutcome::Cleared => (ui::status_cell("none", false), Cell::new("-")),
            ReminderOutcome::Failed => (ui::status_cell("failed", true), Cell::new("-")),
        };
        table.add_row(vec![Cell::new(name), status, fires_at]);
    }

    table.to_string()
}

pub fn pending_as_table(pending: &[ReminderRequest], settings: &ReminderSettings) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Id"),
        ui::header_cell("Fires At"),
        ui::header_cell("Message"),
    ]);
    for request in pending {
        table.add_row(vec![
            Cell::new(request.id.to_string()),
            Cell::new(format_instant(request.fire_at, settings)),
            Cell::new(&request.body),
        ]);
    }
    table.to_string()
}

/// Brings the queue in line with `records` and cancels entries whose
/// subscription no longer exists.
pub async fn reconcile(
    scheduler: &ReminderScheduler,
    records: &[SubscriptionRecord],
    queued: &[SubscriptionId],
) -> Vec<(SubscriptionId, ReminderOutcome)> {
    let pb = ui::new_progress_bar(records.len() as u64, true);
    pb.set_message("Scheduling reminders...");
    let mut outcomes = scheduler.sync_all(records, &|| pb.inc(1)).await;
    pb.finish_and_clear();

    let known: HashSet<&SubscriptionId> = records.iter().map(|r| &r.id).collect();
    for id in queued.iter().filter(|id| !known.contains(id)) {
        debug!(%id, "Removing reminder for deleted subscription");
        let outcome = scheduler.cancel_reminder(id).await;
        outcomes.push((id.clone(), outcome));
    }
    outcomes
}

pub async fn sync(config: &AppConfig, dry_run: bool) -> Result<()> {
    let records = config.records();
    let settings = config.reminder_settings()?;

    let (dispatcher, queued): (Arc<dyn NotificationDispatcher>, Vec<SubscriptionId>) = if dry_run
    {
        info!("Dry run, reminders are not persisted");
        let memory: Arc<dyn NotificationDispatcher> = Arc::new(MemoryDispatcher::new());
        (memory, Vec::new())
    } else {
        let queue = store::open_reminder_queue(config)?;
        let queued = queue.pending()?.into_iter().map(|r| r.id).collect();
        let disk: Arc<dyn NotificationDispatcher> = Arc::new(queue);
        (disk, queued)
    };

    let scheduler = ReminderScheduler::new(dispatcher, settings);
    let outcomes = reconcile(&scheduler, &records, &queued).await;

    println!("{}", outcomes_as_table(&records, &outcomes, &settings));

    let failed = outcomes
        .iter()
        .filter(|(_, o)| *o == ReminderOutcome::Failed)
        .count();
    if failed > 0 {
        println!(
            "\n{}",
            ui::style_text(
                &format!("{failed} reminder(s) could not be updated"),
                ui::StyleType::Error
            )
        );
    }
    Ok(())
}

pub fn list(config: &AppConfig) -> Result<()> {
    let settings = config.reminder_settings()?;
    let queue = store::open_reminder_queue(config)?;
    let pending = queue.pending()?;

    if pending.is_empty() {
        println!(
            "{}",
            ui::style_text("No pending reminders.", ui::StyleType::Subtle)
        );
        return Ok(());
    }

    println!("{}", pending_as_table(&pending, &settings));
    Ok(())
}

pub async fn cancel(config: &AppConfig, id: &str) -> Result<()> {
    let settings = config.reminder_settings()?;
    let queue = store::open_reminder_queue(config)?;
    let scheduler = ReminderScheduler::new(Arc::new(queue), settings);

    let id = SubscriptionId::from(id);
    if scheduler.cancel_reminder(&id).await == ReminderOutcome::Failed {
        bail!("Failed to cancel reminder for {id}");
    }
    println!("Reminder for {} cleared", ui::style_text(id.as_str(), ui::StyleType::TotalLabel));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::currency::Currency;
    use crate::core::subscription::BillingCycle;
    use chrono::{DateTime, TimeZone, Utc};

    fn record(id: &str, billing_day: Option<u32>) -> SubscriptionRecord {
        let mut r = SubscriptionRecord::new(
            id,
            id.to_uppercase(),
            5.0,
            Currency::Gbp,
            BillingCycle::Monthly,
        );
        r.next_billing_date =
            billing_day.map(|d| Utc.with_ymd_and_hms(2026, 11, d, 0, 0, 0).unwrap());
        r
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 18, 0, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_reconcile_cancels_deleted_subscriptions() {
        let dispatcher = Arc::new(MemoryDispatcher::new());
        let scheduler = ReminderScheduler::new(dispatcher.clone(), ReminderSettings::default())
            .with_clock(now);

        let before = vec![record("kept", Some(10)), record("deleted", Some(12))];
        reconcile(&scheduler, &before, &[]).await;
        assert_eq!(dispatcher.pending().await.len(), 2);

        let queued: Vec<SubscriptionId> =
            dispatcher.pending().await.into_iter().map(|r| r.id).collect();
        let after = vec![record("kept", Some(10))];
        let outcomes = reconcile(&scheduler, &after, &queued).await;

        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[1], (SubscriptionId::from("deleted"), ReminderOutcome::Cleared));
        let pending = dispatcher.pending().await;
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id.as_str(), "kept");
    }

    #[test]
    fn test_outcomes_table() {
        let records = vec![record("a", Some(10)), record("b", None)];
        let outcomes = vec![
            (
                SubscriptionId::from("a"),
                ReminderOutcome::Scheduled(Utc.with_ymd_and_hms(2026, 11, 8, 9, 0, 0).unwrap()),
            ),
            (SubscriptionId::from("b"), ReminderOutcome::Cleared),
            (SubscriptionId::from("gone"), ReminderOutcome::Failed),
        ];

        let output = outcomes_as_table(&records, &outcomes, &ReminderSettings::default());

        assert!(output.contains("scheduled"));
        assert!(output.contains("2026-11-08 09:00 UTC"));
        assert!(output.contains("none"));
        assert!(output.contains("gone"));
        assert!(output.contains("failed"));
    }
}
