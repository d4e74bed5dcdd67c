//! Display ordering for subscription lists.
use crate::core::subscription::SubscriptionRecord;

/// Active subscriptions whose name contains `search` (case-insensitive),
/// pinned first, then newest first. Records without a creation time sort last.
pub fn active_listing<'a>(
    records: &'a [SubscriptionRecord],
    search: Option<&str>,
) -> Vec<&'a SubscriptionRecord> {
    let needle = search
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty());

    let mut listing: Vec<&SubscriptionRecord> = records
        .iter()
        .filter(|r| r.is_active)
        .filter(|r| {
            needle
                .as_deref()
                .is_none_or(|n| r.name.to_lowercase().contains(n))
        })
        .collect();
    listing.sort_by(|a, b| {
        b.is_pinned
            .cmp(&a.is_pinned)
            .then_with(|| b.created_at.cmp(&a.created_at))
    });
    listing
}

/// Archived subscriptions, most recently changed first.
pub fn archived_listing(records: &[SubscriptionRecord]) -> Vec<&SubscriptionRecord> {
    let mut listing: Vec<&SubscriptionRecord> = records.iter().filter(|r| !r.is_active).collect();
    listing.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
    listing
}
