//! Normalizes subscriptions to monthly USD figures and aggregates them.
//!
//! Aggregates consider only active records with a positive price. The
//! filtering happens here rather than at the storage layer, so callers may
//! pass the full record set including archived subscriptions.
use crate::core::subscription::{Category, SubscriptionId, SubscriptionRecord};
use tracing::debug;

/// Monthly spend attributed to one category.
#[derive(Debug, Clone, PartialEq)]
pub struct CategorySpend {
    pub category: Category,
    pub amount: f64,
}

impl CategorySpend {
    /// Share of `total` in percent, unrounded. Zero when `total` is zero.
    pub fn percentage_of(&self, total: f64) -> f64 {
        if total > 0.0 {
            self.amount / total * 100.0
        } else {
            0.0
        }
    }

    /// Whether the share is large enough to be worth labelling. Only shares
    /// below 1% are suppressed, so exactly 1% is still labelled.
    pub fn is_significant(&self, total: f64) -> bool {
        self.percentage_of(total) >= 1.0
    }
}

/// Monthly cost of a single subscription.
#[derive(Debug, Clone, PartialEq)]
pub struct SubscriptionMonthlyValue {
    pub id: SubscriptionId,
    pub name: String,
    pub monthly_usd: f64,
}

/// Everything the analytics view needs, computed from one record set.
#[derive(Debug, Clone)]
pub struct SpendingReport {
    pub total_monthly: f64,
    pub by_category: Vec<CategorySpend>,
    pub by_subscription: Vec<SubscriptionMonthlyValue>,
    pub active_count: usize,
    pub archived_count: usize,
}

impl SpendingReport {
    pub fn build(records: &[SubscriptionRecord]) -> Self {
        let active_count = records.iter().filter(|r| r.is_active).count();
        let report = Self {
            total_monthly: total_monthly_spend(records),
            by_category: spending_by_category(records),
            by_subscription: monthly_values(records),
            active_count,
            archived_count: records.len() - active_count,
        };
        debug!(
            "Built spending report: total={:.2}, categories={}, active={}, archived={}",
            report.total_monthly,
            report.by_category.len(),
            report.active_count,
            report.archived_count
        );
        report
    }

    pub fn yearly_total(&self) -> f64 {
        self.total_monthly * 12.0
    }
}

fn has_price(record: &SubscriptionRecord) -> bool {
    record.price.is_finite() && record.price > 0.0
}

fn contributes(record: &SubscriptionRecord) -> bool {
    record.is_active && has_price(record)
}

/// Price converted to USD and scaled to one month. Prices that are not
/// positive and finite (including NaN) count as 0.
pub fn monthly_equivalent(record: &SubscriptionRecord) -> f64 {
    if !has_price(record) {
        return 0.0;
    }
    let amount_usd = record.price * record.currency.rate_to_usd();
    record.billing_cycle.to_monthly(amount_usd)
}

pub fn total_monthly_spend(records: &[SubscriptionRecord]) -> f64 {
    records
        .iter()
        .filter(|r| contributes(r))
        .map(monthly_equivalent)
        .sum()
}

/// Monthly spend per category, largest first.
///
/// Every category with at least one active record is listed, even when its
/// total is zero. Equal amounts keep the order in which their categories
/// first appear in `records`.
pub fn spending_by_category(records: &[SubscriptionRecord]) -> Vec<CategorySpend> {
    let mut spends: Vec<CategorySpend> = Vec::new();

    for record in records.iter().filter(|r| r.is_active) {
        let amount = if contributes(record) {
            monthly_equivalent(record)
        } else {
            0.0
        };
        match spends.iter_mut().find(|s| s.category == record.category) {
            Some(spend) => spend.amount += amount,
            None => spends.push(CategorySpend {
                category: record.category,
                amount,
            }),
        }
    }

    // Stable sort keeps first-seen order on ties.
    spends.sort_by(|a, b| b.amount.total_cmp(&a.amount));
    spends
}

/// Monthly cost of every active, paid subscription, most expensive first.
pub fn monthly_values(records: &[SubscriptionRecord]) -> Vec<SubscriptionMonthlyValue> {
    let mut values: Vec<SubscriptionMonthlyValue> = records
        .iter()
        .filter(|r| contributes(r))
        .map(|r| SubscriptionMonthlyValue {
            id: r.id.clone(),
            name: r.name.clone(),
            monthly_usd: monthly_equivalent(r),
        })
        .collect();
    values.sort_by(|a, b| b.monthly_usd.total_cmp(&a.monthly_usd));
    values
}
