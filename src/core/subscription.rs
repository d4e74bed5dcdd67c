//! Subscription records and their enumerated fields.
//!
//! Storage hands over enumerations as raw strings; [`SubscriptionRecord::from`]
//! is the single place where unknown values fall back to their defaults.

use crate::core::config::SubscriptionEntry;
use crate::core::currency::Currency;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;
use tracing::debug;

/// Opaque identity of a subscription, stable for its lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubscriptionId(String);

impl SubscriptionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SubscriptionId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum BillingCycle {
    Weekly,
    #[default]
    Monthly,
    Quarterly,
    Yearly,
}

impl BillingCycle {
    pub const ALL: [BillingCycle; 4] = [
        BillingCycle::Weekly,
        BillingCycle::Monthly,
        BillingCycle::Quarterly,
        BillingCycle::Yearly,
    ];

    /// Scales an amount charged once per cycle to a per-month figure.
    ///
    /// Weekly uses a flat four weeks per month.
    pub fn to_monthly(&self, amount: f64) -> f64 {
        match self {
            BillingCycle::Weekly => amount * 4.0,
            BillingCycle::Monthly => amount,
            BillingCycle::Quarterly => amount / 3.0,
            BillingCycle::Yearly => amount / 12.0,
        }
    }

    pub fn parse_or_default(s: &str) -> Self {
        s.parse().unwrap_or_else(|_| {
            debug!("Unknown billing cycle {s:?}, using monthly");
            BillingCycle::default()
        })
    }
}

impl Display for BillingCycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                BillingCycle::Weekly => "weekly",
                BillingCycle::Monthly => "monthly",
                BillingCycle::Quarterly => "quarterly",
                BillingCycle::Yearly => "yearly",
            }
        )
    }
}

impl FromStr for BillingCycle {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "weekly" => Ok(BillingCycle::Weekly),
            "monthly" => Ok(BillingCycle::Monthly),
            "quarterly" => Ok(BillingCycle::Quarterly),
            "yearly" => Ok(BillingCycle::Yearly),
            _ => Err(anyhow::anyhow!("Invalid billing cycle: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Category {
    Entertainment,
    Work,
    Cloud,
    Education,
    #[default]
    Other,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Entertainment,
        Category::Work,
        Category::Cloud,
        Category::Education,
        Category::Other,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            Category::Entertainment => "Entertainment",
            Category::Work => "Work",
            Category::Cloud => "Cloud",
            Category::Education => "Education",
            Category::Other => "Other",
        }
    }

    pub fn parse_or_default(s: &str) -> Self {
        s.parse().unwrap_or_else(|_| {
            debug!("Unknown category {s:?}, using other");
            Category::default()
        })
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Category {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "entertainment" => Ok(Category::Entertainment),
            "work" => Ok(Category::Work),
            "cloud" => Ok(Category::Cloud),
            "education" => Ok(Category::Education),
            "other" => Ok(Category::Other),
            _ => Err(anyhow::anyhow!("Invalid category: {}", s)),
        }
    }
}

/// How long before the billing date a reminder fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ReminderLead {
    OneDay,
    #[default]
    TwoDays,
    FiveDays,
    SevenDays,
}

impl ReminderLead {
    pub const ALL: [ReminderLead; 4] = [
        ReminderLead::OneDay,
        ReminderLead::TwoDays,
        ReminderLead::FiveDays,
        ReminderLead::SevenDays,
    ];

    pub fn days(&self) -> i64 {
        match self {
            ReminderLead::OneDay => 1,
            ReminderLead::TwoDays => 2,
            ReminderLead::FiveDays => 5,
            ReminderLead::SevenDays => 7,
        }
    }

    /// Signed form as stored on records: negative means "before".
    pub fn offset_days(&self) -> i64 {
        -self.days()
    }

    /// Accepts either sign; only the magnitude matters.
    pub fn from_days(days: i64) -> Option<Self> {
        match days.abs() {
            1 => Some(ReminderLead::OneDay),
            2 => Some(ReminderLead::TwoDays),
            5 => Some(ReminderLead::FiveDays),
            7 => Some(ReminderLead::SevenDays),
            _ => None,
        }
    }

    pub fn from_days_or_default(days: i64) -> Self {
        Self::from_days(days).unwrap_or_else(|| {
            debug!("Unsupported reminder lead of {days} days, using 2");
            ReminderLead::default()
        })
    }
}

impl Display for ReminderLead {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.days() {
            1 => write!(f, "1 day before"),
            d => write!(f, "{d} days before"),
        }
    }
}

/// A subscription as seen by valuation and reminder scheduling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionRecord {
    pub id: SubscriptionId,
    pub name: String,
    pub price: f64,
    pub currency: Currency,
    pub billing_cycle: BillingCycle,
    pub category: Category,
    pub next_billing_date: Option<DateTime<Utc>>,
    pub reminder_lead: ReminderLead,
    pub is_active: bool,
    pub is_pinned: bool,
    pub notes: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl SubscriptionRecord {
    /// An active, unpinned record in the "other" category with a two day
    /// reminder lead and no billing date.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        price: f64,
        currency: Currency,
        billing_cycle: BillingCycle,
    ) -> Self {
        Self {
            id: SubscriptionId::new(id),
            name: name.into(),
            price,
            currency,
            billing_cycle,
            category: Category::default(),
            next_billing_date: None,
            reminder_lead: ReminderLead::default(),
            is_active: true,
            is_pinned: false,
            notes: None,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn reminder_lead_days(&self) -> i64 {
        self.reminder_lead.offset_days()
    }

    /// Price formatted with the currency code, e.g. `4.99 USD`.
    pub fn price_label(&self) -> String {
        format!("{:.2} {}", self.price, self.currency.code())
    }
}

impl From<&SubscriptionEntry> for SubscriptionRecord {
    fn from(entry: &SubscriptionEntry) -> Self {
        Self {
            id: SubscriptionId::new(entry.id.clone()),
            name: entry.name.clone(),
            price: entry.price,
            currency: entry
                .currency
                .as_deref()
                .map_or_else(Currency::default, Currency::parse_or_default),
            billing_cycle: entry
                .billing_cycle
                .as_deref()
                .map_or_else(BillingCycle::default, BillingCycle::parse_or_default),
            category: entry
                .category
                .as_deref()
                .map_or_else(Category::default, Category::parse_or_default),
            next_billing_date: entry.next_billing_date,
            reminder_lead: entry
                .reminder_lead_days
                .map_or_else(ReminderLead::default, ReminderLead::from_days_or_default),
            is_active: entry.active,
            is_pinned: entry.pinned,
            notes: entry.notes.clone(),
            created_at: entry.created_at,
            updated_at: entry.updated_at,
        }
    }
}
