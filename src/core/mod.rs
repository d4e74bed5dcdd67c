//! Core business logic: valuation and reminder scheduling

pub mod config;
pub mod currency;
pub mod listing;
pub mod log;
pub mod reminder;
pub mod subscription;
pub mod valuation;

// Re-export main types for cleaner imports
pub use currency::Currency;
pub use reminder::{NotificationDispatcher, ReminderRequest, ReminderScheduler, ReminderSettings};
pub use subscription::{BillingCycle, Category, ReminderLead, SubscriptionId, SubscriptionRecord};
pub use valuation::{CategorySpend, SpendingReport};
