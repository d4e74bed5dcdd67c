use crate::core::reminder::ReminderSettings;
use crate::core::subscription::SubscriptionRecord;
use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{collections::HashSet, fs, path::PathBuf};
use tracing::debug;

/// A subscription as written in the configuration file. Enumerated fields
/// stay raw strings here and are resolved by [`SubscriptionRecord::from`].
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SubscriptionEntry {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub price: f64,
    pub currency: Option<String>,
    pub billing_cycle: Option<String>,
    pub category: Option<String>,
    pub next_billing_date: Option<DateTime<Utc>>,
    pub reminder_lead_days: Option<i64>,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub pinned: bool,
    pub notes: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ReminderConfig {
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default = "default_time_of_day")]
    pub time_of_day: String,
}

fn default_timezone() -> String {
    "UTC".to_string()
}

fn default_time_of_day() -> String {
    "09:00".to_string()
}

impl Default for ReminderConfig {
    fn default() -> Self {
        ReminderConfig {
            timezone: default_timezone(),
            time_of_day: default_time_of_day(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub subscriptions: Vec<SubscriptionEntry>,
    #[serde(default)]
    pub reminders: ReminderConfig,
    pub data_path: Option<String>,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("app", "subsage", "subsage")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn default_data_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = ProjectDirs::from("app", "subsage", "subsage")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        config
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.as_ref().display()))?;
        debug!(
            "Successfully loaded config with {} subscriptions",
            config.subscriptions.len()
        );
        Ok(config)
    }

    /// Subscription ids key the reminder queue, so they must be non-empty
    /// and unique across the file, archived entries included.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for (index, entry) in self.subscriptions.iter().enumerate() {
            if entry.id.trim().is_empty() {
                bail!("Subscription #{} has an empty id", index + 1);
            }
            if !seen.insert(entry.id.as_str()) {
                bail!("Duplicate subscription id: {}", entry.id);
            }
        }
        Ok(())
    }

    /// Subscriptions with their enumerated fields resolved.
    pub fn records(&self) -> Vec<SubscriptionRecord> {
        self.subscriptions.iter().map(SubscriptionRecord::from).collect()
    }

    pub fn reminder_settings(&self) -> Result<ReminderSettings> {
        ReminderSettings::try_from(&self.reminders).context("Invalid reminders configuration")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::currency::Currency;
    use crate::core::subscription::{BillingCycle, Category, ReminderLead};
    use chrono::{NaiveTime, TimeZone};
    use std::io::Write;

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
subscriptions:
  - id: "music"
    name: "Apple Music"
    price: 4.99
    currency: "USD"
    billing_cycle: "monthly"
    category: "entertainment"
    next_billing_date: "2026-11-03T00:00:00Z"
    reminder_lead_days: -5
    pinned: true
  - id: "cloud"
    name: "iCloud+"
    price: 29.99
    currency: "EUR"
    billing_cycle: "yearly"
    category: "cloud"
    active: false
  - id: "bare"
reminders:
  timezone: "Europe/Kyiv"
  time_of_day: "08:15"
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(config.subscriptions.len(), 3);

        let records = config.records();
        assert_eq!(records[0].name, "Apple Music");
        assert_eq!(records[0].category, Category::Entertainment);
        assert_eq!(records[0].reminder_lead, ReminderLead::FiveDays);
        assert_eq!(
            records[0].next_billing_date,
            Some(Utc.with_ymd_and_hms(2026, 11, 3, 0, 0, 0).unwrap())
        );
        assert!(records[0].is_active);
        assert!(records[0].is_pinned);

        assert_eq!(records[1].currency, Currency::Eur);
        assert_eq!(records[1].billing_cycle, BillingCycle::Yearly);
        assert!(!records[1].is_active);

        assert_eq!(records[2].name, "");
        assert_eq!(records[2].price, 0.0);
        assert_eq!(records[2].currency, Currency::Usd);
        assert!(records[2].next_billing_date.is_none());

        let settings = config.reminder_settings().unwrap();
        assert_eq!(settings.timezone, chrono_tz::Europe::Kyiv);
        assert_eq!(
            settings.time_of_day,
            NaiveTime::from_hms_opt(8, 15, 0).unwrap()
        );
        assert!(config.data_path.is_none());
    }

    #[test]
    fn test_reminders_default() {
        let config: AppConfig = serde_yaml::from_str("subscriptions: []").unwrap();
        assert_eq!(config.reminders.timezone, "UTC");
        assert_eq!(config.reminders.time_of_day, "09:00");
        assert_eq!(config.reminder_settings().unwrap(), ReminderSettings::default());
    }

    #[test]
    fn test_invalid_reminder_settings() {
        let config: AppConfig = serde_yaml::from_str(
            r#"
reminders:
  timezone: "Nowhere/Special"
"#,
        )
        .unwrap();
        let err = config.reminder_settings().unwrap_err();
        assert!(err.to_string().contains("Invalid reminders configuration"));
    }

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_empty_id_is_rejected() {
        let file = write_config(
            r#"
subscriptions:
  - id: "music"
    price: 4.99
  - id: "  "
    price: 1.0
"#,
        );

        let err = AppConfig::load_from_path(file.path()).unwrap_err();
        assert!(err.to_string().contains("Invalid config file"));
        assert!(format!("{err:#}").contains("Subscription #2 has an empty id"));
    }

    #[test]
    fn test_duplicate_id_is_rejected() {
        let file = write_config(
            r#"
subscriptions:
  - id: "dup"
    price: 4.99
    next_billing_date: "2026-11-17T00:00:00Z"
  - id: "dup"
    price: 1.0
    active: false
"#,
        );

        let err = AppConfig::load_from_path(file.path()).unwrap_err();
        assert!(format!("{err:#}").contains("Duplicate subscription id: dup"));
    }

    #[test]
    fn test_distinct_ids_load() {
        let file = write_config(
            r#"
subscriptions:
  - id: "a"
  - id: "b"
    active: false
"#,
        );

        let config = AppConfig::load_from_path(file.path()).unwrap();
        assert_eq!(config.records().len(), 2);
    }

    #[test]
    fn test_nan_price_values_to_zero() {
        let config: AppConfig = serde_yaml::from_str(
            r#"
subscriptions:
  - id: "odd"
    price: .nan
"#,
        )
        .unwrap();

        let records = config.records();
        assert!(records[0].price.is_nan());
        assert_eq!(crate::core::valuation::monthly_equivalent(&records[0]), 0.0);
    }

    #[test]
    fn test_custom_data_path() {
        let config: AppConfig = serde_yaml::from_str("data_path: \"/tmp/subsage\"").unwrap();
        assert_eq!(
            config.default_data_path().unwrap(),
            PathBuf::from("/tmp/subsage")
        );
    }
}
