pub mod disk;
pub mod memory;

use crate::core::config::AppConfig;
use anyhow::Result;
pub use disk::DiskDispatcher;
pub use memory::MemoryDispatcher;

/// Opens the persistent reminder queue under the configured data directory.
pub fn open_reminder_queue(config: &AppConfig) -> Result<DiskDispatcher> {
    let path = config.default_data_path()?.join("reminders");
    DiskDispatcher::open(&path)
}
