//! # Settings Repository
//!
//! The settings table holds exactly one row (id 1) with account, mail
//! and sync endpoint parameters. It is read and written as a whole.

use fieldrep_core::schema::SETTINGS;
use fieldrep_core::{Row, Value, SETTINGS_ROW_ID};
use tracing::info;

use crate::error::DbResult;
use crate::repository::entity_repository;

entity_repository!(
    /// Repository for the single-row `settings` table.
    SettingsRepository,
    SETTINGS
);

/// Values of a freshly created settings row.
const DEFAULTS: [(&str, &str); 5] = [
    ("http", "https://"),
    ("port", "443"),
    ("mailport", "587"),
    ("file_suffix", ".txt"),
    ("usercountry", "dk"),
];

impl SettingsRepository {
    /// The settings row, created with defaults on first use.
    pub async fn get(&mut self) -> DbResult<Row> {
        if let Some(row) = self.load_by_id(SETTINGS_ROW_ID).await? {
            return Ok(row.clone());
        }

        let mut row = self.blank_row();
        row.set("settingsid", SETTINGS_ROW_ID);
        for (field, value) in DEFAULTS {
            row.set(field, value);
        }
        self.insert_row(&row).await?;
        info!("Default settings created");

        self.clear();
        Ok(self.load_by_id(SETTINGS_ROW_ID).await?.cloned().unwrap_or(row))
    }

    /// Overwrites every field of the settings row with `row`'s values.
    pub async fn save(&mut self, row: &Row) -> DbResult<()> {
        self.get().await?;
        let mut row = row.clone();
        row.set("settingsid", SETTINGS_ROW_ID);
        self.update_row(&row).await?;
        self.clear();
        Ok(())
    }

    /// Sets a single field, e.g. a sync timestamp.
    pub async fn stamp(&mut self, field: &str, value: impl Into<Value>) -> DbResult<()> {
        let mut row = self.get().await?;
        self.model().require_field(field)?;
        row.set(field, value);
        self.save(&row).await
    }
}

#[cfg(test)]
mod tests {
    use crate::repository::test_support::memory_db;

    #[tokio::test]
    async fn test_get_creates_single_default_row() {
        let db = memory_db().await;
        let mut settings = db.settings();

        let row = settings.get().await.unwrap();
        assert_eq!(row.get_i64("settingsid"), Some(1));
        assert_eq!(row.get_str("http"), Some("https://"));
        assert_eq!(row.get_i64("port"), Some(443));

        settings.get().await.unwrap();
        assert_eq!(settings.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_save_is_wholesale() {
        let db = memory_db().await;
        let mut settings = db.settings();

        let mut row = settings.get().await.unwrap();
        row.set("http", "https://sync.example.com");
        row.set("usercountry", "se");
        settings.save(&row).await.unwrap();

        settings.stamp("last_product_sync", "2024-03-05T10:00:00").await.unwrap();
        assert!(settings.stamp("no_such_field", "x").await.is_err());

        let stored = db.settings().get().await.unwrap();
        assert_eq!(stored.get_str("http"), Some("https://sync.example.com"));
        assert_eq!(stored.get_str("usercountry"), Some("se"));
        assert_eq!(stored.get_str("last_product_sync"), Some("2024-03-05T10:00:00"));
    }
}
