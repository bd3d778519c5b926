use rust_decimal::Decimal;
use sqlx::Row;

use super::{parse_decimal, RepositoryError, SettingsRepository};
use crate::DbPool;

/// Single-row application settings, created on first read. Currently only
/// the shop-wide energy cost override lives here.
pub struct SqlSettingsRepository {
    pool: DbPool,
}

impl SqlSettingsRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn ensure_row(&self) -> Result<(), RepositoryError> {
        sqlx::query("INSERT OR IGNORE INTO app_settings (id, energy_cost_per_kwh) VALUES (1, NULL)")
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl SettingsRepository for SqlSettingsRepository {
    async fn energy_cost_override(&self) -> Result<Option<Decimal>, RepositoryError> {
        self.ensure_row().await?;
        let row = sqlx::query("SELECT energy_cost_per_kwh FROM app_settings WHERE id = 1")
            .fetch_one(&self.pool)
            .await?;
        row.get::<Option<String>, _>("energy_cost_per_kwh")
            .as_deref()
            .map(|raw| parse_decimal(raw, "energy_cost_per_kwh"))
            .transpose()
    }

    async fn set_energy_cost_override(
        &self,
        value: Option<Decimal>,
    ) -> Result<(), RepositoryError> {
        self.ensure_row().await?;
        sqlx::query("UPDATE app_settings SET energy_cost_per_kwh = ? WHERE id = 1")
            .bind(value.map(|value| value.to_string()))
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
