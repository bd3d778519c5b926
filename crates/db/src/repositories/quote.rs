use chrono::{DateTime, Utc};
use sqlx::Row;

use printshop_core::domain::customer::CustomerId;
use printshop_core::domain::filament::FilamentId;
use printshop_core::domain::quote::{
    Quote, QuoteId, QuoteLine, QuoteLineId, QuoteStatus, QuoteVersion, QuoteVersionId,
};

use super::{parse_decimal, QuoteRepository, RepositoryError};
use crate::DbPool;

pub struct SqlQuoteRepository {
    pool: DbPool,
}

impl SqlQuoteRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn parse_status(raw: &str) -> Result<QuoteStatus, RepositoryError> {
    raw.parse::<QuoteStatus>().map_err(|error| RepositoryError::Decode(error.to_string()))
}

fn row_to_version(row: &sqlx::sqlite::SqliteRow) -> Result<QuoteVersion, RepositoryError> {
    let override_raw: Option<String> = row.get("unit_sale_price_override");
    Ok(QuoteVersion {
        id: QuoteVersionId(row.get("id")),
        quote_id: QuoteId(row.get("quote_id")),
        version_number: row.get::<i64, _>("version_number") as u32,
        status: parse_status(&row.get::<String, _>("status"))?,
        machine_cost_per_hour: parse_decimal(
            &row.get::<String, _>("machine_cost_per_hour"),
            "machine_cost_per_hour",
        )?,
        labor_cost_per_hour: parse_decimal(
            &row.get::<String, _>("labor_cost_per_hour"),
            "labor_cost_per_hour",
        )?,
        power_draw_w: parse_decimal(&row.get::<String, _>("power_draw_w"), "power_draw_w")?,
        energy_cost_per_kwh: parse_decimal(
            &row.get::<String, _>("energy_cost_per_kwh"),
            "energy_cost_per_kwh",
        )?,
        consumables_fixed: parse_decimal(
            &row.get::<String, _>("consumables_fixed"),
            "consumables_fixed",
        )?,
        overhead_pct: parse_decimal(&row.get::<String, _>("overhead_pct"), "overhead_pct")?,
        risk_pct: parse_decimal(&row.get::<String, _>("risk_pct"), "risk_pct")?,
        margin_pct: parse_decimal(&row.get::<String, _>("margin_pct"), "margin_pct")?,
        discount: parse_decimal(&row.get::<String, _>("discount"), "discount")?,
        tax_pct: parse_decimal(&row.get::<String, _>("tax_pct"), "tax_pct")?,
        apply_tax: row.get::<i64, _>("apply_tax") != 0,
        unit_sale_price_override: override_raw
            .as_deref()
            .map(|raw| parse_decimal(raw, "unit_sale_price_override"))
            .transpose()?,
        taxable_total: parse_decimal(&row.get::<String, _>("taxable_total"), "taxable_total")?,
        tax_total: parse_decimal(&row.get::<String, _>("tax_total"), "tax_total")?,
        gross_total: parse_decimal(&row.get::<String, _>("gross_total"), "gross_total")?,
        lines: Vec::new(),
    })
}

fn row_to_line(row: &sqlx::sqlite::SqliteRow) -> Result<QuoteLine, RepositoryError> {
    Ok(QuoteLine {
        id: QuoteLineId(row.get("id")),
        description: row.get("description"),
        filament_id: row.get::<Option<i64>, _>("filament_id").map(FilamentId),
        quantity: row.get::<i64, _>("quantity") as u32,
        material_weight_g: parse_decimal(
            &row.get::<String, _>("material_weight_g"),
            "material_weight_g",
        )?,
        print_time_min: row.get("print_time_min"),
        labor_time_min: row.get("labor_time_min"),
        material_cost: parse_decimal(&row.get::<String, _>("material_cost"), "material_cost")?,
        machine_cost: parse_decimal(&row.get::<String, _>("machine_cost"), "machine_cost")?,
        labor_cost: parse_decimal(&row.get::<String, _>("labor_cost"), "labor_cost")?,
        energy_cost: parse_decimal(&row.get::<String, _>("energy_cost"), "energy_cost")?,
        consumables_cost: parse_decimal(
            &row.get::<String, _>("consumables_cost"),
            "consumables_cost",
        )?,
        line_total: parse_decimal(&row.get::<String, _>("line_total"), "line_total")?,
    })
}

#[async_trait::async_trait]
impl QuoteRepository for SqlQuoteRepository {
    async fn find_quote(&self, id: QuoteId) -> Result<Option<Quote>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM quotes WHERE id = ?")
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await?;
        row.map(|row| {
            Ok(Quote {
                id: QuoteId(row.get("id")),
                code: row.get("code"),
                customer_id: CustomerId(row.get("customer_id")),
                note: row.get("note"),
                created_at: parse_created_at(&row.get::<String, _>("created_at"))?,
            })
        })
        .transpose()
    }

    async fn save_quote(&self, quote: Quote) -> Result<QuoteId, RepositoryError> {
        if quote.id.0 == 0 {
            let result = sqlx::query(
                "INSERT INTO quotes (code, customer_id, note, created_at) VALUES (?, ?, ?, ?)",
            )
            .bind(&quote.code)
            .bind(quote.customer_id.0)
            .bind(&quote.note)
            .bind(quote.created_at.to_rfc3339())
            .execute(&self.pool)
            .await?;
            Ok(QuoteId(result.last_insert_rowid()))
        } else {
            sqlx::query(
                "INSERT OR REPLACE INTO quotes (id, code, customer_id, note, created_at)
                 VALUES (?, ?, ?, ?, ?)",
            )
            .bind(quote.id.0)
            .bind(&quote.code)
            .bind(quote.customer_id.0)
            .bind(&quote.note)
            .bind(quote.created_at.to_rfc3339())
            .execute(&self.pool)
            .await?;
            Ok(quote.id)
        }
    }

    async fn find_version(
        &self,
        id: QuoteVersionId,
    ) -> Result<Option<QuoteVersion>, RepositoryError> {
        let Some(row) = sqlx::query("SELECT * FROM quote_versions WHERE id = ?")
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await?
        else {
            return Ok(None);
        };
        let mut version = row_to_version(&row)?;

        let line_rows =
            sqlx::query("SELECT * FROM quote_lines WHERE quote_version_id = ? ORDER BY position")
                .bind(id.0)
                .fetch_all(&self.pool)
                .await?;
        version.lines = line_rows.iter().map(row_to_line).collect::<Result<_, _>>()?;

        Ok(Some(version))
    }

    async fn save_version(
        &self,
        version: QuoteVersion,
    ) -> Result<QuoteVersionId, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let version_id = if version.id.0 == 0 {
            let result = sqlx::query(
                "INSERT INTO quote_versions
                 (quote_id, version_number, status, machine_cost_per_hour, labor_cost_per_hour,
                  power_draw_w, energy_cost_per_kwh, consumables_fixed, overhead_pct, risk_pct,
                  margin_pct, discount, tax_pct, apply_tax, unit_sale_price_override,
                  taxable_total, tax_total, gross_total)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(version.quote_id.0)
            .bind(i64::from(version.version_number))
            .bind(version.status.as_str())
            .bind(version.machine_cost_per_hour.to_string())
            .bind(version.labor_cost_per_hour.to_string())
            .bind(version.power_draw_w.to_string())
            .bind(version.energy_cost_per_kwh.to_string())
            .bind(version.consumables_fixed.to_string())
            .bind(version.overhead_pct.to_string())
            .bind(version.risk_pct.to_string())
            .bind(version.margin_pct.to_string())
            .bind(version.discount.to_string())
            .bind(version.tax_pct.to_string())
            .bind(i64::from(version.apply_tax))
            .bind(version.unit_sale_price_override.map(|value| value.to_string()))
            .bind(version.taxable_total.to_string())
            .bind(version.tax_total.to_string())
            .bind(version.gross_total.to_string())
            .execute(&mut *tx)
            .await?;
            QuoteVersionId(result.last_insert_rowid())
        } else {
            sqlx::query(
                "INSERT OR REPLACE INTO quote_versions
                 (id, quote_id, version_number, status, machine_cost_per_hour,
                  labor_cost_per_hour, power_draw_w, energy_cost_per_kwh, consumables_fixed,
                  overhead_pct, risk_pct, margin_pct, discount, tax_pct, apply_tax,
                  unit_sale_price_override, taxable_total, tax_total, gross_total)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(version.id.0)
            .bind(version.quote_id.0)
            .bind(i64::from(version.version_number))
            .bind(version.status.as_str())
            .bind(version.machine_cost_per_hour.to_string())
            .bind(version.labor_cost_per_hour.to_string())
            .bind(version.power_draw_w.to_string())
            .bind(version.energy_cost_per_kwh.to_string())
            .bind(version.consumables_fixed.to_string())
            .bind(version.overhead_pct.to_string())
            .bind(version.risk_pct.to_string())
            .bind(version.margin_pct.to_string())
            .bind(version.discount.to_string())
            .bind(version.tax_pct.to_string())
            .bind(i64::from(version.apply_tax))
            .bind(version.unit_sale_price_override.map(|value| value.to_string()))
            .bind(version.taxable_total.to_string())
            .bind(version.tax_total.to_string())
            .bind(version.gross_total.to_string())
            .execute(&mut *tx)
            .await?;
            version.id
        };

        // The version owns its lines: replace the whole set, keeping the
        // vector order as stored positions.
        sqlx::query("DELETE FROM quote_lines WHERE quote_version_id = ?")
            .bind(version_id.0)
            .execute(&mut *tx)
            .await?;

        for (position, line) in version.lines.iter().enumerate() {
            sqlx::query(
                "INSERT INTO quote_lines
                 (quote_version_id, position, description, filament_id, quantity,
                  material_weight_g, print_time_min, labor_time_min, material_cost,
                  machine_cost, labor_cost, energy_cost, consumables_cost, line_total)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(version_id.0)
            .bind(position as i64)
            .bind(&line.description)
            .bind(line.filament_id.map(|id| id.0))
            .bind(i64::from(line.quantity))
            .bind(line.material_weight_g.to_string())
            .bind(line.print_time_min)
            .bind(line.labor_time_min)
            .bind(line.material_cost.to_string())
            .bind(line.machine_cost.to_string())
            .bind(line.labor_cost.to_string())
            .bind(line.energy_cost.to_string())
            .bind(line.consumables_cost.to_string())
            .bind(line.line_total.to_string())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(version_id)
    }
}

fn parse_created_at(raw: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|value| value.with_timezone(&Utc))
        .map_err(|error| RepositoryError::Decode(format!("column created_at: {error}")))
}
