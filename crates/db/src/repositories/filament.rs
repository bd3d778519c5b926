use sqlx::Row;

use printshop_core::domain::filament::{Filament, FilamentId};

use super::{parse_decimal, FilamentRepository, RepositoryError};
use crate::DbPool;

pub struct SqlFilamentRepository {
    pool: DbPool,
}

impl SqlFilamentRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_filament(row: &sqlx::sqlite::SqliteRow) -> Result<Filament, RepositoryError> {
    Ok(Filament {
        id: FilamentId(row.get("id")),
        material: row.get("material"),
        brand: row.get("brand"),
        color: row.get("color"),
        diameter_mm: parse_decimal(&row.get::<String, _>("diameter_mm"), "diameter_mm")?,
        nominal_weight_g: parse_decimal(
            &row.get::<String, _>("nominal_weight_g"),
            "nominal_weight_g",
        )?,
        spool_cost: parse_decimal(&row.get::<String, _>("spool_cost"), "spool_cost")?,
        residual_weight_g: parse_decimal(
            &row.get::<String, _>("residual_weight_g"),
            "residual_weight_g",
        )?,
    })
}

#[async_trait::async_trait]
impl FilamentRepository for SqlFilamentRepository {
    async fn find_by_id(&self, id: FilamentId) -> Result<Option<Filament>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM filaments WHERE id = ?")
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_filament).transpose()
    }

    async fn list(&self) -> Result<Vec<Filament>, RepositoryError> {
        let rows =
            sqlx::query("SELECT * FROM filaments ORDER BY id").fetch_all(&self.pool).await?;
        rows.iter().map(row_to_filament).collect()
    }

    async fn save(&self, filament: Filament) -> Result<FilamentId, RepositoryError> {
        if filament.id.0 == 0 {
            let result = sqlx::query(
                "INSERT INTO filaments
                 (material, brand, color, diameter_mm, nominal_weight_g, spool_cost, residual_weight_g)
                 VALUES (?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(&filament.material)
            .bind(&filament.brand)
            .bind(&filament.color)
            .bind(filament.diameter_mm.to_string())
            .bind(filament.nominal_weight_g.to_string())
            .bind(filament.spool_cost.to_string())
            .bind(filament.residual_weight_g.to_string())
            .execute(&self.pool)
            .await?;
            Ok(FilamentId(result.last_insert_rowid()))
        } else {
            sqlx::query(
                "INSERT OR REPLACE INTO filaments
                 (id, material, brand, color, diameter_mm, nominal_weight_g, spool_cost, residual_weight_g)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(filament.id.0)
            .bind(&filament.material)
            .bind(&filament.brand)
            .bind(&filament.color)
            .bind(filament.diameter_mm.to_string())
            .bind(filament.nominal_weight_g.to_string())
            .bind(filament.spool_cost.to_string())
            .bind(filament.residual_weight_g.to_string())
            .execute(&self.pool)
            .await?;
            Ok(filament.id)
        }
    }
}
