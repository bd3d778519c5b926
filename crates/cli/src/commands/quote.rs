use printshop_core::domain::quote::QuoteVersionId;
use printshop_db::repositories::{SqlFilamentRepository, SqlQuoteRepository};
use printshop_db::services::quotes::recalc_and_store;
use printshop_db::services::ServiceError;

use crate::commands::{with_pool, CommandResult};

pub fn recalc(version_id: i64) -> CommandResult {
    let result = with_pool("quote-recalc", |pool| async move {
        let quotes = SqlQuoteRepository::new(pool.clone());
        let filaments = SqlFilamentRepository::new(pool);

        recalc_and_store(&quotes, &filaments, QuoteVersionId(version_id))
            .await
            .map_err(service_failure)
    });

    match result {
        Ok(version) => CommandResult::success(
            "quote-recalc",
            format!(
                "version {} repriced: taxable {} / tax {} / gross {}",
                version_id, version.taxable_total, version.tax_total, version.gross_total
            ),
        ),
        Err(failure) => failure,
    }
}

pub(crate) fn service_failure(error: ServiceError) -> (&'static str, String, u8) {
    match error {
        ServiceError::Domain(error) => ("domain", error.to_string(), 6),
        ServiceError::Repository(error) => ("db_query", error.to_string(), 4),
    }
}
