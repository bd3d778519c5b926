use std::collections::HashMap;

use printshop_core::domain::filament::{Filament, FilamentId};
use printshop_core::domain::quote::{QuoteVersion, QuoteVersionId};
use printshop_core::errors::DomainError;
use printshop_core::pricing::recalc_quote_version;

use super::ServiceError;
use crate::repositories::{FilamentRepository, QuoteRepository};

/// Load the filaments an iterator of ids references into an index the sync
/// engines can resolve against. Missing ids are simply absent; the pricing
/// engine decides whether that is an error.
pub(crate) async fn filament_index(
    filaments: &impl FilamentRepository,
    ids: impl Iterator<Item = FilamentId>,
) -> Result<HashMap<FilamentId, Filament>, ServiceError> {
    let mut index = HashMap::new();
    for id in ids {
        if index.contains_key(&id) {
            continue;
        }
        if let Some(filament) = filaments.find_by_id(id).await? {
            index.insert(id, filament);
        }
    }
    Ok(index)
}

/// Recalculate a quote version's pricing and persist the computed fields.
///
/// On any error nothing is written back: a version referencing an unknown
/// filament keeps its previously stored totals.
pub async fn recalc_and_store(
    quotes: &impl QuoteRepository,
    filaments: &impl FilamentRepository,
    version_id: QuoteVersionId,
) -> Result<QuoteVersion, ServiceError> {
    let mut version = quotes
        .find_version(version_id)
        .await?
        .ok_or(DomainError::QuoteVersionNotFound { id: version_id })?;

    let index =
        filament_index(filaments, version.lines.iter().filter_map(|line| line.filament_id))
            .await?;
    recalc_quote_version(&mut version, &index)?;

    quotes.save_version(version.clone()).await?;

    tracing::info!(
        event_name = "service.quote.recalculated",
        quote_version_id = version_id.0,
        taxable_total = %version.taxable_total,
        "quote version repriced and stored"
    );

    Ok(version)
}
