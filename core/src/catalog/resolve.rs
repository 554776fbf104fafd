use tracing::{debug, info};
use uuid::Uuid;

use super::PostmanCatalog;
use crate::error::ResolveError;

/// Maps an environment id-or-name to an id.
///
/// Anything that parses as a UUID is used as-is without a catalog lookup.
/// Otherwise the name must match exactly one environment.
pub async fn resolve_environment(
    catalog: &dyn PostmanCatalog,
    id_or_name: &str,
) -> Result<String, ResolveError> {
    if let Ok(id) = Uuid::parse_str(id_or_name) {
        debug!(environment_id = %id, "environment given as id");
        return Ok(id.to_string());
    }

    let environments = catalog.list_environments().await?;
    debug!(count = environments.len(), name = id_or_name, "searching environments by name");

    let mut matches = environments.into_iter().filter(|e| e.name == id_or_name);
    let first = matches
        .next()
        .ok_or_else(|| ResolveError::NotFound(id_or_name.to_string()))?;
    if matches.next().is_some() {
        return Err(ResolveError::AmbiguousName(id_or_name.to_string()));
    }

    info!(name = id_or_name, environment_id = %first.id, "resolved environment");
    Ok(first.id)
}
