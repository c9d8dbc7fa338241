use rolegate_core::AppError;
use rolegate_domain::{DefinitionRegistry, DefinitionsDocument, RelationCatalog};

/// Reads and validates the definitions document at `path`.
pub async fn load_definitions(
    path: &str,
) -> Result<(DefinitionRegistry, RelationCatalog), AppError> {
    let source = tokio::fs::read_to_string(path).await.map_err(|error| {
        AppError::Validation(format!("failed to read definitions from '{path}': {error}"))
    })?;

    let parts = DefinitionsDocument::from_json_str(source.as_str())?.into_parts()?;
    tracing::info!(
        path,
        scopes = parts.0.entries().len(),
        relations = parts.1.relations().count(),
        "loaded role definitions"
    );

    Ok(parts)
}
