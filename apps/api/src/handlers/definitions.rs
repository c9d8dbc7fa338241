use axum::Json;
use axum::extract::State;
use rolegate_domain::RelationDefinition;

use crate::dto::DefinitionResponse;
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_definitions_handler(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<DefinitionResponse>>> {
    let definitions = state
        .access_service
        .registry()
        .entries()
        .into_iter()
        .map(|(scope, definition)| DefinitionResponse::new(scope, &definition))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Json(definitions))
}

pub async fn list_relations_handler(
    State(state): State<AppState>,
) -> Json<Vec<RelationDefinition>> {
    let mut relations: Vec<RelationDefinition> =
        state.access_service.relations().relations().cloned().collect();
    relations.sort_by(|left, right| {
        (left.owner.as_str(), left.name.as_str()).cmp(&(right.owner.as_str(), right.name.as_str()))
    });

    Json(relations)
}
