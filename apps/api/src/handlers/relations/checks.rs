use super::*;

pub async fn relation_has_role_handler(
    State(state): State<AppState>,
    Json(payload): Json<RelationRolesRequest>,
) -> ApiResult<Json<CheckResponse>> {
    let granted = resolver(&state, payload.scope)?
        .has_role(payload.roles)
        .await?;

    Ok(Json(CheckResponse { granted }))
}

pub async fn relation_holds_handler(
    State(state): State<AppState>,
    Json(payload): Json<RelationPermissionsRequest>,
) -> ApiResult<Json<CheckResponse>> {
    let granted = resolver(&state, payload.scope)?
        .holds(payload.permissions)
        .await?;

    Ok(Json(CheckResponse { granted }))
}

pub async fn relation_can_handler(
    State(state): State<AppState>,
    Json(payload): Json<RelationCanRequest>,
) -> ApiResult<Json<CheckResponse>> {
    let granted = resolver(&state, payload.scope)?
        .can(payload.permission)
        .await?;

    Ok(Json(CheckResponse { granted }))
}

pub async fn relation_named_check_handler(
    State(state): State<AppState>,
    Json(payload): Json<RelationNamedCheckRequest>,
) -> ApiResult<Json<CheckResponse>> {
    let granted = resolver(&state, payload.scope)?
        .has_named(payload.name.as_str())
        .await?;

    Ok(Json(CheckResponse { granted }))
}

pub async fn relation_authorize_handler(
    State(state): State<AppState>,
    Json(payload): Json<RelationPermissionsRequest>,
) -> ApiResult<StatusCode> {
    resolver(&state, payload.scope)?
        .authorize(payload.permissions)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn relation_authorize_role_handler(
    State(state): State<AppState>,
    Json(payload): Json<RelationRolesRequest>,
) -> ApiResult<StatusCode> {
    resolver(&state, payload.scope)?
        .authorize_role(payload.roles)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
