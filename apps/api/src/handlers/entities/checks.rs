use super::*;

pub async fn has_role_handler(
    State(state): State<AppState>,
    Path((collection, key)): Path<(String, String)>,
    Json(payload): Json<RolesRequest>,
) -> ApiResult<Json<CheckResponse>> {
    let granted = resolver(&state, collection, key)?
        .has_role(payload.roles)
        .await?;

    Ok(Json(CheckResponse { granted }))
}

pub async fn holds_handler(
    State(state): State<AppState>,
    Path((collection, key)): Path<(String, String)>,
    Json(payload): Json<PermissionsRequest>,
) -> ApiResult<Json<CheckResponse>> {
    let granted = resolver(&state, collection, key)?
        .holds(payload.permissions)
        .await?;

    Ok(Json(CheckResponse { granted }))
}

pub async fn can_handler(
    State(state): State<AppState>,
    Path((collection, key)): Path<(String, String)>,
    Json(payload): Json<CanRequest>,
) -> ApiResult<Json<CheckResponse>> {
    let granted = resolver(&state, collection, key)?
        .can(payload.permission)
        .await?;

    Ok(Json(CheckResponse { granted }))
}

pub async fn named_check_handler(
    State(state): State<AppState>,
    Path((collection, key, name)): Path<(String, String, String)>,
) -> ApiResult<Json<CheckResponse>> {
    let granted = resolver(&state, collection, key)?
        .has_named(name.as_str())
        .await?;

    Ok(Json(CheckResponse { granted }))
}

pub async fn authorize_handler(
    State(state): State<AppState>,
    Path((collection, key)): Path<(String, String)>,
    Json(payload): Json<PermissionsRequest>,
) -> ApiResult<StatusCode> {
    resolver(&state, collection, key)?
        .authorize(payload.permissions)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn authorize_role_handler(
    State(state): State<AppState>,
    Path((collection, key)): Path<(String, String)>,
    Json(payload): Json<RolesRequest>,
) -> ApiResult<StatusCode> {
    resolver(&state, collection, key)?
        .authorize_role(payload.roles)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
