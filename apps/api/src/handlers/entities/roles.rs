use super::*;

pub async fn list_roles_handler(
    State(state): State<AppState>,
    Path((collection, key)): Path<(String, String)>,
) -> ApiResult<Json<Vec<RoleResponse>>> {
    let roles = resolver(&state, collection, key)?
        .roles()
        .await?
        .iter()
        .map(RoleResponse::from)
        .collect();

    Ok(Json(roles))
}

pub async fn assign_roles_handler(
    State(state): State<AppState>,
    Path((collection, key)): Path<(String, String)>,
    Json(payload): Json<RolesRequest>,
) -> ApiResult<Json<ChangeResponse>> {
    let changed = resolver(&state, collection, key)?
        .assign(payload.roles)
        .await?;

    Ok(Json(ChangeResponse { changed }))
}

pub async fn remove_roles_handler(
    State(state): State<AppState>,
    Path((collection, key)): Path<(String, String)>,
    Json(payload): Json<RolesRequest>,
) -> ApiResult<Json<ChangeResponse>> {
    let changed = resolver(&state, collection, key)?
        .remove_roles(payload.roles)
        .await?;

    Ok(Json(ChangeResponse { changed }))
}
