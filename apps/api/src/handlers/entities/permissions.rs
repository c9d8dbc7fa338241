use super::*;

pub async fn list_permissions_handler(
    State(state): State<AppState>,
    Path((collection, key)): Path<(String, String)>,
) -> ApiResult<Json<Vec<PermissionResponse>>> {
    let permissions = resolver(&state, collection, key)?
        .permissions()
        .await?
        .iter()
        .map(PermissionResponse::from)
        .collect();

    Ok(Json(permissions))
}

pub async fn list_direct_permissions_handler(
    State(state): State<AppState>,
    Path((collection, key)): Path<(String, String)>,
) -> ApiResult<Json<Vec<PermissionResponse>>> {
    let permissions = resolver(&state, collection, key)?
        .direct_permissions()
        .await?
        .iter()
        .map(PermissionResponse::from)
        .collect();

    Ok(Json(permissions))
}

pub async fn give_permissions_handler(
    State(state): State<AppState>,
    Path((collection, key)): Path<(String, String)>,
    Json(payload): Json<PermissionsRequest>,
) -> ApiResult<Json<ChangeResponse>> {
    let changed = resolver(&state, collection, key)?
        .give(payload.permissions)
        .await?;

    Ok(Json(ChangeResponse { changed }))
}

pub async fn revoke_permissions_handler(
    State(state): State<AppState>,
    Path((collection, key)): Path<(String, String)>,
    Json(payload): Json<PermissionsRequest>,
) -> ApiResult<Json<ChangeResponse>> {
    let changed = resolver(&state, collection, key)?
        .revoke(payload.permissions)
        .await?;

    Ok(Json(ChangeResponse { changed }))
}
