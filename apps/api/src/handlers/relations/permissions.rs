use super::*;

pub async fn relation_list_direct_permissions_handler(
    State(state): State<AppState>,
    Json(payload): Json<RelationScopeRequest>,
) -> ApiResult<Json<Vec<PermissionResponse>>> {
    let permissions = resolver(&state, payload)?
        .direct_permissions()
        .await?
        .iter()
        .map(PermissionResponse::from)
        .collect();

    Ok(Json(permissions))
}

pub async fn relation_give_permissions_handler(
    State(state): State<AppState>,
    Json(payload): Json<RelationPermissionsRequest>,
) -> ApiResult<Json<ChangeResponse>> {
    let changed = resolver(&state, payload.scope)?
        .give(payload.permissions)
        .await?;

    Ok(Json(ChangeResponse { changed }))
}

pub async fn relation_revoke_permissions_handler(
    State(state): State<AppState>,
    Json(payload): Json<RelationPermissionsRequest>,
) -> ApiResult<Json<ChangeResponse>> {
    let changed = resolver(&state, payload.scope)?
        .revoke(payload.permissions)
        .await?;

    Ok(Json(ChangeResponse { changed }))
}
