use super::*;

pub async fn relation_list_roles_handler(
    State(state): State<AppState>,
    Json(payload): Json<RelationScopeRequest>,
) -> ApiResult<Json<Vec<RoleResponse>>> {
    let roles = resolver(&state, payload)?
        .roles()
        .await?
        .iter()
        .map(RoleResponse::from)
        .collect();

    Ok(Json(roles))
}

pub async fn relation_list_permissions_handler(
    State(state): State<AppState>,
    Json(payload): Json<RelationScopeRequest>,
) -> ApiResult<Json<Vec<PermissionResponse>>> {
    let permissions = resolver(&state, payload)?
        .permissions()
        .await?
        .iter()
        .map(PermissionResponse::from)
        .collect();

    Ok(Json(permissions))
}

pub async fn relation_assign_roles_handler(
    State(state): State<AppState>,
    Json(payload): Json<RelationRolesRequest>,
) -> ApiResult<Json<ChangeResponse>> {
    let changed = resolver(&state, payload.scope)?
        .assign(payload.roles)
        .await?;

    Ok(Json(ChangeResponse { changed }))
}

pub async fn relation_remove_roles_handler(
    State(state): State<AppState>,
    Json(payload): Json<RelationRolesRequest>,
) -> ApiResult<Json<ChangeResponse>> {
    let changed = resolver(&state, payload.scope)?
        .remove_roles(payload.roles)
        .await?;

    Ok(Json(ChangeResponse { changed }))
}
