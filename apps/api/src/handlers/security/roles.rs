use super::*;

pub async fn list_roles_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<Json<Vec<RoleResponse>>> {
    authorize(&state, &user, well_known::ROLES_VIEW).await?;

    let roles = state
        .security_admin_service
        .list_roles(&user)
        .await?
        .into_iter()
        .map(RoleResponse::from)
        .collect();

    Ok(Json(roles))
}

pub async fn create_role_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Json(payload): Json<CreateRoleRequest>,
) -> ApiResult<(StatusCode, Json<RoleResponse>)> {
    authorize(&state, &user, well_known::ROLES_MANAGE).await?;

    let permissions = parse_permission_names(payload.permissions)?;
    let role = state
        .security_admin_service
        .create_role(
            &user,
            portico_application::CreateRoleInput {
                name: payload.name,
                display_name: payload.display_name,
                description: payload.description,
                permissions,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(RoleResponse::from(role))))
}

pub async fn delete_role_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(role_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    authorize(&state, &user, well_known::ROLES_MANAGE).await?;

    state
        .security_admin_service
        .delete_role(&user, RoleId::from_uuid(role_id))
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn replace_role_permissions_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(role_id): Path<Uuid>,
    Json(payload): Json<ReplaceRolePermissionsRequest>,
) -> ApiResult<Json<RoleResponse>> {
    authorize(&state, &user, well_known::ROLES_MANAGE).await?;

    let permissions = parse_permission_names(payload.permissions)?;
    let role = state
        .security_admin_service
        .replace_role_permissions(&user, RoleId::from_uuid(role_id), permissions)
        .await?;

    Ok(Json(RoleResponse::from(role)))
}
