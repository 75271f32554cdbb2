use super::*;

fn create_permission_input(
    payload: CreatePermissionRequest,
) -> ApiResult<portico_application::CreatePermissionInput> {
    Ok(portico_application::CreatePermissionInput {
        name: PermissionName::new(payload.name)?,
        display_name: payload.display_name,
    })
}

pub async fn list_permissions_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<Json<Vec<PermissionResponse>>> {
    authorize(&state, &user, well_known::ROLES_VIEW).await?;

    let permissions = state
        .security_admin_service
        .list_permissions(&user)
        .await?
        .into_iter()
        .map(PermissionResponse::from)
        .collect();

    Ok(Json(permissions))
}

pub async fn create_permission_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Json(payload): Json<CreatePermissionRequest>,
) -> ApiResult<(StatusCode, Json<PermissionResponse>)> {
    authorize(&state, &user, well_known::ROLES_MANAGE).await?;

    let permission = state
        .security_admin_service
        .create_permission(&user, create_permission_input(payload)?)
        .await?;

    Ok((StatusCode::CREATED, Json(PermissionResponse::from(permission))))
}

pub async fn retire_permission_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(name): Path<String>,
) -> ApiResult<StatusCode> {
    authorize(&state, &user, well_known::ROLES_MANAGE).await?;

    let permission = PermissionName::new(name)?;
    state
        .security_admin_service
        .retire_permission(&user, &permission)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn replace_permission_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(name): Path<String>,
    Json(payload): Json<ReplacePermissionRequest>,
) -> ApiResult<(StatusCode, Json<PermissionResponse>)> {
    authorize(&state, &user, well_known::ROLES_MANAGE).await?;

    let permission = PermissionName::new(name)?;
    let created = state
        .security_admin_service
        .replace_permission(
            &user,
            &permission,
            create_permission_input(payload.replacement)?,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(PermissionResponse::from(created))))
}
