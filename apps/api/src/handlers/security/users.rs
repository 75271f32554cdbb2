use portico_domain::AssignmentMode;

use super::*;

pub async fn list_user_roles_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(user_id): Path<Uuid>,
) -> ApiResult<Json<Vec<RoleAssignmentResponse>>> {
    authorize(&state, &user, well_known::USERS_VIEW).await?;

    let assignments = state
        .security_admin_service
        .list_user_roles(&user, UserId::from_uuid(user_id))
        .await?
        .into_iter()
        .map(RoleAssignmentResponse::from)
        .collect();

    Ok(Json(assignments))
}

pub async fn assign_role_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<AssignRoleRequest>,
) -> ApiResult<Json<RoleChangeResponse>> {
    authorize(&state, &user, well_known::ROLES_MANAGE).await?;

    let mode = payload
        .mode
        .as_deref()
        .map(str::parse::<AssignmentMode>)
        .transpose()?
        .unwrap_or(AssignmentMode::Replace);

    let outcome = state
        .security_admin_service
        .assign_role(
            &user,
            portico_application::AssignRoleInput {
                user_id: UserId::from_uuid(user_id),
                role_id: parse_role_id(payload.role_id.as_str())?,
                mode,
            },
        )
        .await?;

    Ok(Json(RoleChangeResponse::from(outcome)))
}

pub async fn revoke_role_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path((user_id, role_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<RoleChangeResponse>> {
    authorize(&state, &user, well_known::ROLES_MANAGE).await?;

    let outcome = state
        .security_admin_service
        .revoke_role(
            &user,
            UserId::from_uuid(user_id),
            RoleId::from_uuid(role_id),
        )
        .await?;

    Ok(Json(RoleChangeResponse::from(outcome)))
}

pub async fn list_direct_grants_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(user_id): Path<Uuid>,
) -> ApiResult<Json<Vec<DirectGrantResponse>>> {
    authorize(&state, &user, well_known::USERS_VIEW).await?;

    let grants = state
        .security_admin_service
        .list_direct_grants(&user, UserId::from_uuid(user_id))
        .await?
        .into_iter()
        .map(DirectGrantResponse::from)
        .collect();

    Ok(Json(grants))
}

pub async fn set_direct_grant_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path((user_id, name)): Path<(Uuid, String)>,
    Json(payload): Json<SetDirectGrantRequest>,
) -> ApiResult<Json<DirectGrantResponse>> {
    authorize(&state, &user, well_known::USERS_MANAGE).await?;

    let user_id = UserId::from_uuid(user_id);
    let permission = PermissionName::new(name)?;
    let grant = if payload.granted {
        state
            .security_admin_service
            .grant_permission(&user, user_id, &permission)
            .await?
    } else {
        state
            .security_admin_service
            .deny_permission(&user, user_id, &permission)
            .await?
    };

    Ok(Json(DirectGrantResponse::from(grant)))
}

pub async fn clear_direct_grant_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path((user_id, name)): Path<(Uuid, String)>,
) -> ApiResult<StatusCode> {
    authorize(&state, &user, well_known::USERS_MANAGE).await?;

    let permission = PermissionName::new(name)?;
    state
        .security_admin_service
        .clear_override(&user, UserId::from_uuid(user_id), &permission)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn effective_permissions_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(user_id): Path<Uuid>,
) -> ApiResult<Json<EffectivePermissionsResponse>> {
    authorize(&state, &user, well_known::USERS_VIEW).await?;

    let user_id = UserId::from_uuid(user_id);
    let effective = state
        .security_admin_service
        .effective_permissions_for(&user, user_id)
        .await?;

    Ok(Json(EffectivePermissionsResponse::new(user_id, &effective)))
}

pub async fn sync_permissions_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(user_id): Path<Uuid>,
) -> ApiResult<Json<SyncPermissionsResponse>> {
    authorize(&state, &user, well_known::ROLES_MANAGE).await?;

    let inserted = state
        .security_admin_service
        .sync_user_permissions(&user, UserId::from_uuid(user_id))
        .await?;

    Ok(Json(SyncPermissionsResponse { inserted }))
}
