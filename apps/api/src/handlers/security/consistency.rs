use super::*;

pub async fn audit_consistency_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<Json<ConsistencyReportResponse>> {
    authorize(&state, &user, well_known::SETTINGS_EDIT).await?;

    let report = state.consistency_service.audit_as(&user).await?;
    Ok(Json(ConsistencyReportResponse::from(report)))
}

pub async fn repair_consistency_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<Json<ConsistencyReportResponse>> {
    authorize(&state, &user, well_known::SETTINGS_EDIT).await?;

    let report = state.consistency_service.repair_as(&user).await?;
    Ok(Json(ConsistencyReportResponse::from(report)))
}
