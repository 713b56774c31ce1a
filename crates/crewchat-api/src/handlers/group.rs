//! Group CRUD, membership, and group-message fallback handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use validator::Validate;

use crewchat_core::types::{GroupId, UserId};
use crewchat_entity::group::GroupDetail;
use crewchat_entity::message::GroupMessage;
use crewchat_service::group::CreateGroupRequest;

use crate::dto::request::{
    AddMembersRequest, CreateGroupBody, SendGroupMessageRequest, UpdateMemberRoleBody,
};
use crate::dto::response::{GroupHistoryResponse, GroupListResponse};
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// POST /api/groups — create a group owned by the caller.
pub async fn create_group(
    State(state): State<AppState>,
    user: AuthUser,
    Json(body): Json<CreateGroupBody>,
) -> Result<(StatusCode, Json<GroupDetail>), ApiError> {
    body.validate()?;
    let detail = state
        .group_service
        .create_group(
            &user,
            CreateGroupRequest {
                name: body.name,
                description: body.description,
                member_ids: body.member_ids,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(detail)))
}

/// GET /api/groups — groups the caller belongs to.
pub async fn list_groups(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<GroupListResponse>, ApiError> {
    let groups = state.group_service.list_my_groups(&user).await?;
    Ok(Json(GroupListResponse { groups }))
}

/// GET /api/groups/{id} — group with members. Members only.
pub async fn get_group(
    State(state): State<AppState>,
    user: AuthUser,
    Path(group_id): Path<GroupId>,
) -> Result<Json<GroupDetail>, ApiError> {
    let detail = state.group_service.get_group(&user, group_id).await?;
    Ok(Json(detail))
}

/// DELETE /api/groups/{id} — delete the group. Owner only.
pub async fn delete_group(
    State(state): State<AppState>,
    user: AuthUser,
    Path(group_id): Path<GroupId>,
) -> Result<StatusCode, ApiError> {
    state.group_service.delete_group(&user, group_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/groups/{id}/members — add members. Owner or admin.
pub async fn add_members(
    State(state): State<AppState>,
    user: AuthUser,
    Path(group_id): Path<GroupId>,
    Json(req): Json<AddMembersRequest>,
) -> Result<Json<GroupDetail>, ApiError> {
    req.validate()?;
    let detail = state
        .group_service
        .add_members(&user, group_id, req.member_ids)
        .await?;
    Ok(Json(detail))
}

/// DELETE /api/groups/{id}/members/{user_id} — remove a member.
pub async fn remove_member(
    State(state): State<AppState>,
    user: AuthUser,
    Path((group_id, member_id)): Path<(GroupId, UserId)>,
) -> Result<StatusCode, ApiError> {
    state
        .group_service
        .remove_member(&user, group_id, member_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/groups/{id}/members/{user_id}/role — change a member's role.
pub async fn update_member_role(
    State(state): State<AppState>,
    user: AuthUser,
    Path((group_id, member_id)): Path<(GroupId, UserId)>,
    Json(body): Json<UpdateMemberRoleBody>,
) -> Result<StatusCode, ApiError> {
    state
        .group_service
        .update_member_role(&user, group_id, member_id, body.role)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/groups/{id}/leave — leave the group (owner cannot).
pub async fn leave_group(
    State(state): State<AppState>,
    user: AuthUser,
    Path(group_id): Path<GroupId>,
) -> Result<StatusCode, ApiError> {
    state.group_service.leave_group(&user, group_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/groups/{id}/messages — send a group message over HTTP.
pub async fn send_group_message(
    State(state): State<AppState>,
    user: AuthUser,
    Path(group_id): Path<GroupId>,
    Json(req): Json<SendGroupMessageRequest>,
) -> Result<(StatusCode, Json<GroupMessage>), ApiError> {
    req.validate()?;
    let message = state
        .chat_service
        .send_group(&user, group_id, &req.text, req.client_message_id)
        .await?;
    Ok((StatusCode::CREATED, Json(message)))
}

/// GET /api/groups/{id}/messages — group history. Members only.
pub async fn group_history(
    State(state): State<AppState>,
    user: AuthUser,
    Path(group_id): Path<GroupId>,
) -> Result<Json<GroupHistoryResponse>, ApiError> {
    let messages = state.chat_service.group_history(&user, group_id).await?;
    Ok(Json(GroupHistoryResponse { messages }))
}
