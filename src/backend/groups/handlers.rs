/**
 * Group Handlers
 *
 * HTTP handlers for the `/api/groups/...` endpoints. Each handler validates through the
 * `GroupRegistry` and returns `{success, ...}` on success or the JSON error
 * body of `BackendError`.
 *
 * # Endpoints
 *
 * - `POST /api/groups/create` - create a group
 * - `POST /api/groups/change-password` - creator or admin
 * - `POST /api/groups/join` - check the password, optionally add the user
 * - `GET  /api/groups/list` - all groups
 * - `GET  /api/groups/membership?group=&userId=` - membership check
 * - `POST /api/groups/remove-member` - admin only
 * - `POST /api/groups/rename` - admin only
 * - `POST /api/groups/delete` - admin only
 */

use std::sync::Arc;

use axum::{extract::State, response::Json};

use crate::backend::error::BackendResult;
use crate::backend::groups::GroupRegistry;
use crate::backend::middleware::{ApiJson, ApiQuery};
use crate::shared::group::{
    ChangePasswordRequest, CreateGroupRequest, DeleteGroupRequest, GroupResponse,
    JoinGroupRequest, ListGroupsResponse, MembershipQuery, MembershipResponse,
    RemoveMemberRequest, RenameGroupRequest, SuccessResponse,
};

/// POST /api/groups/create
pub async fn create_group(
    State(registry): State<Arc<GroupRegistry>>,
    ApiJson(request): ApiJson<CreateGroupRequest>,
) -> BackendResult<Json<GroupResponse>> {
    let group = registry
        .create(&request.name, &request.password, &request.user_id)
        .await?;
    Ok(Json(GroupResponse {
        success: true,
        group,
    }))
}

/// POST /api/groups/change-password
pub async fn change_password(
    State(registry): State<Arc<GroupRegistry>>,
    ApiJson(request): ApiJson<ChangePasswordRequest>,
) -> BackendResult<Json<SuccessResponse>> {
    registry
        .change_password(&request.group, &request.new_password, &request.user_id)
        .await?;
    Ok(Json(SuccessResponse::ok()))
}

/// POST /api/groups/join
pub async fn join_group(
    State(registry): State<Arc<GroupRegistry>>,
    ApiJson(request): ApiJson<JoinGroupRequest>,
) -> BackendResult<Json<SuccessResponse>> {
    registry
        .join(&request.group, &request.password, request.user_id.as_deref())
        .await?;
    Ok(Json(SuccessResponse::ok()))
}

/// GET /api/groups/list
pub async fn list_groups(
    State(registry): State<Arc<GroupRegistry>>,
) -> BackendResult<Json<ListGroupsResponse>> {
    let groups = registry.list().await?;
    Ok(Json(ListGroupsResponse {
        success: true,
        groups,
    }))
}

/// GET /api/groups/membership
pub async fn check_membership(
    State(registry): State<Arc<GroupRegistry>>,
    ApiQuery(query): ApiQuery<MembershipQuery>,
) -> BackendResult<Json<MembershipResponse>> {
    let is_member = registry.is_member(&query.group, &query.user_id).await?;
    Ok(Json(MembershipResponse {
        success: true,
        is_member,
    }))
}

/// POST /api/groups/remove-member
pub async fn remove_member(
    State(registry): State<Arc<GroupRegistry>>,
    ApiJson(request): ApiJson<RemoveMemberRequest>,
) -> BackendResult<Json<GroupResponse>> {
    let group = registry
        .remove_member(request.group_id, &request.member_id, &request.user_id)
        .await?;
    Ok(Json(GroupResponse {
        success: true,
        group,
    }))
}

/// POST /api/groups/rename
pub async fn rename_group(
    State(registry): State<Arc<GroupRegistry>>,
    ApiJson(request): ApiJson<RenameGroupRequest>,
) -> BackendResult<Json<GroupResponse>> {
    let group = registry
        .rename(request.group_id, &request.new_name, &request.user_id)
        .await?;
    Ok(Json(GroupResponse {
        success: true,
        group,
    }))
}

/// POST /api/groups/delete
pub async fn delete_group(
    State(registry): State<Arc<GroupRegistry>>,
    ApiJson(request): ApiJson<DeleteGroupRequest>,
) -> BackendResult<Json<SuccessResponse>> {
    registry.delete(request.group_id, &request.user_id).await?;
    Ok(Json(SuccessResponse::ok()))
}
