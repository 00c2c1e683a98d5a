/**
 * Message Handlers
 *
 * HTTP handlers for `/api/messages`. Edits, deletes and reactions made here
 * are published to the group's live room by the `MessageService`, so socket
 * subscribers see them even though the caller isn't on the socket.
 *
 * # Endpoints
 *
 * - `GET    /api/messages?group=&day=YYYY-MM-DD` - one day of history
 * - `PUT    /api/messages/{id}` - edit (header `x-user-id`, author only)
 * - `DELETE /api/messages/{id}` - delete (header `x-user-email`, admin only)
 * - `POST   /api/messages/{id}/reactions` - toggle a reaction
 */

use std::sync::Arc;

use axum::{extract::State, response::Json};
use uuid::Uuid;

use crate::backend::chat::MessageService;
use crate::backend::error::BackendResult;
use crate::backend::middleware::{ApiJson, ApiPath, ApiQuery, UserEmailHeader, UserIdHeader};
use crate::shared::group::SuccessResponse;
use crate::shared::message::{
    EditMessageRequest, HistoryQuery, HistoryResponse, ReactRequest, ReactResponse,
};

/// GET /api/messages
pub async fn get_history(
    State(service): State<Arc<MessageService>>,
    ApiQuery(query): ApiQuery<HistoryQuery>,
) -> BackendResult<Json<HistoryResponse>> {
    let messages = service.history(&query.group, query.day.as_deref()).await?;
    tracing::debug!("Returning {} messages for '{}'", messages.len(), query.group);
    Ok(Json(HistoryResponse { messages }))
}

/// PUT /api/messages/{id}
pub async fn edit_message(
    State(service): State<Arc<MessageService>>,
    ApiPath(id): ApiPath<Uuid>,
    UserIdHeader(user_id): UserIdHeader,
    ApiJson(request): ApiJson<EditMessageRequest>,
) -> BackendResult<Json<SuccessResponse>> {
    service.edit(id, &user_id, &request.message).await?;
    Ok(Json(SuccessResponse::ok()))
}

/// DELETE /api/messages/{id}
pub async fn delete_message(
    State(service): State<Arc<MessageService>>,
    ApiPath(id): ApiPath<Uuid>,
    UserEmailHeader(email): UserEmailHeader,
) -> BackendResult<Json<SuccessResponse>> {
    service.delete(id, &email).await?;
    Ok(Json(SuccessResponse::ok()))
}

/// POST /api/messages/{id}/reactions
pub async fn react_to_message(
    State(service): State<Arc<MessageService>>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(request): ApiJson<ReactRequest>,
) -> BackendResult<Json<ReactResponse>> {
    let reactions = service.react(id, &request.user_id, &request.emoji).await?;
    Ok(Json(ReactResponse {
        success: true,
        reactions,
    }))
}
