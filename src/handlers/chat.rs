use axum::extract::State;

use super::{ApiResult, Validator, ok};
use crate::{
    AppState,
    auth::AuthUser,
    extract::AppJson,
    models::{ChatReply, ChatRequest},
};

/// send_message
///
/// [Authenticated Route] Relays one message to the LLM and returns its answer.
/// Any upstream failure answers 502 with a generic message.
#[utoipa::path(
    post,
    path = "/chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Reply", body = ChatReply),
        (status = 400, description = "Empty message"),
        (status = 502, description = "Chat service unavailable")
    )
)]
pub async fn send_message(
    user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<ChatRequest>,
) -> ApiResult<ChatReply> {
    Validator::new().required("message", &payload.message).finish()?;

    tracing::debug!(user_id = %user.id, chars = payload.message.len(), "relaying chat message");
    let reply = state.chat.send(payload.message.trim()).await?;
    ok("Chat reply", ChatReply { reply })
}
