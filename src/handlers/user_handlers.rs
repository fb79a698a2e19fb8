use crate::error::AppError;
use crate::handlers::extract::{JsonBody, JsonRequestBody};
use crate::handlers::MessageResponse;
use crate::models::bulk_action::{ActorRef, BulkAction, TargetIds};
use crate::models::user::UserListing;
use crate::services::BulkActionError;
use crate::AppState;
use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::Value;
use tracing::instrument;

/// Body shared by the block, unblock and delete endpoints.
///
/// Both fields stay untyped so that shape problems surface as the service's
/// own 400/403 answers. A body that is not a JSON object has no actor.
#[derive(Debug, Deserialize)]
pub struct BulkActionBody {
    pub ids: Option<Value>,
    #[serde(rename = "currentUserId")]
    pub current_user_id: Option<Value>,
}

impl JsonRequestBody for BulkActionBody {
    fn rejected() -> AppError {
        BulkActionError::MissingActor.into()
    }
}

#[instrument(skip_all)]
pub async fn list_users_handler(
    State(app_state): State<AppState>,
) -> Result<Json<Vec<UserListing>>, AppError> {
    let users = app_state.user_service.list_users().await?;
    Ok(Json(users.into_iter().map(UserListing::from).collect()))
}

pub async fn block_users_handler(
    State(app_state): State<AppState>,
    JsonBody(body): JsonBody<BulkActionBody>,
) -> Result<Json<MessageResponse>, AppError> {
    run_bulk_action(&app_state, body, BulkAction::Block).await
}

pub async fn unblock_users_handler(
    State(app_state): State<AppState>,
    JsonBody(body): JsonBody<BulkActionBody>,
) -> Result<Json<MessageResponse>, AppError> {
    run_bulk_action(&app_state, body, BulkAction::Unblock).await
}

pub async fn delete_users_handler(
    State(app_state): State<AppState>,
    JsonBody(body): JsonBody<BulkActionBody>,
) -> Result<Json<MessageResponse>, AppError> {
    run_bulk_action(&app_state, body, BulkAction::Delete).await
}

#[instrument(skip(app_state, body))]
async fn run_bulk_action(
    app_state: &AppState,
    body: BulkActionBody,
    action: BulkAction,
) -> Result<Json<MessageResponse>, AppError> {
    let actor = ActorRef::from_json(body.current_user_id.as_ref());
    let targets = TargetIds::from_json(body.ids.as_ref());

    let outcome = app_state
        .access_service
        .apply_bulk_action(actor, targets, action)
        .await?;

    Ok(Json(MessageResponse::new(outcome.action.success_message())))
}
