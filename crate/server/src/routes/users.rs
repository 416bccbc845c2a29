use actix_web::web::{Data, Json};
use serde_json::{Value, json};
use tracing::info;

use crate::{
    middlewares::AuthenticatedUser,
    result::HResult,
    store::{NewUser, ResourceStore},
};

/// List the users visible to the caller.
pub(crate) async fn list_users(
    user: AuthenticatedUser,
    store: Data<dyn ResourceStore>,
) -> HResult<Json<Value>> {
    info!("GET /users/ {:?}", user.claims.subject());
    let users = store.list_users(&user.token).await?;
    Ok(Json(Value::Array(users)))
}

/// Register the user Cognito has just confirmed.
///
/// Called by the backend, with the service role of the store.
pub(crate) async fn create_user(
    new_user: Json<NewUser>,
    store: Data<dyn ResourceStore>,
) -> HResult<Json<Value>> {
    let new_user = new_user.into_inner();
    info!("POST /users/create-user {}", new_user.id);
    let rows = store.create_user(&new_user.to_row()).await?;
    Ok(Json(json!({ "status": "success", "user": rows })))
}
