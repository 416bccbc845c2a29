use actix_web::{
    delete, get, post,
    web::{Data, Json},
};
use serde_json::{Value, json};
use tracing::info;

use crate::{
    middlewares::AuthenticatedUser,
    result::HResult,
    store::{DeleteRecipe, NewRecipe, ResourceStore},
};

#[get("/")]
pub(crate) async fn list_recipes(
    user: AuthenticatedUser,
    store: Data<dyn ResourceStore>,
) -> HResult<Json<Value>> {
    let owner = user.subject()?;
    info!("GET /recipes/ {owner}");
    let recipes = store.list_recipes(&user.token, owner).await?;
    Ok(Json(Value::Array(recipes)))
}

#[post("/create-recipe")]
pub(crate) async fn create_recipe(
    user: AuthenticatedUser,
    recipe: Json<NewRecipe>,
    store: Data<dyn ResourceStore>,
) -> HResult<Json<Value>> {
    let owner = user.subject()?;
    let recipe = recipe.into_inner();
    info!("POST /recipes/create-recipe {owner}: {}", recipe.name);
    store
        .create_recipe(&user.token, &recipe.into_row(owner))
        .await?;
    Ok(Json(json!({ "status": "success" })))
}

/// Delete one of the caller's recipes; the recipes of other users are out of reach.
#[delete("/delete-recipe")]
pub(crate) async fn delete_recipe(
    user: AuthenticatedUser,
    request: Json<DeleteRecipe>,
    store: Data<dyn ResourceStore>,
) -> HResult<Json<Value>> {
    let owner = user.subject()?;
    info!("DELETE /recipes/delete-recipe {owner}: {}", request.id);
    store
        .delete_recipe(&user.token, &request.id, owner)
        .await?;
    Ok(Json(json!({ "status": "success" })))
}
