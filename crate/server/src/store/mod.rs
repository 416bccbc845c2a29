//! Persistence of users and recipes.
//!
//! The server keeps no state of its own: rows live in a hosted Postgres reached through its
//! PostgREST API. Reads and recipe writes are forwarded with the caller's own ID token, so the
//! row level security policies of the project apply to them.

mod models;
mod postgrest;

use async_trait::async_trait;
pub use models::{DeleteRecipe, NewRecipe, NewUser, RecipeId, RecipeMetadata, RecipeRow, UserRow};
pub use postgrest::SupabaseStore;
use serde_json::Value;
use strum::{AsRefStr, Display};

use crate::result::HResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum Table {
    Users,
    Recipes,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ResourceStore: Send + Sync {
    /// All the user rows visible to the caller
    async fn list_users(&self, caller_token: &str) -> HResult<Vec<Value>>;

    /// Insert a user with the service role; returns the inserted rows
    async fn create_user(&self, user: &UserRow) -> HResult<Vec<Value>>;

    /// The recipes owned by `user_id`
    async fn list_recipes(&self, caller_token: &str, user_id: &str) -> HResult<Vec<Value>>;

    /// Insert a recipe; returns the inserted rows
    async fn create_recipe(&self, caller_token: &str, recipe: &RecipeRow) -> HResult<Vec<Value>>;

    /// Delete the recipe `id` if it is owned by `user_id`
    async fn delete_recipe(&self, caller_token: &str, id: &RecipeId, user_id: &str)
    -> HResult<()>;
}
