//! Request bodies and the rows written to the store.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of `/users/create-user`, posted by the identity provider once a sign-up is confirmed
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewUser {
    /// The Cognito subject of the new user
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

impl NewUser {
    /// The local part of the email address, or `unknown` without one
    #[must_use]
    pub fn username(&self) -> String {
        self.email
            .as_deref()
            .and_then(|email| email.split('@').next())
            .filter(|local| !local.is_empty())
            .unwrap_or("unknown")
            .to_owned()
    }

    #[must_use]
    pub fn to_row(&self) -> UserRow {
        UserRow {
            cognito_id: self.id.clone(),
            username: self.username(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserRow {
    pub cognito_id: String,
    pub username: String,
}

/// Body of `/recipes/create-recipe`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewRecipe {
    pub name: String,
    pub preparation: Value,
    pub ingredients: Value,
    #[serde(rename = "totalTime")]
    pub total_time: Value,
    #[serde(rename = "type")]
    pub recipe_type: Value,
    pub cuisine: Value,
}

impl NewRecipe {
    /// The row to insert, owned by `user_id`
    #[must_use]
    pub fn into_row(self, user_id: &str) -> RecipeRow {
        RecipeRow {
            name: self.name,
            preparation: self.preparation,
            ingredients: self.ingredients,
            user_id: user_id.to_owned(),
            metadata: RecipeMetadata {
                total_time: self.total_time,
                recipe_type: self.recipe_type,
                cuisine: self.cuisine,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecipeMetadata {
    pub total_time: Value,
    #[serde(rename = "type")]
    pub recipe_type: Value,
    pub cuisine: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecipeRow {
    pub name: String,
    pub preparation: Value,
    pub ingredients: Value,
    pub user_id: String,
    pub metadata: RecipeMetadata,
}

/// Recipes are keyed by an integer, but clients sometimes send it as a string
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RecipeId {
    Number(i64),
    Text(String),
}

impl fmt::Display for RecipeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(id) => write!(f, "{id}"),
            Self::Text(id) => f.write_str(id),
        }
    }
}

/// Body of `/recipes/delete-recipe`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DeleteRecipe {
    pub id: RecipeId,
}
