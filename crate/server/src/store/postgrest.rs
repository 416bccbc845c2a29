use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, header};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, trace};
use url::Url;

use super::{RecipeId, RecipeRow, ResourceStore, Table, UserRow};
use crate::{config::BaasParams, error::HashaError, result::HResult};

const STORE_TIMEOUT: Duration = Duration::from_secs(30);

/// A [`ResourceStore`] backed by the PostgREST API of a Supabase project.
#[derive(Clone)]
pub struct SupabaseStore {
    client: Client,
    rest_url: Url,
    anon_key: String,
    service_role_key: String,
}

impl SupabaseStore {
    pub fn new(params: &BaasParams) -> HResult<Self> {
        let client = Client::builder().timeout(STORE_TIMEOUT).build()?;
        let rest_url = Url::parse(&format!(
            "{}/rest/v1/",
            params.project_url.as_str().trim_end_matches('/')
        ))?;
        Ok(Self {
            client,
            rest_url,
            anon_key: params.anon_key.clone(),
            service_role_key: params.service_role_key.clone(),
        })
    }

    #[must_use]
    pub const fn rest_url(&self) -> &Url {
        &self.rest_url
    }

    fn request(
        &self,
        method: Method,
        table: Table,
        api_key: &str,
        bearer: &str,
    ) -> HResult<RequestBuilder> {
        let url = self.rest_url.join(table.as_ref())?;
        trace!("{method} {url}");
        Ok(self
            .client
            .request(method, url)
            .header("apikey", api_key)
            .header(header::AUTHORIZATION, format!("Bearer {bearer}")))
    }

    fn as_caller(
        &self,
        method: Method,
        table: Table,
        caller_token: &str,
    ) -> HResult<RequestBuilder> {
        self.request(method, table, &self.anon_key, caller_token)
    }

    async fn insert<T: Serialize + Sync>(
        &self,
        request: RequestBuilder,
        row: &T,
    ) -> HResult<Vec<Value>> {
        let response = send(request.header("Prefer", "return=representation").json(row)).await?;
        rows(response).await
    }
}

impl std::fmt::Debug for SupabaseStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseStore")
            .field("rest_url", &self.rest_url.as_str())
            .finish_non_exhaustive()
    }
}

async fn send(request: RequestBuilder) -> HResult<Response> {
    let response = request.send().await?;
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(HashaError::DatabaseError(format!("{status}: {body}")))
}

async fn rows(response: Response) -> HResult<Vec<Value>> {
    let body = response.bytes().await?;
    if body.is_empty() {
        return Ok(Vec::new());
    }
    match serde_json::from_slice::<Value>(&body)? {
        Value::Array(rows) => Ok(rows),
        Value::Null => Ok(Vec::new()),
        other => Err(HashaError::ConversionError(format!(
            "expected an array of rows, got: {other}"
        ))),
    }
}

#[async_trait]
impl ResourceStore for SupabaseStore {
    async fn list_users(&self, caller_token: &str) -> HResult<Vec<Value>> {
        let request = self
            .as_caller(Method::GET, Table::Users, caller_token)?
            .query(&[("select", "*")]);
        let users = rows(send(request).await?).await?;
        debug!("{} user rows", users.len());
        Ok(users)
    }

    async fn create_user(&self, user: &UserRow) -> HResult<Vec<Value>> {
        let request = self.request(
            Method::POST,
            Table::Users,
            &self.service_role_key,
            &self.service_role_key,
        )?;
        self.insert(request, user).await
    }

    async fn list_recipes(&self, caller_token: &str, user_id: &str) -> HResult<Vec<Value>> {
        let request = self
            .as_caller(Method::GET, Table::Recipes, caller_token)?
            .query(&[("select", "*".to_owned()), ("user_id", format!("eq.{user_id}"))]);
        rows(send(request).await?).await
    }

    async fn create_recipe(&self, caller_token: &str, recipe: &RecipeRow) -> HResult<Vec<Value>> {
        let request = self.as_caller(Method::POST, Table::Recipes, caller_token)?;
        self.insert(request, recipe).await
    }

    async fn delete_recipe(
        &self,
        caller_token: &str,
        id: &RecipeId,
        user_id: &str,
    ) -> HResult<()> {
        let request = self
            .as_caller(Method::DELETE, Table::Recipes, caller_token)?
            .query(&[("id", format!("eq.{id}")), ("user_id", format!("eq.{user_id}"))]);
        send(request).await?;
        Ok(())
    }
}
