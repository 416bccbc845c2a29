use clap::Args;
use serde::{Deserialize, Serialize};

/// Access to the hosted Postgres (PostgREST) project holding users and recipes.
#[derive(Default, Args, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct BaasConfig {
    /// The project URL, for instance `https://abcdefgh.supabase.co`
    #[clap(long, env = "PROJ_URL")]
    pub proj_url: Option<String>,

    /// The public (anon) API key, sent along the caller's own token
    #[clap(long, env = "ANON_KEY", hide_env_values = true)]
    pub anon_key: Option<String>,

    /// The service role key, used to register new users
    #[clap(long, env = "SERVICE_ROLE", hide_env_values = true)]
    pub service_role: Option<String>,

    /// The shared secret the identity provider's post-confirmation hook presents
    /// as a bearer token when calling `/users/create-user`
    #[clap(long, env = "BACKEND_SECRET", hide_env_values = true, verbatim_doc_comment)]
    pub backend_secret: Option<String>,
}

fn mask(value: Option<&String>) -> &'static str {
    if value.is_some() { "****" } else { "<unset>" }
}

impl std::fmt::Debug for BaasConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BaasConfig")
            .field("proj_url", &self.proj_url)
            .field("anon_key", &mask(self.anon_key.as_ref()))
            .field("service_role", &mask(self.service_role.as_ref()))
            .field("backend_secret", &mask(self.backend_secret.as_ref()))
            .finish()
    }
}
