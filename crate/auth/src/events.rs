//! Structured event recording for the authentication components.
//!
//! Components never log through ambient state of their own: each one receives an
//! [`AuthEvents`] capability when it is built and reports what happened through it.
//! [`TracingEvents`] forwards to `tracing`; tests substitute a recorder.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::error::ReasonCode;

/// Something worth recording while fetching keys or verifying a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    KeySetFetched { uri: String, keys: usize },
    KeySetFetchFailed { uri: String, detail: String },
    KeySetServedFromCache { keys: usize },
    KeyEntrySkipped { detail: String },
    KeyFound { kid: String },
    KeyMissing { kid: String },
    TokenVerified { subject: Option<String> },
    TokenRejected { reason: ReasonCode, detail: String },
}

pub trait AuthEvents: Send + Sync {
    fn record(&self, event: AuthEvent);
}

pub type SharedEvents = Arc<dyn AuthEvents>;

/// Emits every event as a `tracing` event carrying the component name.
#[derive(Debug, Clone, Copy)]
pub struct TracingEvents {
    component: &'static str,
}

impl TracingEvents {
    #[must_use]
    pub const fn new(component: &'static str) -> Self {
        Self { component }
    }

    #[must_use]
    pub fn shared(component: &'static str) -> SharedEvents {
        Arc::new(Self::new(component))
    }
}

impl AuthEvents for TracingEvents {
    fn record(&self, event: AuthEvent) {
        let component = self.component;
        match event {
            AuthEvent::KeySetFetched { uri, keys } => {
                info!(component, uri = %uri, keys, "Successfully fetched JWKS with {keys} keys");
            }
            AuthEvent::KeySetFetchFailed { uri, detail } => {
                warn!(component, uri = %uri, "Failed to fetch JWKS: {detail}");
            }
            AuthEvent::KeySetServedFromCache { keys } => {
                debug!(component, keys, "JWKS served from cache");
            }
            AuthEvent::KeyEntrySkipped { detail } => {
                debug!(component, "Ignoring invalid JWK: {detail}");
            }
            AuthEvent::KeyFound { kid } => {
                debug!(component, kid = %kid, "Found key with kid: {kid}");
            }
            AuthEvent::KeyMissing { kid } => {
                warn!(component, kid = %kid, "Key with kid '{kid}' not found in JWKS");
            }
            AuthEvent::TokenVerified { subject } => {
                info!(
                    component,
                    subject = subject.as_deref().unwrap_or_default(),
                    "Successfully validated token"
                );
            }
            AuthEvent::TokenRejected { reason, detail } => {
                let reason: &'static str = reason.into();
                warn!(component, reason, "Token validation failed: {detail}");
            }
        }
    }
}
