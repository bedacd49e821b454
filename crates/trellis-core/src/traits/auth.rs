// SPDX-FileCopyrightText: 2026 Trellis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Authentication plugin contract.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::TrellisError;
use crate::traits::plugin::Plugin;
use crate::types::JsonMap;

/// Responses that report whether the subject is authenticated.
pub trait Authenticated {
    fn authenticated(&self) -> bool;
}

/// Default response shape: the verdict plus backend-specific fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthOutcome {
    pub authenticated: bool,
    #[serde(flatten)]
    pub extra: JsonMap,
}

impl Authenticated for AuthOutcome {
    fn authenticated(&self) -> bool {
        self.authenticated
    }
}

/// Verifies identities and manages login sessions.
#[async_trait]
pub trait AuthenticationPlugin: Plugin {
    type LoginRequest: Send + 'static;
    type LoginResponse: Authenticated + Send + 'static;
    type LogoutRequest: Send + 'static;
    type LogoutResponse: Authenticated + Send + 'static;
    type CheckRequest: Send + 'static;
    type CheckResponse: Authenticated + Send + 'static;

    /// One of the IANA-registered SASL mechanism names (e.g. `PLAIN`, `SCRAM-SHA-256`).
    fn sasl_mechanism(&self) -> &str;

    async fn login(&self, args: Self::LoginRequest) -> Result<Self::LoginResponse, TrellisError>;

    async fn logout(&self, args: Self::LogoutRequest)
        -> Result<Self::LogoutResponse, TrellisError>;

    async fn check(&self, args: Self::CheckRequest) -> Result<Self::CheckResponse, TrellisError>;
}

/// Authentication plugin over JSON requests; the default slot type.
pub type DynAuthenticationPlugin = dyn AuthenticationPlugin<
        LoginRequest = JsonMap,
        LoginResponse = AuthOutcome,
        LogoutRequest = JsonMap,
        LogoutResponse = AuthOutcome,
        CheckRequest = JsonMap,
        CheckResponse = AuthOutcome,
    >;
