//! Token verification seam
//!
//! The content services trust the `user_id` they are given. Whatever sits in
//! front of them (HTTP handlers, RPC, the admin binary) proves ownership first
//! through a [`TokenVerifier`].

use crate::models::UserId;
use crate::services::ContentServiceError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

#[async_trait]
pub trait TokenVerifier: Send + Sync {
    /// Whether `token` is a live credential of `user_id`
    async fn verify(&self, user_id: UserId, token: &str) -> bool;
}

/// Fail with `Unauthorized` unless `verifier` accepts `token` for `user_id`
pub async fn authorize(
    verifier: &dyn TokenVerifier,
    user_id: UserId,
    token: &str,
) -> Result<(), ContentServiceError> {
    if verifier.verify(user_id, token).await {
        Ok(())
    } else {
        tracing::warn!("Rejected token for user {}", user_id);
        Err(ContentServiceError::unauthorized(user_id))
    }
}

/// In-memory verifier holding a fixed set of tokens per user
#[derive(Debug, Default)]
pub struct StaticTokenVerifier {
    tokens: RwLock<HashMap<UserId, Vec<String>>>,
}

impl StaticTokenVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn grant(&self, user_id: UserId, token: impl Into<String>) {
        if let Ok(mut tokens) = self.tokens.write() {
            tokens.entry(user_id).or_default().push(token.into());
        }
    }

    /// Revoke every token of `user_id`
    pub fn revoke(&self, user_id: UserId) {
        if let Ok(mut tokens) = self.tokens.write() {
            tokens.remove(&user_id);
        }
    }
}

#[async_trait]
impl TokenVerifier for StaticTokenVerifier {
    async fn verify(&self, user_id: UserId, token: &str) -> bool {
        self.tokens
            .read()
            .map(|tokens| {
                tokens
                    .get(&user_id)
                    .is_some_and(|granted| granted.iter().any(|t| t == token))
            })
            .unwrap_or(false)
    }
}
