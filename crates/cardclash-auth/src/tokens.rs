//! A fixed token table, for tests and local play.

use std::collections::HashMap;

use cardclash_protocol::PlayerId;

use crate::{AuthError, Authenticator};

/// Maps opaque tokens to uids from a table fixed at startup.
#[derive(Debug, Clone, Default)]
pub struct StaticTokens {
    tokens: HashMap<String, PlayerId>,
}

impl StaticTokens {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `token` as identifying `uid`.
    pub fn with(mut self, token: impl Into<String>, uid: impl Into<String>) -> Self {
        self.tokens.insert(token.into(), PlayerId::new(uid));
        self
    }

    /// Parses a `token=uid,token=uid` list. Malformed pairs are skipped.
    pub fn parse(list: &str) -> Self {
        let tokens = list
            .split(',')
            .filter_map(|pair| {
                let (token, uid) = pair.split_once('=')?;
                let (token, uid) = (token.trim(), uid.trim());
                (!token.is_empty() && !uid.is_empty())
                    .then(|| (token.to_string(), PlayerId::new(uid)))
            })
            .collect();
        Self { tokens }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl Authenticator for StaticTokens {
    async fn authenticate(&self, token: &str) -> Result<PlayerId, AuthError> {
        match self.tokens.get(token) {
            Some(uid) => Ok(uid.clone()),
            None => {
                tracing::debug!("unknown token presented");
                Err(AuthError::Rejected("unknown token".into()))
            }
        }
    }
}
