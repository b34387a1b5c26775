//! `/login` and `/register`.
//!
//! Both return an access token which is written to the token store and then sent as
//! a bearer credential on every later request.

use crate::{ApiClient, ClientError, ClientResult};
use cartao_core::{AccessToken, Credentials};
use serde::Deserialize;

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

impl ApiClient {
    pub async fn login(&self, credentials: &Credentials) -> ClientResult<()> {
        self.authenticate("login", credentials).await?;
        tracing::info!(user = %credentials.username, "logged in");
        Ok(())
    }

    pub async fn register(&self, credentials: &Credentials) -> ClientResult<()> {
        self.authenticate("register", credentials).await?;
        tracing::info!(user = %credentials.username, "registered and logged in");
        Ok(())
    }

    /// Client-side only: the backend keeps no session to close.
    pub fn logout(&self) -> ClientResult<()> {
        self.tokens().clear()?;
        tracing::info!("logged out");
        Ok(())
    }

    async fn authenticate(&self, path: &str, credentials: &Credentials) -> ClientResult<()> {
        let response: TokenResponse = self.post_json(path, credentials).await?;
        let token = AccessToken::new(&response.access_token)
            .map_err(|_| ClientError::Api {
                status: 200,
                message: "backend returned an empty access token".into(),
            })?;
        self.tokens().store(&token)
    }
}
