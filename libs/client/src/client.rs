//! Typed HTTP client for the tracker API

use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::error::StoreError;
use crate::models::{
    CurrentUser, FriendRef, NewSession, Session, SessionPatch, UserPatch, UserSummary,
};

/// Envelope for list responses
#[derive(Deserialize)]
struct DataEnvelope<T> {
    data: Vec<T>,
}

/// Body of a successful session creation
#[derive(Deserialize)]
struct CreatedSession {
    id: String,
}

/// Shape of every error body the server produces
#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// Typed client for the tracker's REST endpoints
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
}

impl ApiClient {
    /// Create a client against a base URL such as `http://localhost:3000`
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            http: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Turn a non-success response into `StoreError::Api`
    async fn check(response: reqwest::Response) -> Result<reqwest::Response, StoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = match response.json::<ErrorBody>().await {
            Ok(body) => body.error,
            Err(_) => format!("Request failed with status {}", status.as_u16()),
        };
        Err(StoreError::Api {
            status: status.as_u16(),
            message,
        })
    }

    /// Decode a response body, reporting what failed to decode
    async fn decode<T: DeserializeOwned>(
        response: reqwest::Response,
        what: &str,
    ) -> Result<T, StoreError> {
        let text = response.text().await?;
        serde_json::from_str(&text)
            .map_err(|e| StoreError::Decode(format!("{}: {}", what, e)))
    }

    /// GET /api/users
    pub async fn list_users(&self) -> Result<Vec<UserSummary>, StoreError> {
        let response = self.http.get(self.url("/api/users")).send().await?;
        let envelope: DataEnvelope<UserSummary> =
            Self::decode(Self::check(response).await?, "user list").await?;
        Ok(envelope.data)
    }

    /// GET /api/users/:username
    pub async fn get_user(&self, username: &str) -> Result<CurrentUser, StoreError> {
        let response = self
            .http
            .get(self.url(&format!("/api/users/{}", username)))
            .send()
            .await?;
        Self::decode(Self::check(response).await?, "user record").await
    }

    /// PUT /api/users/:username
    pub async fn update_user(&self, username: &str, patch: &UserPatch) -> Result<(), StoreError> {
        let response = self
            .http
            .put(self.url(&format!("/api/users/{}", username)))
            .json(patch)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    /// GET /api/friends
    pub async fn list_friends(&self) -> Result<Vec<FriendRef>, StoreError> {
        let response = self.http.get(self.url("/api/friends")).send().await?;
        let envelope: DataEnvelope<FriendRef> =
            Self::decode(Self::check(response).await?, "friends list").await?;
        Ok(envelope.data)
    }

    /// GET /api/sessions
    pub async fn list_sessions(&self) -> Result<Vec<Session>, StoreError> {
        let response = self.http.get(self.url("/api/sessions")).send().await?;
        let envelope: DataEnvelope<Session> =
            Self::decode(Self::check(response).await?, "session list").await?;
        Ok(envelope.data)
    }

    /// GET /api/sessions/:id
    pub async fn get_session(&self, id: &str) -> Result<Session, StoreError> {
        let response = self
            .http
            .get(self.url(&format!("/api/sessions/{}", id)))
            .send()
            .await?;
        Self::decode(Self::check(response).await?, "session record").await
    }

    /// POST /api/sessions, returning the new id only
    pub async fn create_session(&self, new: &NewSession) -> Result<String, StoreError> {
        let response = self
            .http
            .post(self.url("/api/sessions"))
            .json(new)
            .send()
            .await?;
        let created: CreatedSession =
            Self::decode(Self::check(response).await?, "created session").await?;
        Ok(created.id)
    }

    /// PUT /api/sessions/:id
    pub async fn update_session(
        &self,
        id: &str,
        patch: &SessionPatch,
    ) -> Result<(), StoreError> {
        let response = self
            .http
            .put(self.url(&format!("/api/sessions/{}", id)))
            .json(patch)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slashes_are_stripped_from_the_base_url() {
        let client = ApiClient::new("http://localhost:3000///");
        assert_eq!(client.url("/api/users"), "http://localhost:3000/api/users");
    }
}
