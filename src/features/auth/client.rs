//! Remote auth endpoints as a trait, so the submission flow can run against the
//! browser's fetch or an in-memory fake.

use super::types::{LoginRequest, OAuthInitiateRequest, RegisterRequest};
use crate::app_lib::{AppError, RemoteReply};

pub const LOGIN_PATH: &str = "/api/auth/login";
pub const REGISTER_PATH: &str = "/api/auth/register";
pub const OAUTH_INITIATE_PATH: &str = "/api/auth/oauth/google/initiate";

/// Each call resolves to the status and parsed body of the response. Only
/// transport failures (no response at all) are errors.
#[allow(async_fn_in_trait)]
pub trait AuthApi {
    async fn login(&self, request: &LoginRequest<'_>) -> Result<RemoteReply, AppError>;
    async fn register(&self, request: &RegisterRequest<'_>) -> Result<RemoteReply, AppError>;
    async fn initiate_oauth(&self, request: &OAuthInitiateRequest)
    -> Result<RemoteReply, AppError>;
}

#[cfg(target_arch = "wasm32")]
pub use http::HttpAuthApi;

#[cfg(target_arch = "wasm32")]
mod http {
    use super::{AuthApi, LOGIN_PATH, OAUTH_INITIATE_PATH, REGISTER_PATH};
    use crate::app_lib::{AppError, RemoteReply, api::post_json_reply};
    use crate::features::auth::types::{LoginRequest, OAuthInitiateRequest, RegisterRequest};

    /// Fetch-backed client rooted at the configured API base URL.
    #[derive(Clone, Debug)]
    pub struct HttpAuthApi {
        base_url: String,
    }

    impl HttpAuthApi {
        pub fn new(base_url: impl Into<String>) -> Self {
            Self {
                base_url: base_url.into(),
            }
        }
    }

    impl AuthApi for HttpAuthApi {
        async fn login(&self, request: &LoginRequest<'_>) -> Result<RemoteReply, AppError> {
            post_json_reply(&self.base_url, LOGIN_PATH, request).await
        }

        async fn register(&self, request: &RegisterRequest<'_>) -> Result<RemoteReply, AppError> {
            post_json_reply(&self.base_url, REGISTER_PATH, request).await
        }

        async fn initiate_oauth(
            &self,
            request: &OAuthInitiateRequest,
        ) -> Result<RemoteReply, AppError> {
            post_json_reply(&self.base_url, OAUTH_INITIATE_PATH, request).await
        }
    }
}
