//! HTTP helpers for the auth endpoints with a consistent timeout and lenient
//! body handling. Unlike typed JSON helpers, these return the status and the
//! parsed body for every response, so the caller decides what counts as a
//! rejection and the error normalizer always sees the payload.
//!
//! A request that has not completed after [`DEFAULT_TIMEOUT_MS`] is aborted and
//! surfaces as [`AppError::Timeout`], which re-enables the submit control.

use crate::app_lib::errors::AppError;

/// Default request timeout (milliseconds) applied to all HTTP helpers.
#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
pub(crate) const DEFAULT_TIMEOUT_MS: u32 = 10_000;

/// Maps a failed send into `AppError`, detecting aborts and timeouts by their
/// message.
#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
pub(crate) fn transport_error(message: &str) -> AppError {
    let lowered = message.to_lowercase();
    if lowered.contains("timeout") || lowered.contains("abort") {
        AppError::Timeout("Request timed out. Please try again.".to_string())
    } else {
        AppError::Network(format!("Unable to reach the server: {message}"))
    }
}

/// Builds a URL from an explicit base URL and the provided path.
#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
pub(crate) fn build_url_with_base(base_url: &str, path: &str) -> String {
    let base = base_url.trim().trim_end_matches('/');
    let path = path.trim();

    if base.is_empty() {
        path.to_string()
    } else {
        format!("{}/{}", base, path.trim_start_matches('/'))
    }
}

#[cfg(target_arch = "wasm32")]
pub(crate) use wasm::post_json_reply;

#[cfg(target_arch = "wasm32")]
mod wasm {
    use super::{DEFAULT_TIMEOUT_MS, build_url_with_base, transport_error};
    use crate::app_lib::{errors::AppError, reply::RemoteReply};
    use gloo_net::http::{Request, Response};
    use gloo_timers::callback::Timeout;
    use serde::Serialize;
    use serde_json::to_string;
    use web_sys::{AbortController, RequestCredentials};

    /// Posts JSON with cookies and returns the status with the parsed body.
    /// HTTP error statuses are not errors here; only transport failures are.
    pub(crate) async fn post_json_reply<B: Serialize>(
        base_url: &str,
        path: &str,
        body: &B,
    ) -> Result<RemoteReply, AppError> {
        let url = build_url_with_base(base_url, path);
        let payload = to_string(body)
            .map_err(|err| AppError::Serialization(format!("Failed to encode request: {err}")))?;
        let response = send_with_timeout(move |signal| {
            Request::post(&url)
                .header("Content-Type", "application/json")
                .credentials(RequestCredentials::Include)
                .abort_signal(Some(signal))
                .body(payload)
                .map_err(|err| AppError::Serialization(format!("Failed to build request: {err}")))
        })
        .await?;

        read_reply(response).await
    }

    fn map_request_error(err: gloo_net::Error) -> AppError {
        transport_error(&err.to_string())
    }

    /// Sends a request with an abort timeout to avoid hanging UI state.
    async fn send_with_timeout(
        build_request: impl FnOnce(&web_sys::AbortSignal) -> Result<Request, AppError>,
    ) -> Result<Response, AppError> {
        let controller = AbortController::new()
            .map_err(|_| AppError::Config("Failed to initialize request timeout.".to_string()))?;
        let signal = controller.signal();
        let timeout_controller = controller.clone();
        let _timeout = Timeout::new(DEFAULT_TIMEOUT_MS, move || timeout_controller.abort());

        let request = build_request(&signal)?;
        request.send().await.map_err(map_request_error)
    }

    /// Reads the body as text; unreadable bodies are treated as empty.
    async fn read_reply(response: Response) -> Result<RemoteReply, AppError> {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        Ok(RemoteReply::from_text(status, &text))
    }
}

#[cfg(test)]
mod tests {
    use super::{DEFAULT_TIMEOUT_MS, build_url_with_base, transport_error};
    use crate::app_lib::errors::AppError;

    #[test]
    fn aborted_requests_map_to_timeout() {
        for message in [
            "JsError: The operation was aborted. AbortError",
            "request timeout",
        ] {
            assert_eq!(
                transport_error(message),
                AppError::Timeout("Request timed out. Please try again.".to_string())
            );
        }
        assert_eq!(DEFAULT_TIMEOUT_MS, 10_000);
    }

    #[test]
    fn other_send_failures_map_to_network() {
        assert_eq!(
            transport_error("TypeError: Failed to fetch"),
            AppError::Network("Unable to reach the server: TypeError: Failed to fetch".to_string())
        );
    }

    #[test]
    fn build_url_with_base_joins_without_duplicate_slashes() {
        assert_eq!(
            build_url_with_base("https://api.example.de/", "/api/auth/login"),
            "https://api.example.de/api/auth/login"
        );
        assert_eq!(
            build_url_with_base("https://api.example.de", "api/auth/login"),
            "https://api.example.de/api/auth/login"
        );
    }

    #[test]
    fn build_url_with_empty_base_keeps_relative_path() {
        assert_eq!(build_url_with_base("  ", "/api/auth/login"), "/api/auth/login");
    }
}
