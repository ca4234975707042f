//! Build-time configuration for the API base and post-login navigation with an
//! optional runtime override. The runtime config is read from
//! `window.LANDING_AUTH_CONFIG` (if present) so a static export can point the
//! dialog at another backend without rebuilding. Configuration values are
//! public; do not store secrets here.

/// Delay between a successful login and the navigation to the dashboard.
pub const DEFAULT_REDIRECT_DELAY_MS: u32 = 400;

/// Frontend configuration derived from build-time environment variables.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    pub api_base_url: String,
    pub dashboard_path: String,
    pub oauth_callback_path: String,
    pub log_level: String,
    pub redirect_delay_ms: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: String::new(),
            dashboard_path: "/dashboard".to_string(),
            oauth_callback_path: "/api/auth/oauth/google/callback".to_string(),
            log_level: "warn".to_string(),
            redirect_delay_ms: DEFAULT_REDIRECT_DELAY_MS,
        }
    }
}

impl AppConfig {
    /// Loads config from build-time environment variables and applies runtime overrides.
    pub fn load() -> Self {
        let defaults = Self::default();
        let mut config = Self {
            api_base_url: option_env!("LANDING_AUTH_API_BASE_URL")
                .unwrap_or("")
                .to_string(),
            dashboard_path: option_env!("LANDING_AUTH_DASHBOARD_PATH")
                .map_or(defaults.dashboard_path, str::to_string),
            oauth_callback_path: defaults.oauth_callback_path,
            log_level: option_env!("LANDING_AUTH_LOG_LEVEL")
                .map_or(defaults.log_level, str::to_string),
            redirect_delay_ms: defaults.redirect_delay_ms,
        };

        if let Some(runtime) = runtime_config() {
            apply_runtime_overrides(&mut config, runtime);
        }

        config
    }
}

#[derive(Default)]
struct RuntimeConfig {
    api_base_url: Option<String>,
    dashboard_path: Option<String>,
    oauth_callback_path: Option<String>,
    log_level: Option<String>,
    redirect_delay_ms: Option<String>,
}

fn apply_runtime_overrides(config: &mut AppConfig, runtime: RuntimeConfig) {
    if let Some(value) = runtime.api_base_url {
        config.api_base_url = value;
    }
    if let Some(value) = runtime.dashboard_path {
        config.dashboard_path = value;
    }
    if let Some(value) = runtime.oauth_callback_path {
        config.oauth_callback_path = value;
    }
    if let Some(value) = runtime.log_level {
        config.log_level = value;
    }
    if let Some(delay) = runtime
        .redirect_delay_ms
        .and_then(|value| value.parse::<u32>().ok())
    {
        config.redirect_delay_ms = delay;
    }
}

#[cfg(target_arch = "wasm32")]
fn runtime_config() -> Option<RuntimeConfig> {
    use js_sys::{Object, Reflect};
    use wasm_bindgen::JsValue;

    let window = web_sys::window()?;
    let config = Reflect::get(&window, &JsValue::from_str("LANDING_AUTH_CONFIG")).ok()?;
    if config.is_null() || config.is_undefined() {
        return None;
    }
    let object = Object::from(config);

    Some(RuntimeConfig {
        api_base_url: read_runtime_value(&object, "api_base_url"),
        dashboard_path: read_runtime_value(&object, "dashboard_path"),
        oauth_callback_path: read_runtime_value(&object, "oauth_callback_path"),
        log_level: read_runtime_value(&object, "log_level"),
        redirect_delay_ms: read_runtime_value(&object, "redirect_delay_ms"),
    })
}

#[cfg(not(target_arch = "wasm32"))]
fn runtime_config() -> Option<RuntimeConfig> {
    None
}

#[cfg(target_arch = "wasm32")]
fn read_runtime_value(object: &js_sys::Object, key: &str) -> Option<String> {
    let value = js_sys::Reflect::get(object, &wasm_bindgen::JsValue::from_str(key)).ok()?;
    let value = match value.as_f64() {
        Some(number) => number.to_string(),
        None => value.as_string()?,
    };
    normalize_runtime_value(&value)
}

fn normalize_runtime_value(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
