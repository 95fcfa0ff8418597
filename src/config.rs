/// Environment variable read by [`api_key_from_env`].
pub const API_KEY_ENV: &str = "NASA_API_KEY";

/// NASA's shared, heavily rate-limited key. Fine for trying things out.
pub const DEMO_API_KEY: &str = "DEMO_KEY";

/// The API key from [`API_KEY_ENV`], if set to something other than whitespace.
pub fn api_key_from_env() -> Option<String> {
    std::env::var(API_KEY_ENV)
        .ok()
        .map(|key| key.trim().to_string())
        .filter(|key| !key.is_empty())
}
