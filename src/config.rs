use std::str::FromStr;

pub const MAX_POST_LENGTH: usize = 5000;
pub const MAX_HANDLE_LENGTH: usize = 50;
pub const MIN_PASSWORD_LENGTH: usize = 3;
pub const MAX_BIO_LENGTH: usize = 500;
pub const DEFAULT_FEED_LIMIT: usize = 50;

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse::<T>().ok())
}

fn env_flag(key: &str, default: bool) -> bool {
    match std::env::var(key) {
        Ok(v) => matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"),
        Err(_) => default,
    }
}

pub fn token_expiration_hours() -> i64 {
    env_parse("PUBSUB_TOKEN_EXPIRATION_HOURS").unwrap_or(24)
}

/// Policy knobs for the repository.
///
/// Handle case-folding and self-follow admissibility are explicit choices
/// rather than incidental behaviour; both default to the conservative option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryConfig {
    /// Lower-case every handle on the way in, so `Rich` and `rich` are one user.
    pub case_fold_handles: bool,
    /// When false, `follow(a, a)` is a no-op.
    pub allow_self_follow: bool,
    /// Maximum post length in characters.
    pub max_post_length: usize,
    /// Hard cap on the number of stored posts; `None` means unbounded.
    pub max_posts: Option<usize>,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            case_fold_handles: false,
            allow_self_follow: false,
            max_post_length: MAX_POST_LENGTH,
            max_posts: None,
        }
    }
}

impl RepositoryConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            case_fold_handles: env_flag("PUBSUB_CASE_FOLD_HANDLES", defaults.case_fold_handles),
            allow_self_follow: env_flag("PUBSUB_ALLOW_SELF_FOLLOW", defaults.allow_self_follow),
            max_post_length: env_parse("PUBSUB_MAX_POST_LENGTH").unwrap_or(defaults.max_post_length),
            max_posts: env_parse("PUBSUB_MAX_POSTS").or(defaults.max_posts),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub seed_demo_data: bool,
    pub token_expiration_hours: i64,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self {
            bind_addr: std::env::var("PUBSUB_BIND").unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
            seed_demo_data: env_flag("PUBSUB_SEED", true),
            token_expiration_hours: token_expiration_hours(),
        }
    }
}
