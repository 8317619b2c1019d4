//! Build metadata embedded by `build.rs`.

/// Crate version.
pub const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");

const GIT_BRANCH: Option<&str> = option_env!("VERGEN_GIT_BRANCH");
const GIT_SHA: Option<&str> = option_env!("VERGEN_GIT_SHA");
const GIT_DIRTY: Option<&str> = option_env!("VERGEN_GIT_DIRTY");
const BUILD_TIMESTAMP: Option<&str> = option_env!("VERGEN_BUILD_TIMESTAMP");

/// Version with git provenance, e.g. `0.1.0 (main@abc1234, dirty)`.
///
/// Builds outside a git checkout report just the crate version.
pub fn version_string() -> String {
    let (Some(branch), Some(sha)) = (GIT_BRANCH, GIT_SHA) else {
        return PKG_VERSION.to_string();
    };
    let short_sha = sha.get(..7).unwrap_or(sha);
    let dirty = if GIT_DIRTY == Some("true") { ", dirty" } else { "" };
    match BUILD_TIMESTAMP {
        Some(ts) => format!("{PKG_VERSION} ({branch}@{short_sha}{dirty}, built {ts})"),
        None => format!("{PKG_VERSION} ({branch}@{short_sha}{dirty})"),
    }
}

/// `User-Agent` sent when none is configured.
///
/// The public Nominatim instance rejects requests without an identifying
/// user agent.
pub fn default_user_agent() -> String {
    format!("nominatim-cli/{PKG_VERSION}")
}
