use std::process::Command;

use tracing::debug;

/// The last line of `git tag`, or `v<package version>` when git is missing
/// or the repository has no tags.
pub fn resolve() -> String {
    let output = match Command::new("git").arg("tag").output() {
        Ok(out) if out.status.success() => out,
        Ok(out) => {
            debug!(status = %out.status, "git tag failed, using package version");
            return fallback();
        }
        Err(e) => {
            debug!(error = %e, "git unavailable, using package version");
            return fallback();
        }
    };
    last_tag(&String::from_utf8_lossy(&output.stdout)).unwrap_or_else(fallback)
}

fn last_tag(listing: &str) -> Option<String> {
    listing
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .next_back()
        .map(str::to_string)
}

fn fallback() -> String {
    concat!("v", env!("CARGO_PKG_VERSION")).to_string()
}
