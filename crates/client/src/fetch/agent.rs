//! Browser-like User-Agent generation.

use rand::Rng;
use rand::seq::IndexedRandom;

const PLATFORMS: &[&str] = &[
    "Windows NT 10.0; Win64; x64",
    "Windows NT 10.0; WOW64",
    "Windows NT 6.1; Win64; x64",
    "X11; Linux x86_64",
    "X11; Ubuntu; Linux x86_64",
    "X11; Fedora; Linux x86_64",
];

/// A Chrome User-Agent on Windows or Linux with a randomized version.
pub fn random_user_agent() -> String {
    let mut rng = rand::rng();
    let platform = PLATFORMS.choose(&mut rng).copied().unwrap_or(PLATFORMS[0]);
    let major: u32 = rng.random_range(112..=131);
    let build: u32 = rng.random_range(5_500..=6_800);
    let patch: u32 = rng.random_range(0..=220);

    format!(
        "Mozilla/5.0 ({platform}) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/{major}.0.{build}.{patch} Safari/537.36"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_agent_shape() {
        for _ in 0..50 {
            let ua = random_user_agent();
            assert!(ua.starts_with("Mozilla/5.0 ("));
            assert!(ua.contains("Chrome/"));
            assert!(ua.ends_with("Safari/537.36"));
            assert!(ua.contains("Windows") || ua.contains("Linux"));
        }
    }

    #[test]
    fn test_user_agent_varies() {
        let agents: std::collections::HashSet<String> = (0..50).map(|_| random_user_agent()).collect();
        assert!(agents.len() > 1);
    }
}
