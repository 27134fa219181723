//! URL building for vault service endpoints

use obsidian_bridge_core::InvocationError;
use url::Url;

use crate::error::{GatewayError, GatewayResult};

/// Builds request URLs against a fixed base, percent-encoding vault paths
#[derive(Debug, Clone)]
pub struct UrlBuilder {
    base: Url,
}

impl UrlBuilder {
    pub fn new(base_url: &str) -> GatewayResult<Self> {
        let base = Url::parse(base_url).map_err(|e| {
            GatewayError::InvalidConfig(format!("Invalid base URL '{}': {}", base_url, e))
        })?;
        if base.cannot_be_a_base() {
            return Err(GatewayError::InvalidConfig(format!(
                "Base URL '{}' cannot carry a path",
                base_url
            )));
        }
        Ok(Self { base })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Percent-encode each segment of a vault path, keeping the separators.
    ///
    /// Leading, trailing and repeated slashes are dropped:
    /// `"/notes/My Note.md"` -> `"notes/My%20Note.md"`. `.` and `..` segments are
    /// rejected; URL resolution would otherwise move the request out of `/vault/`.
    pub fn encode_path(path: &str) -> Result<String, InvocationError> {
        let mut segments = Vec::new();
        for segment in path.split('/').filter(|segment| !segment.is_empty()) {
            if segment == "." || segment == ".." {
                return Err(InvocationError::validation(format!(
                    "Path '{}' must not contain '.' or '..' segments",
                    path
                )));
            }
            segments.push(urlencoding::encode(segment).into_owned());
        }
        Ok(segments.join("/"))
    }

    pub fn vault_root() -> String {
        "/vault/".to_string()
    }

    /// `/vault/{filepath}`; an empty path is rejected so it never aliases the listing
    pub fn vault_file(filepath: &str) -> Result<String, InvocationError> {
        let encoded = Self::encode_path(filepath)?;
        if encoded.is_empty() {
            return Err(InvocationError::validation("filepath must not be empty"));
        }
        Ok(format!("/vault/{}", encoded))
    }

    /// `/vault/{dirpath}/` - the trailing slash asks for directory semantics
    pub fn vault_dir(dirpath: &str) -> Result<String, InvocationError> {
        let encoded = Self::encode_path(dirpath)?;
        if encoded.is_empty() {
            Ok(Self::vault_root())
        } else {
            Ok(format!("/vault/{}/", encoded))
        }
    }

    pub fn periodic(period: &str) -> String {
        format!("/periodic/{}/", urlencoding::encode(period))
    }

    pub fn periodic_recent(period: &str) -> String {
        format!("/periodic/{}/recent", urlencoding::encode(period))
    }

    pub fn simple_search() -> String {
        "/search/simple/".to_string()
    }

    pub fn search() -> String {
        "/search/".to_string()
    }

    /// Join an already-encoded absolute path onto the base
    pub fn url(&self, path: &str) -> Result<Url, InvocationError> {
        self.base.join(path).map_err(|e| {
            InvocationError::validation(format!("Failed to build URL for '{}': {}", path, e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use obsidian_bridge_core::ErrorCategory;

    #[test]
    fn test_encode_path() {
        assert_eq!(UrlBuilder::encode_path("notes").unwrap(), "notes");
        assert_eq!(
            UrlBuilder::encode_path("/notes/My Note.md").unwrap(),
            "notes/My%20Note.md"
        );
        assert_eq!(UrlBuilder::encode_path("a//b/").unwrap(), "a/b");
        assert_eq!(UrlBuilder::encode_path("what?#.md").unwrap(), "what%3F%23.md");
        assert_eq!(
            UrlBuilder::encode_path("日記.md").unwrap(),
            "%E6%97%A5%E8%A8%98.md"
        );
        assert_eq!(UrlBuilder::encode_path(".obsidian/app.json").unwrap(), ".obsidian/app.json");
        assert_eq!(UrlBuilder::encode_path("a/.../b").unwrap(), "a/.../b");
    }

    #[test]
    fn test_dot_segments_are_rejected() {
        for path in [".", "..", "notes/../secret.md", "./a.md", "a/.", "/../"] {
            let err = UrlBuilder::encode_path(path).unwrap_err();
            assert_eq!(err.category(), ErrorCategory::Validation, "{}", path);
        }
        assert!(UrlBuilder::vault_file(".").is_err());
        assert!(UrlBuilder::vault_file("..").is_err());
        assert!(UrlBuilder::vault_dir("..").is_err());
        assert!(UrlBuilder::vault_dir("notes/./").is_err());
    }

    #[test]
    fn test_vault_paths() {
        assert_eq!(UrlBuilder::vault_dir("notes").unwrap(), "/vault/notes/");
        assert_eq!(UrlBuilder::vault_dir("notes/").unwrap(), "/vault/notes/");
        assert_eq!(UrlBuilder::vault_dir("").unwrap(), "/vault/");
        assert_eq!(UrlBuilder::vault_file("a.md").unwrap(), "/vault/a.md");
        assert_eq!(
            UrlBuilder::vault_file("Daily Notes/2024-01-01.md").unwrap(),
            "/vault/Daily%20Notes/2024-01-01.md"
        );
        assert!(UrlBuilder::vault_file("/").is_err());
    }

    #[test]
    fn test_periodic_paths() {
        assert_eq!(UrlBuilder::periodic("daily"), "/periodic/daily/");
        assert_eq!(UrlBuilder::periodic_recent("weekly"), "/periodic/weekly/recent");
    }

    #[test]
    fn test_join_onto_base() {
        let builder = UrlBuilder::new("https://127.0.0.1:27124").unwrap();
        assert_eq!(
            builder.url("/vault/notes/").unwrap().as_str(),
            "https://127.0.0.1:27124/vault/notes/"
        );
        assert_eq!(
            builder.url("/vault/Daily%20Notes/a.md").unwrap().as_str(),
            "https://127.0.0.1:27124/vault/Daily%20Notes/a.md"
        );
    }

    #[test]
    fn test_invalid_base() {
        assert!(UrlBuilder::new("not-a-url").is_err());
        assert!(UrlBuilder::new("").is_err());
        assert!(UrlBuilder::new("mailto:someone@example.com").is_err());
    }
}
