//! URL resolution against the deployment's fixed base origin.

/// Rewrite a relative path (`/products/x`) to an absolute URL against
/// `base_origin`; values that are already absolute pass through
/// unchanged. An empty input stays empty.
pub fn resolve_url(base_origin: &str, raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }
    if raw.starts_with('/') {
        return format!("{}{}", base_origin.trim_end_matches('/'), raw);
    }
    raw.to_string()
}

/// Whether a field name or value is plausibly a URL and should be
/// resolved before being shown to a model or user.
pub fn looks_like_url(name: &str, value: &str) -> bool {
    name.to_ascii_lowercase().contains("url")
        || value.starts_with("http://")
        || value.starts_with("https://")
        || (value.starts_with('/') && !value.contains(char::is_whitespace))
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://shop.example.com";

    #[test]
    fn relative_paths_are_rewritten() {
        assert_eq!(
            resolve_url(BASE, "/products/abc"),
            "https://shop.example.com/products/abc"
        );
    }

    #[test]
    fn absolute_urls_pass_through() {
        assert_eq!(resolve_url(BASE, "https://other.example/x"), "https://other.example/x");
    }

    #[test]
    fn trailing_slash_on_base_does_not_double() {
        assert_eq!(
            resolve_url("https://shop.example.com/", "/p"),
            "https://shop.example.com/p"
        );
    }

    #[test]
    fn empty_stays_empty() {
        assert_eq!(resolve_url(BASE, ""), "");
    }

    #[test]
    fn url_detection() {
        assert!(looks_like_url("Product URL", "whatever"));
        assert!(looks_like_url("link", "https://x.example"));
        assert!(looks_like_url("path", "/catalog/1"));
        assert!(!looks_like_url("Description", "a plain / sentence"));
    }
}
