//! URL-token helpers.

/// Check if a link is external (has a URL scheme like http:, data:, etc.)
///
/// A valid scheme must:
/// - Have at least 1 character before the colon
/// - Only contain ASCII alphanumeric or `+`, `-`, `.`
///
/// Protocol-relative links (`//cdn.example.com/x.png`) count as external.
#[inline]
pub fn is_external_link(link: &str) -> bool {
    link.starts_with("//")
        || link.find(':').is_some_and(|pos| {
            pos > 0
                && link[..pos]
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        })
}

/// Lowercased extension of the last path segment, ignoring query and fragment.
///
/// ```ignore
/// assert_eq!(extension_of("/javascripts/app.js?123"), Some("js".into()));
/// assert_eq!(extension_of("/images/"), None);
/// ```
pub fn extension_of(source: &str) -> Option<String> {
    let path = source.split(['?', '#']).next().unwrap_or(source);
    let name = path.rsplit('/').next()?;
    let (stem, ext) = name.rsplit_once('.')?;
    (!stem.is_empty() && !ext.is_empty()).then(|| ext.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_external_link() {
        assert!(is_external_link("https://example.com/a.png"));
        assert!(is_external_link("data:image/png;base64,AAAA"));
        assert!(is_external_link("//cdn.example.com/a.png"));
        assert!(!is_external_link("/images/a.png"));
        assert!(!is_external_link("../images/a.png"));
        assert!(!is_external_link(":nope"));
    }

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("/javascripts/app.js").as_deref(), Some("js"));
        assert_eq!(extension_of("/stylesheets/Site.CSS?v=1").as_deref(), Some("css"));
        assert_eq!(extension_of("/images/logo.png#frag").as_deref(), Some("png"));
        assert_eq!(extension_of("/images/"), None);
        assert_eq!(extension_of("/.htaccess"), None);
        assert_eq!(extension_of("README"), None);
    }
}
