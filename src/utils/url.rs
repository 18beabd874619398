// src/utils/url.rs

//! URL manipulation utilities.

/// Join a detail-page path onto the venue origin.
///
/// Already-absolute links pass through untouched; rooted paths are
/// concatenated onto the origin verbatim.
///
/// # Examples
/// ```
/// use marquee::utils::url::join_origin;
///
/// assert_eq!(
///     join_origin("https://hollywoodtheatre.org", "/films/alien"),
///     "https://hollywoodtheatre.org/films/alien"
/// );
/// ```
pub fn join_origin(origin: &str, path: &str) -> String {
    // Already absolute
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }

    let origin = origin.trim_end_matches('/');
    if path.starts_with('/') {
        format!("{origin}{path}")
    } else {
        format!("{origin}/{path}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_rooted_path() {
        assert_eq!(
            join_origin("https://hollywoodtheatre.org", "/films/alien"),
            "https://hollywoodtheatre.org/films/alien"
        );
    }

    #[test]
    fn test_join_trims_trailing_slash() {
        assert_eq!(
            join_origin("https://hollywoodtheatre.org/", "/films/alien"),
            "https://hollywoodtheatre.org/films/alien"
        );
    }

    #[test]
    fn test_join_bare_path() {
        assert_eq!(
            join_origin("https://hollywoodtheatre.org", "films/alien"),
            "https://hollywoodtheatre.org/films/alien"
        );
    }

    #[test]
    fn test_absolute_url_passes_through() {
        assert_eq!(
            join_origin("https://hollywoodtheatre.org", "https://other.com/x"),
            "https://other.com/x"
        );
    }
}
