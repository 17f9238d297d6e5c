//! URL helpers for joining backend routes onto a base address.

/// Strip trailing slashes so routes can be appended without doubling them.
///
/// ```
/// use jokebox::utils::url::normalize_base_url;
///
/// assert_eq!(normalize_base_url("http://localhost:8000/"), "http://localhost:8000");
/// assert_eq!(normalize_base_url("http://localhost:8000"), "http://localhost:8000");
/// ```
pub fn normalize_base_url(base_url: &str) -> String {
    base_url.trim_end_matches('/').to_string()
}

/// Join a route onto a base address.
///
/// An empty route yields the service root with a single trailing slash.
///
/// ```
/// use jokebox::utils::url::construct_api_url;
///
/// assert_eq!(
///     construct_api_url("http://localhost:8000/", "/generate-joke"),
///     "http://localhost:8000/generate-joke"
/// );
/// assert_eq!(construct_api_url("http://localhost:8000", ""), "http://localhost:8000/");
/// ```
pub fn construct_api_url(base_url: &str, route: &str) -> String {
    let normalized_base = normalize_base_url(base_url);
    let route = route.trim_start_matches('/');
    format!("{}/{}", normalized_base, route)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_every_trailing_slash() {
        assert_eq!(
            normalize_base_url("https://jokes.example.com///"),
            "https://jokes.example.com"
        );
        assert_eq!(normalize_base_url("///"), "");
        assert_eq!(normalize_base_url(""), "");
    }

    #[test]
    fn construct_joins_backend_routes() {
        assert_eq!(
            construct_api_url("http://localhost:8000", "load-model"),
            "http://localhost:8000/load-model"
        );
        assert_eq!(
            construct_api_url("https://demo-8000.app.github.dev/", "///generate-joke"),
            "https://demo-8000.app.github.dev/generate-joke"
        );
        assert_eq!(
            construct_api_url("http://localhost:8000/api/", "/"),
            "http://localhost:8000/api/"
        );
    }
}
