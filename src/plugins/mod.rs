//! Entity plugins and the commands that move data in and out of the catalog.

pub mod characters;
pub mod episodes;
pub mod export;
pub mod fixtures;
pub mod import;
pub mod locations;
pub mod scrape;

/// Parse the upstream numeric id out of a reference URL.
///
/// The API encodes references as plain URLs (`.../api/location/3`); the id is
/// always the trailing path segment. Returns `None` for URLs without a
/// numeric trailing segment, including the empty string the API uses for
/// "unknown" references.
pub fn api_id_from_url(url: &str) -> Option<i64> {
    url.trim_end_matches('/')
        .rsplit('/')
        .next()
        .and_then(|segment| segment.parse::<i64>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_id_from_url_parses_trailing_segment() {
        assert_eq!(
            api_id_from_url("https://rickandmortyapi.com/api/location/3"),
            Some(3)
        );
        assert_eq!(
            api_id_from_url("https://rickandmortyapi.com/api/episode/28/"),
            Some(28)
        );
    }

    #[test]
    fn api_id_from_url_rejects_non_numeric() {
        assert_eq!(api_id_from_url(""), None);
        assert_eq!(api_id_from_url("https://rickandmortyapi.com/api/location"), None);
        assert_eq!(api_id_from_url("not a url"), None);
    }
}
