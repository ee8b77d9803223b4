use collection_sync_models::{item_ref, IdForm, LibraryKind, UnknownKind};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdentifierError {
    #[error("unknown library kind {0:?}: expected \"movie\" or \"show\"")]
    UnknownKind(String),
}

impl From<UnknownKind> for IdentifierError {
    fn from(err: UnknownKind) -> Self {
        IdentifierError::UnknownKind(err.0)
    }
}

/// Find the external identifier embedded in an item reference.
///
/// `kind` selects the source preference (movie: tmdb, imdb, plex; show: tvdb,
/// tmdb, plex) and is validated before the reference is looked at.
/// `Ok(None)` means the reference carries no usable identifier.
pub fn extract_identifier(reference: &str, kind: &str, form: IdForm) -> Result<Option<String>, IdentifierError> {
    let kind: LibraryKind = kind.parse()?;
    Ok(item_ref::extract_identifier(reference, kind, form))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_movie_forms() {
        assert_eq!(
            extract_identifier("The Matrix {tmdb-603}", "movie", IdForm::Bare),
            Ok(Some("603".to_string()))
        );
        assert_eq!(
            extract_identifier("The Matrix {tmdb-603}", "movie", IdForm::Full),
            Ok(Some("tmdb://603".to_string()))
        );
        assert_eq!(
            extract_identifier("The Matrix {imdb-tt0133093}", "movie", IdForm::Full),
            Ok(Some("imdb://tt0133093".to_string()))
        );
    }

    #[test]
    fn test_preference_order() {
        let both = "Planet Earth {tmdb-1044} {tvdb-79257}";
        assert_eq!(
            extract_identifier(both, "movie", IdForm::Bare),
            Ok(Some("1044".to_string()))
        );
        assert_eq!(
            extract_identifier(both, "show", IdForm::Bare),
            Ok(Some("79257".to_string()))
        );
        // imdb is not a show source
        assert_eq!(extract_identifier("Lost {imdb-tt0411008}", "show", IdForm::Bare), Ok(None));
    }

    #[test]
    fn test_plex_marker_runs_to_whitespace() {
        assert_eq!(
            extract_identifier("Alien plex://movie/5d7768258718ba001e31bba9 extra", "movie", IdForm::Full),
            Ok(Some("plex://movie/5d7768258718ba001e31bba9".to_string()))
        );
        assert_eq!(
            extract_identifier("Alien plex://movie/5d7768258718ba001e31bba9", "movie", IdForm::Bare),
            Ok(Some("movie/5d7768258718ba001e31bba9".to_string()))
        );
    }

    #[test]
    fn test_no_marker() {
        assert_eq!(extract_identifier("The Matrix", "movie", IdForm::Bare), Ok(None));
        assert_eq!(extract_identifier("", "show", IdForm::Full), Ok(None));
    }

    #[test]
    fn test_unknown_kind() {
        assert_eq!(
            extract_identifier("The Matrix {tmdb-603}", "artist", IdForm::Bare),
            Err(IdentifierError::UnknownKind("artist".to_string()))
        );
        assert!(extract_identifier("", "", IdForm::Full).is_err());
    }
}
