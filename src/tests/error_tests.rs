//! Tests for the error handling framework.

use crate::error::aof::AofError;
use crate::error::config::ConfigError;
use crate::error::store::StoreError;
use crate::error::{ErrorContext, MakaiError};

#[test]
fn test_store_error_display() {
    let err = StoreError::NamespaceNotFound("words".to_string());
    assert_eq!(err.to_string(), "namespace `words` not found");
}

#[test]
fn test_aof_error_display() {
    let err = AofError::Format {
        offset: 42,
        message: "expected frame sentinel '*', found 'X'".to_string(),
    };
    assert_eq!(
        err.to_string(),
        "malformed AOF frame near byte 42: expected frame sentinel '*', found 'X'"
    );
}

#[test]
fn test_errors_convert_into_makai_error() {
    let err = MakaiError::from(StoreError::NamespaceNotFound("n".to_string()));
    assert_eq!(err.to_string(), "Store error: namespace `n` not found");

    let err = MakaiError::from(ConfigError::ValidationError("bad level".to_string()));
    assert_eq!(
        err.to_string(),
        "Configuration error: Configuration validation error: bad level"
    );

    let err = MakaiError::from(AofError::Io(std::io::Error::new(
        std::io::ErrorKind::Other,
        "disk gone",
    )));
    assert!(err.to_string().starts_with("AOF error: AOF I/O error:"));
}

#[test]
fn test_error_context_display() {
    let context = ErrorContext::new(
        MakaiError::Custom("boom".to_string()),
        "makai_trie::store",
    )
    .with_details("while inserting");

    let rendered = context.to_string();
    assert!(rendered.contains("Error in makai_trie::store: boom"));
    assert!(rendered.contains("Details: while inserting"));
}
