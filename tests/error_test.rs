use std::time::Duration;

use muninn::{MuninnError, Result};

#[test]
fn test_error_display() {
    let err = MuninnError::SubredditNotFound("rust".to_string());
    assert!(err.to_string().contains("rust"));
}

#[test]
fn test_invalid_input_display() {
    let err = MuninnError::InvalidInput("limit must be between 1 and 25, got 100".into());
    assert!(err.to_string().contains("limit"));
}

#[test]
fn test_result_alias() {
    fn returns_error() -> Result<()> {
        Err(MuninnError::NoSummarizer)
    }
    assert!(returns_error().is_err());
}

// ============================================================================
// Transient error classification
// ============================================================================

#[test]
fn transient_errors() {
    assert!(MuninnError::RateLimited { retry_after: None }.is_transient());
    assert!(
        MuninnError::RateLimited {
            retry_after: Some(Duration::from_secs(1))
        }
        .is_transient()
    );
    assert!(MuninnError::Http("connection reset".into()).is_transient());
    assert!(
        MuninnError::Upstream {
            status: 500,
            message: "internal".into()
        }
        .is_transient()
    );
    assert!(
        MuninnError::Upstream {
            status: 503,
            message: "unavailable".into()
        }
        .is_transient()
    );
}

#[test]
fn permanent_errors() {
    assert!(!MuninnError::AuthenticationFailed.is_transient());
    assert!(!MuninnError::SubredditNotFound("rust".into()).is_transient());
    assert!(!MuninnError::InvalidInput("bad limit".into()).is_transient());
    assert!(!MuninnError::NoSummarizer.is_transient());
    assert!(!MuninnError::Summarization("model error".into()).is_transient());
    assert!(
        !MuninnError::Upstream {
            status: 404,
            message: "not found".into()
        }
        .is_transient()
    );
}

#[test]
fn retry_after_hint() {
    let err = MuninnError::RateLimited {
        retry_after: Some(Duration::from_secs(30)),
    };
    assert_eq!(err.retry_after(), Some(Duration::from_secs(30)));

    assert_eq!(MuninnError::RateLimited { retry_after: None }.retry_after(), None);
    assert_eq!(MuninnError::Http("timeout".into()).retry_after(), None);
}

#[test]
fn errors_are_cloneable() {
    // Listing errors fan out to coalesced waiters via shared futures.
    let err = MuninnError::Upstream {
        status: 502,
        message: "bad gateway".into(),
    };
    let cloned = err.clone();
    assert_eq!(err.to_string(), cloned.to_string());
}
