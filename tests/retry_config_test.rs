use std::time::Duration;

use muninn::RetryConfig;

#[test]
fn default_config() {
    let config = RetryConfig::default();
    assert_eq!(config.max_attempts, 3);
    assert_eq!(config.initial_delay, Duration::from_millis(500));
    assert_eq!(config.max_delay, Duration::from_secs(30));
    assert!(config.jitter);
}

#[test]
fn disabled_means_single_attempt() {
    assert_eq!(RetryConfig::disabled().max_attempts, 1);
}

#[test]
fn builder_setters() {
    let config = RetryConfig::new()
        .max_attempts(5)
        .initial_delay(Duration::from_millis(100))
        .max_delay(Duration::from_secs(5))
        .jitter(false);
    assert_eq!(config.max_attempts, 5);
    assert_eq!(config.initial_delay, Duration::from_millis(100));
    assert_eq!(config.max_delay, Duration::from_secs(5));
    assert!(!config.jitter);
}

#[test]
fn backoff_doubles_per_attempt() {
    let config = RetryConfig::new()
        .initial_delay(Duration::from_millis(100))
        .jitter(false);
    assert_eq!(config.delay_for_attempt(0), Duration::from_millis(100));
    assert_eq!(config.delay_for_attempt(1), Duration::from_millis(200));
    assert_eq!(config.delay_for_attempt(2), Duration::from_millis(400));
}

#[test]
fn backoff_capped_at_max_delay() {
    let config = RetryConfig::new()
        .initial_delay(Duration::from_secs(10))
        .max_delay(Duration::from_secs(15))
        .jitter(false);
    assert_eq!(config.delay_for_attempt(5), Duration::from_secs(15));
}

#[test]
fn retry_after_hint_takes_precedence() {
    let config = RetryConfig::new()
        .initial_delay(Duration::from_millis(100))
        .jitter(false);
    let hint = Some(Duration::from_secs(7));
    assert_eq!(config.effective_delay(0, hint), Duration::from_secs(7));
}

#[test]
fn jitter_keeps_delay_in_range() {
    let config = RetryConfig::new()
        .initial_delay(Duration::from_millis(100))
        .jitter(true);
    for _ in 0..50 {
        let delay = config.effective_delay(0, None);
        assert!(delay >= Duration::from_millis(50), "delay {delay:?} below half");
        assert!(delay <= Duration::from_millis(100), "delay {delay:?} above base");
    }
}

#[test]
fn no_jitter_is_deterministic() {
    let config = RetryConfig::new()
        .initial_delay(Duration::from_millis(100))
        .jitter(false);
    assert_eq!(config.effective_delay(1, None), Duration::from_millis(200));
}
