/// Tests for main.rs initialization logic
/// These tests verify configuration and initialization behavior

#[test]
fn test_log_env_priority() {
    use pacer_app::settings::log_filter_with;

    // PACER_LOG_LEVEL takes priority over RUST_LOG
    let both = |k: &str| match k {
        "PACER_LOG_LEVEL" => Some("debug".to_string()),
        "RUST_LOG" => Some("warn".to_string()),
        _ => None,
    };
    assert_eq!(log_filter_with(both), "debug");

    let rust_log_only = |k: &str| (k == "RUST_LOG").then(|| "warn".to_string());
    assert_eq!(log_filter_with(rust_log_only), "warn");

    assert_eq!(log_filter_with(|_| None), "info");
}

#[test]
fn test_env_filter_creation() {
    for level in ["trace", "debug", "info", "warn", "error", "info,pacer_core=debug"] {
        assert!(tracing_subscriber::EnvFilter::try_new(level).is_ok(), "{level}");
    }
}

#[test]
fn test_env_filter_fallback() {
    // Invalid filters fall back to plain `info`
    let env_filter = tracing_subscriber::EnvFilter::try_new("invalid[[[filter")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    assert!(!format!("{:?}", env_filter).is_empty());
}

#[test]
fn test_settings_ignore_unrelated_keys() {
    let settings = pacer_app::settings::Settings::from_env_with(|k| match k {
        "PACER_SESSION_SECS" => Some("3".into()),
        "HOME" => Some("/root".into()),
        _ => None,
    })
    .expect("settings");
    assert_eq!(settings.session, std::time::Duration::from_secs(3));
}

#[tokio::test(start_paused = true)]
async fn test_run_session_honours_shutdown() {
    let settings = pacer_app::settings::Settings::from_env_with(|k| match k {
        "PACER_SESSION_SECS" => Some("3600".into()),
        _ => None,
    })
    .expect("settings");
    let snapshot = pacer_app::run_session(&settings, async {
        tokio::time::sleep(std::time::Duration::from_secs(2)).await;
    })
    .await
    .expect("session");
    assert_eq!(snapshot.move_goal, 1000);
    assert_eq!(snapshot.calories, snapshot.step_count as f64 * 0.04);
}
