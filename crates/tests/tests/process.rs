//! Process default tests
//!
//! These reconfigure the process-wide logger, so every test holds `LOCK`
//! to keep them from interleaving.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use ctxlog::{
    Context, Level, LogFormat, LoggerConfig, LoggingSystem, Sink, attached, context_with_logger,
    default_logger, default_system, init, init_with, logger, logger_with_value, set_default,
    with_context,
};

static LOCK: Mutex<()> = Mutex::new(());

fn serial() -> MutexGuard<'static, ()> {
    LOCK.lock().unwrap_or_else(PoisonError::into_inner)
}

#[test]
fn test_default_exists_without_init() {
    let _guard = serial();

    // Usable straight away, whatever level earlier tests left behind
    let logger = default_logger();
    logger.info("logging before any explicit init");
    assert!(logger.fields().is_empty());
}

#[test]
fn test_init_sets_threshold() {
    let _guard = serial();

    for level in Level::ALL {
        init(level.as_str());
        assert_eq!(default_system().level(), level);
        assert_eq!(default_logger().level(), level);
    }
}

#[test]
fn test_init_unknown_names_fall_back_to_info() {
    let _guard = serial();

    for name in ["trace", "", "DEBUG"] {
        init("error");
        init(name);
        assert_eq!(default_system().level(), Level::Info, "name {name:?}");
    }
}

#[test]
fn test_init_replaces_default_but_not_existing_handles() {
    let _guard = serial();

    init("debug");
    let before = default_logger();
    let ctx = context_with_logger(&Context::new());
    let attached_before = attached(&ctx).unwrap();

    init("warn");

    // Existing handles keep their configuration
    assert_eq!(before.level(), Level::Debug);
    assert_eq!(attached_before.logger().level(), Level::Debug);

    // New handles see the new one
    assert_eq!(default_logger().level(), Level::Warn);
    assert!(!default_logger().same_output(&before));
    assert_eq!(logger(&Context::new()).logger().level(), Level::Warn);
}

#[test]
fn test_first_writer_wins_across_reconfiguration() {
    let _guard = serial();

    init("debug");
    let ctx = context_with_logger(&Context::new());
    let original = attached(&ctx).unwrap();

    init("error");
    let ctx = context_with_logger(&ctx);

    let current = attached(&ctx).unwrap();
    assert!(Arc::ptr_eq(&original, &current));
    assert_eq!(logger(&ctx).logger().level(), Level::Debug);
}

#[test]
fn test_context_with_logger_is_idempotent() {
    let _guard = serial();

    let once = context_with_logger(&Context::new());
    let twice = context_with_logger(&once);

    assert!(once.ptr_eq(&twice));
    assert!(Arc::ptr_eq(
        &attached(&once).unwrap(),
        &attached(&twice).unwrap()
    ));
}

#[test]
fn test_logger_does_not_attach() {
    let _guard = serial();

    let ctx = Context::new();
    let handle = logger(&ctx);
    handle.info("fresh handle on the default");

    assert!(attached(&ctx).is_none());
    assert!(handle.logger().same_output(&default_logger()));
}

#[test]
fn test_logger_with_value_in_a_loop() {
    let _guard = serial();

    let ctx = context_with_logger(&Context::new());
    let loggers: Vec<_> = (0..10)
        .map(|_| logger_with_value(&ctx, "req_id", "abc"))
        .collect();

    for derived in &loggers {
        assert_eq!(derived.fields().len(), 1);
    }
    assert!(logger(&ctx).logger().fields().is_empty());
}

#[test]
fn test_set_tag_in_a_loop_accumulates() {
    let _guard = serial();

    let ctx = context_with_logger(&Context::new());
    for _ in 0..3 {
        logger(&ctx).set_tag("req_id", "abc");
    }

    let fields = logger(&ctx).logger().fields().len();
    assert_eq!(fields, 3);
}

#[test]
fn test_init_redirects_ambient_tracing() {
    let _guard = serial();

    init("warn");
    assert!(!tracing::enabled!(tracing::Level::INFO));
    assert!(tracing::enabled!(tracing::Level::WARN));
    assert!(!log::log_enabled!(log::Level::Info));
    assert!(log::log_enabled!(log::Level::Warn));

    init("debug");
    assert!(tracing::enabled!(tracing::Level::DEBUG));
    assert!(log::log_enabled!(log::Level::Info));
    assert!(log::log_enabled!(log::Level::Debug));

    init("fatal");
    assert!(!tracing::enabled!(tracing::Level::ERROR));
    assert!(!log::log_enabled!(log::Level::Error));

    init("debug");
}

#[test]
fn test_init_with_config() {
    let _guard = serial();

    init_with(LoggerConfig::with_level(Level::Error).format(LogFormat::Text)).unwrap();
    let system = default_system();
    assert_eq!(system.level(), Level::Error);
    assert_eq!(system.config().format, LogFormat::Text);

    init("debug");
}

#[test]
fn test_set_default_injects_system() {
    let _guard = serial();

    let (sink, buffer) = Sink::buffer();
    let injected = LoggingSystem::with_sink(LoggerConfig::with_level(Level::Info), sink).unwrap();
    let previous = set_default(injected);
    assert!(!previous.logger().same_output(&default_logger()));

    logger(&Context::new()).info("through the injected system");
    logger(&Context::new()).debug("below threshold");

    let records = buffer.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["message"], "through the injected system");

    init("debug");
}

#[test]
fn test_scoped_context_uses_default() {
    let _guard = serial();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap();
    let ctx = context_with_logger(&Context::new());
    let original = attached(&ctx).unwrap();

    let seen = runtime.block_on(with_context(ctx, async { ctxlog::current_logger() }));
    assert!(Arc::ptr_eq(&original, &seen));

    let unscoped = ctxlog::current_logger();
    assert!(unscoped.logger().same_output(&default_logger()));
}
