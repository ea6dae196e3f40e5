use herald::LoggingConfig;

#[test]
fn init_console_only_has_no_file_output() {
    let guard = herald::logging::init(&LoggingConfig::default()).expect("logging should initialize");

    assert!(!guard.has_file_output(), "console-only logging should not start a file writer");
}
