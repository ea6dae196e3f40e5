use herald::LoggingConfig;
use herald::config::LogRotation;
use std::fs;
use std::time::Duration;
use tempfile::tempdir;

#[test]
fn file_logging_writes_json_lines() -> Result<(), Box<dyn std::error::Error>> {
    let tmp_dir = tempdir()?;
    let log_dir = tmp_dir.path().join("logs");

    let config = LoggingConfig {
        name: "integration-file-logging".to_owned(),
        console: false,
        json: true,
        directory: Some(log_dir.clone()),
        rotation: LogRotation::Never,
        ..LoggingConfig::default()
    };
    let guard = herald::logging::init(&config)?;
    assert!(guard.has_file_output());

    tracing::info!(answer = 42, "hello from integration test");

    std::thread::sleep(Duration::from_millis(30));
    drop(guard);

    let log_file = fs::read_dir(&log_dir)?
        .flatten()
        .map(|entry| entry.path())
        .find(|path| path.extension().and_then(|ext| ext.to_str()) == Some("log"))
        .expect("log file should be created");

    let contents = fs::read_to_string(&log_file)?;
    let line = contents.lines().next().expect("log file should not be empty");
    assert!(line.starts_with('{'), "file output should be JSON: {line}");
    assert!(line.contains("hello from integration test"));

    Ok(())
}
