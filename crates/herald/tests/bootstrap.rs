use herald::bus::DuplicatePolicy;
use herald::{Event, EventBinding, Handler, HeraldConfig, event_shapes};
use std::fs;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::tempdir;

#[derive(Debug, Event)]
struct Connected {
    peer: u16,
}

#[derive(Debug, Event)]
struct Disconnected;

#[test]
fn bootstrap_from_config_file() -> Result<(), Box<dyn std::error::Error>> {
    let tmp_dir = tempdir()?;
    let path = tmp_dir.path().join("herald.toml");
    fs::write(&path, "[bus]\nduplicate_registration = \"reject\"\n")?;

    let config = HeraldConfig::load(Some(&path))?;
    assert_eq!(config.bus.duplicate_registration, DuplicatePolicy::Reject);

    let registry = herald::bootstrap(&config, event_shapes![Connected, Disconnected]);
    assert_eq!(registry.len(), 2);

    let peers = Arc::new(AtomicUsize::new(0));
    let binding = EventBinding::new(Handler::payload({
        let peers = peers.clone();
        move |event: &Connected| {
            peers.fetch_add(usize::from(event.peer), Ordering::SeqCst);
            Ok(())
        }
    }));

    let bus = registry.bus::<Connected>()?;
    bus.register(&binding)?;
    assert!(bus.register(&binding).is_err(), "strict config rejects a second registration");

    bus.raise(&Connected { peer: 3 })?;
    bus.raise(&Connected { peer: 4 })?;
    assert_eq!(peers.load(Ordering::SeqCst), 7);

    assert_eq!(registry.clear_all()?, 1);
    assert_eq!(bus.raise(&Connected { peer: 5 })?, 0);
    Ok(())
}
