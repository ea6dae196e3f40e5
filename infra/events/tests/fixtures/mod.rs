#![allow(dead_code)]

use herald_event_bus::{Event, EventBinding, Handler};
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, Event)]
pub struct Ping {
    pub value: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Event)]
pub struct Pong {
    pub value: i32,
}

#[derive(Debug, Clone, Event)]
pub struct Tick;

/// Shared, ordered record of what fired.
#[derive(Debug, Clone, Default)]
pub struct Journal {
    entries: Arc<Mutex<Vec<String>>>,
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, entry: impl Into<String>) {
        self.entries.lock().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().clone()
    }

    pub fn count(&self, entry: &str) -> usize {
        self.entries.lock().iter().filter(|e| *e == entry).count()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

/// A binding whose single payload handler records `tag:value`.
pub fn ping_recorder(journal: &Journal, tag: &'static str) -> EventBinding<Ping> {
    let sink = journal.clone();
    EventBinding::new(Handler::payload(move |ping: &Ping| {
        sink.push(format!("{tag}:{}", ping.value));
        Ok(())
    }))
}

/// A signal handler that records `tag`.
pub fn signal_recorder<T: Event>(journal: &Journal, tag: &'static str) -> Handler<T> {
    let sink = journal.clone();
    Handler::signal(move || {
        sink.push(tag);
        Ok(())
    })
}
