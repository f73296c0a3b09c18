use parking_lot::Mutex;
use std::sync::Arc;

/// Records the order in which [Named] values are dropped
///
/// Clones of a log share the same entries.
#[derive(Clone, Debug, Default)]
pub struct DropLog(Arc<Mutex<Vec<String>>>);

impl DropLog {
    /// Makes a new empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes a value that records `name` in this log when it's dropped
    pub fn named(&self, name: impl Into<String>) -> Named {
        Named {
            name: name.into(),
            log: self.clone(),
        }
    }

    /// Appends an entry to the log
    pub fn record(&self, name: impl Into<String>) {
        self.0.lock().push(name.into());
    }

    /// Returns a copy of the log's entries, oldest first
    pub fn entries(&self) -> Vec<String> {
        self.0.lock().clone()
    }

    /// Returns true if nothing has been recorded
    pub fn is_empty(&self) -> bool {
        self.0.lock().is_empty()
    }
}

/// A value that records its name in a [DropLog] when it's dropped
#[derive(Debug)]
pub struct Named {
    name: String,
    log: DropLog,
}

impl Named {
    /// The name that will be recorded
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for Named {
    fn drop(&mut self) {
        self.log.record(std::mem::take(&mut self.name));
    }
}
