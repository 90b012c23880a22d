use std::fmt;
use std::sync::Arc;

/// A progress notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEvent {
    /// Units of work done so far
    pub progress: usize,

    /// Total units of work, 0 when unknown
    pub maximum: usize,

    pub message: String,

    /// Whether the event reports a recoverable problem
    pub warning: bool,
}

impl StatusEvent {
    pub fn new(progress: usize, maximum: usize, message: impl Into<String>) -> Self {
        Self {
            progress,
            maximum,
            message: message.into(),
            warning: false,
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            warning: true,
            ..Self::new(0, 0, message)
        }
    }
}

impl fmt::Display for StatusEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.maximum > 0 {
            write!(f, "[{}/{}] {}", self.progress, self.maximum, self.message)
        } else {
            f.write_str(&self.message)
        }
    }
}

/// Receiver of [`StatusEvent`]s.
///
/// Delivery is fire-and-forget: listeners cannot fail or answer.
pub trait StatusListener: Send + Sync {
    fn status_updated(&self, event: &StatusEvent);
}

impl<F> StatusListener for F
where
    F: Fn(&StatusEvent) + Send + Sync,
{
    fn status_updated(&self, event: &StatusEvent) {
        self(event)
    }
}

/// The set of listeners registered with one reader.
#[derive(Default, Clone)]
pub struct StatusReporter {
    listeners: Vec<Arc<dyn StatusListener>>,
}

impl StatusReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, listener: Arc<dyn StatusListener>) {
        self.listeners.push(listener);
    }

    /// Remove a listener previously added, compared by identity.
    pub fn remove(&mut self, listener: &Arc<dyn StatusListener>) {
        let target = Arc::as_ptr(listener) as *const ();
        self.listeners
            .retain(|l| Arc::as_ptr(l) as *const () != target);
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    pub fn listeners(&self) -> &[Arc<dyn StatusListener>] {
        &self.listeners
    }

    /// Send `event` to every listener.
    pub fn emit(&self, event: &StatusEvent) {
        for listener in &self.listeners {
            listener.status_updated(event);
        }
    }

    /// Send a progress event.
    pub fn report(&self, progress: usize, maximum: usize, message: impl Into<String>) {
        if self.listeners.is_empty() {
            return;
        }
        self.emit(&StatusEvent::new(progress, maximum, message));
    }
}

impl fmt::Debug for StatusReporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatusReporter")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
