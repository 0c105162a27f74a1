use std::sync::{Arc, Mutex, PoisonError};

use crate::domain::daemon::outbound::DisplayPort;

/// A [`DisplayPort`] that remembers the title it shows and forwards every
/// change to an external display.
pub struct TitleBoard {
    current: Mutex<Option<String>>,
    display: Arc<dyn DisplayPort>,
}

impl TitleBoard {
    /// Creates a new [`TitleBoard`] with no title.
    pub fn new(display: Arc<dyn DisplayPort>) -> Self {
        Self {
            current: Mutex::new(None),
            display,
        }
    }

    /// Returns the title shown at the moment.
    pub fn current(&self) -> Option<String> {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl DisplayPort for TitleBoard {
    fn set_title(&self, text: &str) {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = Some(text.to_owned());
        self.display.set_title(text);
    }

    fn clear_title(&self) {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = None;
        self.display.clear_title();
    }
}
