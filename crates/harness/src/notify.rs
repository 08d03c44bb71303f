use std::cell::RefCell;
use std::rc::Rc;

use taskdeck_engine::{Notifier, Severity};

/// Shared capture of everything the engine pushed through the bridge.
#[derive(Clone, Default)]
pub struct NotificationLog {
    entries: Rc<RefCell<Vec<(String, Severity)>>>,
}

impl NotificationLog {
    pub fn messages(&self) -> Vec<String> {
        self.entries.borrow().iter().map(|(m, _)| m.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    pub fn last(&self) -> Option<(String, Severity)> {
        self.entries.borrow().last().cloned()
    }

    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }
}

pub struct RecordingNotifier {
    log: NotificationLog,
}

impl RecordingNotifier {
    pub fn new(log: NotificationLog) -> Self {
        Self { log }
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, message: &str, severity: Severity) {
        self.log
            .entries
            .borrow_mut()
            .push((message.to_string(), severity));
    }
}
