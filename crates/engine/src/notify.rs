/// Severity attached to a user-facing notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// Bridge to whatever surfaces failure text to the user. The engine only
/// decides that and what kind of failure occurred, never how it is shown;
/// nothing the bridge does feeds back into engine behavior.
pub trait Notifier {
    fn notify(&self, message: &str, severity: Severity);
}

/// Drops every notification. For callers that surface errors some other
/// way, or not at all.
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn notify(&self, _message: &str, _severity: Severity) {}
}
