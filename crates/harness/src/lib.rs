pub mod app;
pub mod notify;
pub mod remote;

pub use app::TestApp;
pub use notify::{NotificationLog, RecordingNotifier};
pub use remote::{FailureSwitches, FlakyRemote};
