pub mod error;
pub mod local;
pub mod remote;
pub mod schema;
pub mod sqlite;

pub use error::{RemoteError, StorageError};
pub use local::LocalStore;
pub use remote::RemoteStore;
pub use sqlite::SqliteRemoteStore;
