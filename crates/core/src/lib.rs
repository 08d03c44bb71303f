pub mod ids;
pub mod session;
pub mod task;

pub use ids::{SubtaskId, TaskId, UserId};
pub use session::{PersistMode, Session, SessionContext};
pub use task::{
    derived_complete, position_before, NewTask, PositionUpdate, Subtask, Task, TaskPatch,
    POSITION_STEP,
};
