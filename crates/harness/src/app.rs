use std::cell::RefCell;
use std::error::Error;
use std::rc::Rc;

use taskdeck_core::{Session, Task, TaskId, UserId};
use taskdeck_engine::TaskEngine;
use taskdeck_storage::{LocalStore, RemoteError, RemoteStore};

use crate::notify::{NotificationLog, RecordingNotifier};
use crate::remote::{FailureSwitches, FlakyRemote};

/// One fully wired engine instance for tests: in-memory local slot, flaky
/// in-memory remote, a switchable session and a recording notifier.
pub struct TestApp {
    pub engine: TaskEngine<FlakyRemote>,
    pub session: Rc<RefCell<Session>>,
    pub switches: FailureSwitches,
    pub notifications: NotificationLog,
}

impl TestApp {
    pub fn new() -> Result<Self, Box<dyn Error>> {
        let session = Rc::new(RefCell::new(Session::signed_out()));
        let switches = FailureSwitches::default();
        let notifications = NotificationLog::default();

        let engine = TaskEngine::new(
            LocalStore::open_in_memory()?,
            FlakyRemote::in_memory(switches.clone())?,
            Box::new(Rc::clone(&session)),
            Box::new(RecordingNotifier::new(notifications.clone())),
        );

        Ok(Self {
            engine,
            session,
            switches,
            notifications,
        })
    }

    pub fn guest() -> Result<Self, Box<dyn Error>> {
        let mut app = Self::new()?;
        app.login_as_guest()?;
        Ok(app)
    }

    pub fn signed_in(user: &str) -> Result<Self, Box<dyn Error>> {
        let mut app = Self::new()?;
        app.sign_in(user)?;
        Ok(app)
    }

    pub fn login_as_guest(&mut self) -> Result<(), Box<dyn Error>> {
        self.session.borrow_mut().login_as_guest();
        self.engine.local().write_guest_flag(true)?;
        Ok(())
    }

    pub fn sign_in(&mut self, user: &str) -> Result<(), Box<dyn Error>> {
        self.session.borrow_mut().sign_in(UserId::from(user));
        self.engine.local().clear_guest_flag()?;
        Ok(())
    }

    pub fn sign_out(&mut self) -> Result<(), Box<dyn Error>> {
        self.session.borrow_mut().sign_out();
        self.engine.local().clear_guest_flag()?;
        Ok(())
    }

    /// Owner identity for new tasks, as the caller of `add_todo` would
    /// resolve it from the session.
    pub fn owner(&self) -> UserId {
        self.session
            .borrow()
            .current_user()
            .cloned()
            .unwrap_or_else(|| UserId::from("guest"))
    }

    pub fn add(&mut self, title: &str) -> Result<(), Box<dyn Error>> {
        let owner = self.owner();
        self.engine.add_todo(title, &owner)?;
        Ok(())
    }

    /// Insert a row directly into the backing remote, bypassing the engine,
    /// as if another client had written it.
    pub fn seed_remote(&mut self, title: &str, position: i64) -> Result<Task, RemoteError> {
        let owner = self.owner();
        self.engine
            .remote_mut()
            .inner_mut()
            .insert(&taskdeck_core::NewTask::new(title, owner, position))
    }

    pub fn remote_rows(&mut self) -> Result<Vec<Task>, RemoteError> {
        self.engine.remote_mut().inner_mut().list_ordered()
    }

    pub fn task_ids(&self) -> Vec<TaskId> {
        self.engine.tasks().iter().map(|t| t.id).collect()
    }

    pub fn find(&self, id: TaskId) -> &Task {
        self.engine
            .tasks()
            .iter()
            .find(|t| t.id == id)
            .expect("task present")
    }
}
