use std::cell::RefCell;
use std::rc::Rc;

use crate::ids::UserId;

/// Which backend a single engine operation talks to. Captured once at
/// operation entry so a session change mid-operation cannot split one
/// logical mutation across backends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistMode {
    Guest,
    Account { user: UserId },
}

impl PersistMode {
    pub fn is_guest(&self) -> bool {
        matches!(self, Self::Guest)
    }
}

/// Identity boundary. The engine never decides who the user is; it asks
/// this collaborator at the start of each operation.
pub trait SessionContext {
    fn mode(&self) -> PersistMode;
}

/// Concrete session state: a guest flag plus an optional signed-in user.
/// A session that is neither guest nor signed in resolves to guest mode,
/// since local-only persistence is the safe fallback.
#[derive(Debug, Clone, Default)]
pub struct Session {
    is_guest: bool,
    user: Option<UserId>,
}

impl Session {
    pub fn signed_out() -> Self {
        Self::default()
    }

    pub fn login_as_guest(&mut self) {
        self.is_guest = true;
        self.user = None;
    }

    pub fn sign_in(&mut self, user: UserId) {
        self.is_guest = false;
        self.user = Some(user);
    }

    pub fn sign_out(&mut self) {
        self.is_guest = false;
        self.user = None;
    }

    pub fn is_guest(&self) -> bool {
        self.is_guest
    }

    pub fn current_user(&self) -> Option<&UserId> {
        self.user.as_ref()
    }
}

impl SessionContext for Session {
    fn mode(&self) -> PersistMode {
        match (&self.user, self.is_guest) {
            (Some(user), false) => PersistMode::Account { user: user.clone() },
            _ => PersistMode::Guest,
        }
    }
}

/// Shared handle for callers that switch the session while an engine holds
/// it. Single logical thread of control per engine instance, so `Rc` is
/// enough.
impl SessionContext for Rc<RefCell<Session>> {
    fn mode(&self) -> PersistMode {
        self.borrow().mode()
    }
}
