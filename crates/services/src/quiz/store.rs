use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use quiz_core::model::{Session, UserId};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type Slot = Arc<AsyncMutex<Option<Session>>>;

/// In-progress sessions keyed by user.
///
/// Each user has an async lock of their own, so answers from one user are
/// applied one at a time while other users proceed in parallel. A slot is
/// dropped by [`SessionStore::release`] only once it is empty and nobody else
/// holds or waits on it, so a waiting task always sees the latest state.
#[derive(Default)]
pub struct SessionStore {
    slots: Mutex<HashMap<UserId, Slot>>,
}

impl SessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, user: UserId) -> Slot {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(slots.entry(user).or_default())
    }

    /// Exclusive access to `user`'s session until the guard is dropped.
    pub async fn lock(&self, user: UserId) -> OwnedMutexGuard<Option<Session>> {
        self.slot(user).lock_owned().await
    }

    /// Install `session` for `user`, returning whatever it replaced.
    pub async fn replace(&self, user: UserId, session: Session) -> Option<Session> {
        self.lock(user).await.replace(session)
    }

    pub async fn remove(&self, user: UserId) -> Option<Session> {
        let removed = self.lock(user).await.take();
        self.release(user);
        removed
    }

    /// Forget `user`'s slot if it is empty and unused.
    pub fn release(&self, user: UserId) {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        let idle = slots.get(&user).is_some_and(|slot| {
            // waiters clone the slot under this lock, so a count of 1 is final
            Arc::strong_count(slot) == 1 && slot.try_lock().is_ok_and(|s| s.is_none())
        });
        if idle {
            slots.remove(&user);
        }
    }

    /// Number of users with a slot.
    #[must_use]
    pub fn tracked_users(&self) -> usize {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Copy of `user`'s current session, if any.
    pub async fn get(&self, user: UserId) -> Option<Session> {
        self.lock(user).await.clone()
    }
}
