use crate::{HarnessError, HarnessResult};

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use uuid::Uuid;

/// Proof of admission, handed back on exit.
#[derive(Debug, PartialEq, Eq)]
pub struct AdmissionToken(Uuid);

/// A permit of one guarding a unit's start/stop pair.
///
/// The token returned by `enter` must be the one presented to `exit`;
/// anything else is a programming error and leaves the gate held.
#[derive(Debug)]
pub struct AdmissionGate {
    unit: String,
    holder: Mutex<Option<Uuid>>,
    released: Condvar,
}

impl AdmissionGate {
    pub fn new<S: Into<String>>(unit: S) -> Self {
        Self {
            unit: unit.into(),
            holder: Mutex::new(None),
            released: Condvar::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<Uuid>> {
        self.holder.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn enter(&self) -> AdmissionToken {
        let mut holder = self.lock();
        while holder.is_some() {
            holder = self
                .released
                .wait(holder)
                .unwrap_or_else(PoisonError::into_inner);
        }
        let token = Uuid::new_v4();
        *holder = Some(token);
        AdmissionToken(token)
    }

    /// `None` if the gate was still held at `deadline`.
    pub fn enter_within(&self, deadline: Instant) -> Option<AdmissionToken> {
        let mut holder = self.lock();
        while holder.is_some() {
            let now = Instant::now();
            if now >= deadline {
                return None;
            }
            holder = self
                .released
                .wait_timeout(holder, deadline - now)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
        let token = Uuid::new_v4();
        *holder = Some(token);
        Some(AdmissionToken(token))
    }

    #[track_caller]
    pub fn exit(&self, token: AdmissionToken) -> HarnessResult<()> {
        let mut holder = self.lock();
        if *holder != Some(token.0) {
            return Err(HarnessError::admission_mismatch(self.unit.clone()));
        }
        *holder = None;
        self.released.notify_one();
        Ok(())
    }

    pub fn is_held(&self) -> bool {
        self.lock().is_some()
    }

    /// Run `f` while holding the gate.
    pub fn with_admission<T, F>(&self, f: F) -> HarnessResult<T>
    where
        F: FnOnce() -> HarnessResult<T>,
    {
        let token = self.enter();
        let result = f();
        self.exit(token)?;
        result
    }

    /// Like `with_admission`; `Ok(None)` if the gate stayed held until `deadline`.
    pub fn with_admission_within<T, F>(&self, deadline: Instant, f: F) -> HarnessResult<Option<T>>
    where
        F: FnOnce() -> HarnessResult<T>,
    {
        let Some(token) = self.enter_within(deadline) else {
            return Ok(None);
        };
        let result = f();
        self.exit(token)?;
        result.map(Some)
    }
}
