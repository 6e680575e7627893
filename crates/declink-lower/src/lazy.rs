//! One-shot memoized fields guarded by a per-declaration lock.
//!
//! A field is read lock-free once evaluated. The first reader takes the
//! declaration's reentrant lock, re-checks, computes and publishes; other
//! threads reading any field of the same declaration block on the lock until
//! it is released. The same thread may re-enter to evaluate a different field
//! of the same declaration, but re-entering the field it is already computing
//! is a cycle and fails instead of deadlocking.

use crate::error::{LoweringError, LoweringResult};
use crate::ids::LinkDeclId;
use once_cell::sync::OnceCell;
use parking_lot::ReentrantMutex;
use std::sync::atomic::{AtomicBool, Ordering};

/// The per-declaration exclusion lock shared by all lazy fields of a node.
pub type DeclLock = ReentrantMutex<()>;

pub struct LazyField<T> {
    cell: OnceCell<T>,
    in_progress: AtomicBool,
}

impl<T> Default for LazyField<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> LazyField<T> {
    pub const fn new() -> Self {
        Self {
            cell: OnceCell::new(),
            in_progress: AtomicBool::new(false),
        }
    }

    /// The evaluated value, if any. Never triggers evaluation.
    #[inline]
    pub fn get(&self) -> Option<&T> {
        self.cell.get()
    }

    #[inline]
    pub fn is_evaluated(&self) -> bool {
        self.cell.get().is_some()
    }

    /// Return the memoized value, computing it under `lock` on first read.
    ///
    /// A failed computation publishes nothing; the field stays unevaluated.
    pub fn get_or_try_init<F>(
        &self,
        lock: &DeclLock,
        decl: LinkDeclId,
        field: &'static str,
        init: F,
    ) -> LoweringResult<&T>
    where
        F: FnOnce() -> LoweringResult<T>,
    {
        if let Some(value) = self.cell.get() {
            return Ok(value);
        }
        let _guard = lock.lock();
        if let Some(value) = self.cell.get() {
            return Ok(value);
        }
        if self.in_progress.swap(true, Ordering::AcqRel) {
            return Err(LoweringError::CyclicEvaluation { decl, field });
        }
        let _reset = InProgressReset(&self.in_progress);
        let value = init()?;
        match self.cell.try_insert(value) {
            Ok(value) => Ok(value),
            Err((existing, _)) => Ok(existing),
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for LazyField<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.cell.get() {
            Some(value) => f.debug_tuple("Evaluated").field(value).finish(),
            None => f.write_str("Unevaluated"),
        }
    }
}

/// Clears the in-progress flag on every exit path, errors and panics included.
struct InProgressReset<'a>(&'a AtomicBool);

impl Drop for InProgressReset<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[cfg(test)]
#[path = "../tests/lazy_tests.rs"]
mod tests;
