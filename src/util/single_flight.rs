//! Coalesce concurrent callers onto one in-flight operation.
//!
//! DESIGN
//! ======
//! The operation runs as its own local task, detached from every caller.
//! Callers only hold a `Shared` join handle over the task's result channel,
//! so dropping all of them does not stall or cancel the work: it still
//! settles, and whatever it records (session state, flags) still happens.
//!
//! The task empties the slot itself before publishing its result, so the
//! slot is cleared exactly once per operation, before any waiting caller
//! resumes, whether the operation produced a value or an error value.
//!
//! Natively the task is spawned with `tokio::task::spawn_local`, so callers
//! must run inside a `tokio::task::LocalSet`. In the browser it goes to
//! `wasm_bindgen_futures::spawn_local`.

#[cfg(test)]
#[path = "single_flight_test.rs"]
mod single_flight_test;

use std::cell::RefCell;
use std::future::Future;
use std::rc::Rc;

use futures::FutureExt;
use futures::channel::oneshot;
use futures::future::{LocalBoxFuture, Shared};

type Handle<T> = Shared<LocalBoxFuture<'static, Option<T>>>;
type Slot<T> = Rc<RefCell<Option<Handle<T>>>>;

pub struct SingleFlight<T: Clone + 'static> {
    slot: Slot<T>,
}

impl<T: Clone + 'static> Default for SingleFlight<T> {
    fn default() -> Self {
        Self { slot: Rc::new(RefCell::new(None)) }
    }
}

impl<T: Clone + 'static> SingleFlight<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// True while an operation is running.
    #[must_use]
    pub fn is_in_flight(&self) -> bool {
        self.slot.borrow().is_some()
    }

    /// Await the running operation, or start one with `start` if none is.
    ///
    /// Resolves to `None` only if the operation was dropped before it
    /// settled (the executor shut down underneath it).
    pub async fn run<F>(&self, start: F) -> Option<T>
    where
        F: FnOnce() -> LocalBoxFuture<'static, T>,
    {
        let handle = self.join_or_start(start);
        handle.await
    }

    fn join_or_start<F>(&self, start: F) -> Handle<T>
    where
        F: FnOnce() -> LocalBoxFuture<'static, T>,
    {
        if let Some(existing) = self.slot.borrow().as_ref() {
            tracing::debug!("joining in-flight operation");
            return existing.clone();
        }

        tracing::debug!("starting operation");
        let operation = start();
        let slot = Rc::clone(&self.slot);
        let (tx, rx) = oneshot::channel();
        spawn_detached(async move {
            let output = operation.await;
            slot.borrow_mut().take();
            tracing::debug!("operation settled");
            // Every caller may have gone away; the result is simply dropped.
            let _ = tx.send(output);
        });

        let handle = async move { rx.await.ok() }.boxed_local().shared();
        *self.slot.borrow_mut() = Some(handle.clone());
        handle
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn spawn_detached(task: impl Future<Output = ()> + 'static) {
    drop(tokio::task::spawn_local(task));
}

#[cfg(all(target_arch = "wasm32", feature = "hydrate"))]
fn spawn_detached(task: impl Future<Output = ()> + 'static) {
    wasm_bindgen_futures::spawn_local(task);
}
