use std::fmt;
use std::future::Future;

use futures::future::BoxFuture;
use futures::FutureExt;
use tokio::task::JoinHandle;

/// The work a job performs when it fires.
pub enum Action {
    /// A synchronous callback, run on Tokio's blocking pool.
    Blocking(Box<dyn FnOnce() + Send + 'static>),
    /// A future, spawned as an ordinary Tokio task.
    Async(BoxFuture<'static, ()>),
}

impl Action {
    pub fn blocking<F>(job: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Action::Blocking(Box::new(job))
    }

    pub fn from_future<Fut>(job: Fut) -> Self
    where
        Fut: Future<Output = ()> + Send + 'static,
    {
        Action::Async(job.boxed())
    }

    /// Hand the action to the runtime without waiting for it.
    ///
    /// Must be called from within a Tokio runtime. A panic inside the action
    /// is captured by the returned handle and never reaches the caller.
    pub fn dispatch(self) -> JoinHandle<()> {
        match self {
            Action::Blocking(job) => tokio::task::spawn_blocking(job),
            Action::Async(job) => tokio::spawn(job),
        }
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Blocking(_) => f.write_str("Action::Blocking"),
            Action::Async(_) => f.write_str("Action::Async"),
        }
    }
}
