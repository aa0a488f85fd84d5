use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::action::Action;
use crate::config::WheelConfig;
use crate::error::WheelError;
use crate::wheel::Wheel;

/// Timing wheel driven by a Tokio command loop
pub struct TimeWheel {
    /// Instance name for logging
    name: String,

    /// Slots, cursor and key index; only touched by the loop
    wheel: Wheel<Action>,

    /// Channel for receiving wheel commands
    command_rx: mpsc::Receiver<WheelCommand>,

    /// Set once the loop has stopped
    closed: Arc<AtomicBool>,

    /// Cancellation token for graceful shutdown
    cancel_token: CancellationToken,
}

/// Handle for submitting work to a running wheel
#[derive(Clone)]
pub struct WheelHandle {
    name: Arc<str>,

    /// Channel for sending commands to the wheel
    command_tx: mpsc::Sender<WheelCommand>,

    closed: Arc<AtomicBool>,
}

/// Wheel command enum
#[derive(Debug)]
pub enum WheelCommand {
    Schedule {
        key: String,
        delay: Duration,
        action: Action,
    },
    Cancel {
        key: String,
    },
    Stop,
}

impl TimeWheel {
    /// Create a new TimeWheel and the handle used to feed it.
    ///
    /// The wheel does nothing until [`start`](Self::start)ed or its
    /// [`run`](Self::run) future is polled. Cancelling `cancel_token` stops it
    /// the same way [`WheelHandle::stop`] does.
    ///
    /// Returns (TimeWheel, WheelHandle)
    pub fn new(
        config: WheelConfig,
        cancel_token: CancellationToken,
    ) -> Result<(Self, WheelHandle), WheelError> {
        config.validate()?;

        let wheel = Wheel::new(config.tick_interval, config.slot_count)?;
        let (command_tx, command_rx) = mpsc::channel(config.command_buffer_size);
        let closed = Arc::new(AtomicBool::new(false));

        let handle = WheelHandle {
            name: Arc::from(config.name.as_str()),
            command_tx,
            closed: closed.clone(),
        };

        let time_wheel = TimeWheel {
            name: config.name,
            wheel,
            command_rx,
            closed,
            cancel_token,
        };

        Ok((time_wheel, handle))
    }

    /// Spawn the command loop on the current Tokio runtime.
    ///
    /// # Panics
    /// Panics if called outside a Tokio runtime.
    pub fn start(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Run the command loop until stopped.
    pub async fn run(mut self) {
        let tick_interval = self.wheel.tick_interval();
        let mut ticker = interval_at(Instant::now() + tick_interval, tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        // All handles dropped: no more commands can arrive.
        let mut detached = false;

        log::info!(
            "Time wheel '{}' started ({} slots, {:?} tick)",
            self.name,
            self.wheel.slot_count(),
            tick_interval
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.on_tick();
                    if detached && self.wheel.is_empty() {
                        log::info!("Time wheel '{}' drained after all handles dropped", self.name);
                        break;
                    }
                },

                command = self.command_rx.recv(), if !detached => {
                    match command {
                        Some(_) if self.cancel_token.is_cancelled() => {
                            log::warn!("Time wheel '{}' cancelled, dropping command", self.name);
                            break;
                        }
                        Some(command) => {
                            if self.handle_command(command) {
                                break;
                            }
                        }
                        None => {
                            detached = true;
                            if self.wheel.is_empty() {
                                log::info!("Time wheel '{}' shutting down - all handles dropped", self.name);
                                break;
                            }
                        }
                    }
                },

                _ = self.cancel_token.cancelled() => {
                    log::info!("Time wheel '{}' cancelled via token", self.name);
                    break;
                },
            }
        }

        self.closed.store(true, Ordering::Release);
        self.command_rx.close();
        let discarded = self.wheel.clear();

        log::info!(
            "Time wheel '{}' stopped, {} pending job(s) discarded",
            self.name,
            discarded
        );
    }

    /// Apply one command; returns true on stop.
    fn handle_command(&mut self, command: WheelCommand) -> bool {
        match command {
            WheelCommand::Schedule { key, delay, action } => {
                let replaced = self.wheel.schedule(delay, key.clone(), action).is_some();
                log::debug!(
                    "Job '{}' {} in wheel '{}' to fire after {:?}",
                    key,
                    if replaced { "replaced" } else { "scheduled" },
                    self.name,
                    delay
                );
            }
            WheelCommand::Cancel { key } => {
                if self.wheel.cancel(&key).is_some() {
                    log::debug!("Job '{}' cancelled in wheel '{}'", key, self.name);
                }
            }
            WheelCommand::Stop => {
                log::info!("Time wheel '{}' stopping", self.name);
                return true;
            }
        }
        false
    }

    /// Advance one slot and dispatch the jobs that came due
    fn on_tick(&mut self) {
        let name = &self.name;
        self.wheel.tick(|job| {
            log::debug!("Job '{}' fired in wheel '{}'", job.key(), name);
            // Detached: the loop never waits on a job.
            drop(job.into_action().dispatch());
        });
    }
}

impl WheelCommand {
    fn schedule(delay: Duration, key: String, action: Action) -> Result<Self, WheelError> {
        if key.is_empty() {
            return Err(WheelError::EmptyKey);
        }
        Ok(WheelCommand::Schedule { key, delay, action })
    }
}

impl WheelHandle {
    /// Name of the wheel this handle feeds
    pub fn name(&self) -> &str {
        &self.name
    }

    /// True once the wheel has stopped; every operation then fails with [`WheelError::Closed`].
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Schedule `job` to run once after `delay`, replacing any pending job under `key`.
    ///
    /// Waits only for room in the command channel, not for the job to be placed.
    pub async fn schedule<F>(
        &self,
        delay: Duration,
        key: impl Into<String>,
        job: F,
    ) -> Result<(), WheelError>
    where
        F: FnOnce() + Send + 'static,
    {
        self.send(WheelCommand::schedule(delay, key.into(), Action::blocking(job))?)
            .await
    }

    /// Schedule a future to be spawned once after `delay`.
    pub async fn schedule_async<Fut>(
        &self,
        delay: Duration,
        key: impl Into<String>,
        job: Fut,
    ) -> Result<(), WheelError>
    where
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.send(WheelCommand::schedule(
            delay,
            key.into(),
            Action::from_future(job),
        )?)
        .await
    }

    /// Schedule a job (non-blocking)
    pub fn try_schedule<F>(
        &self,
        delay: Duration,
        key: impl Into<String>,
        job: F,
    ) -> Result<(), WheelError>
    where
        F: FnOnce() + Send + 'static,
    {
        self.try_send(WheelCommand::schedule(delay, key.into(), Action::blocking(job))?)
    }

    /// Schedule a future (non-blocking)
    pub fn try_schedule_async<Fut>(
        &self,
        delay: Duration,
        key: impl Into<String>,
        job: Fut,
    ) -> Result<(), WheelError>
    where
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.try_send(WheelCommand::schedule(
            delay,
            key.into(),
            Action::from_future(job),
        )?)
    }

    /// Cancel a pending job. Unknown keys are ignored by the wheel.
    pub async fn cancel(&self, key: impl Into<String>) -> Result<(), WheelError> {
        self.send(WheelCommand::Cancel { key: key.into() }).await
    }

    /// Cancel a pending job (non-blocking)
    pub fn try_cancel(&self, key: impl Into<String>) -> Result<(), WheelError> {
        self.try_send(WheelCommand::Cancel { key: key.into() })
    }

    /// Stop the wheel. Pending jobs are discarded.
    pub async fn stop(&self) -> Result<(), WheelError> {
        self.send(WheelCommand::Stop).await
    }

    /// Stop the wheel (non-blocking)
    pub fn try_stop(&self) -> Result<(), WheelError> {
        self.try_send(WheelCommand::Stop)
    }

    async fn send(&self, command: WheelCommand) -> Result<(), WheelError> {
        if self.is_closed() {
            return Err(WheelError::Closed);
        }
        self.command_tx
            .send(command)
            .await
            .map_err(|_| WheelError::Closed)
    }

    fn try_send(&self, command: WheelCommand) -> Result<(), WheelError> {
        if self.is_closed() {
            return Err(WheelError::Closed);
        }
        self.command_tx.try_send(command).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => WheelError::Full,
            mpsc::error::TrySendError::Closed(_) => WheelError::Closed,
        })
    }
}
