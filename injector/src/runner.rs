use crate::configs::injector::InjectorConfig;
use crate::error::InjectorError;
use crate::pacing::PacingScheduler;
use crate::statistics::{ProgressReporter, RunStats, StatsSnapshot};
use crate::template::MessageTemplate;
use crate::transport::{Connector, ReconnectionConfig, TransportClient};
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Connected,
    Running,
    Draining,
    Terminated,
}

impl RunState {
    pub fn can_transition_to(self, next: RunState) -> bool {
        matches!(
            (self, next),
            (RunState::Idle, RunState::Connected)
                | (RunState::Connected, RunState::Running)
                | (RunState::Running, RunState::Draining)
                | (RunState::Draining, RunState::Terminated)
        )
    }
}

impl Display for RunState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            RunState::Idle => write!(f, "idle"),
            RunState::Connected => write!(f, "connected"),
            RunState::Running => write!(f, "running"),
            RunState::Draining => write!(f, "draining"),
            RunState::Terminated => write!(f, "terminated"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    pub snapshot: StatsSnapshot,
    /// Counter value the next message would have carried, i.e. attempted sends.
    pub next_counter: u64,
    pub cancelled: bool,
}

/// Drives template rendering, pacing, transport and statistics for one run.
#[derive(Debug)]
pub struct Runner {
    config: InjectorConfig,
    template: MessageTemplate,
    transport: TransportClient,
    shutdown: CancellationToken,
    state: RunState,
    next_counter: u64,
}

impl Runner {
    pub fn new(
        config: InjectorConfig,
        connector: Arc<dyn Connector>,
        shutdown: CancellationToken,
    ) -> Self {
        let reconnection = ReconnectionConfig {
            interval: config.reconnect_interval(),
            attempts: config.reconnect_attempts,
        };
        Self {
            template: MessageTemplate::parse(&config.message_format),
            transport: TransportClient::new(connector, reconnection),
            config,
            shutdown,
            state: RunState::Idle,
            next_counter: 0,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    fn transition(&mut self, next: RunState) -> Result<(), InjectorError> {
        if !self.state.can_transition_to(next) {
            return Err(InjectorError::InvalidStateTransition(
                self.state.to_string(),
                next.to_string(),
            ));
        }
        debug!("Run state: {} -> {next}", self.state);
        self.state = next;
        Ok(())
    }

    /// Runs until the configured duration elapses or the shutdown token is
    /// cancelled. A failed initial connection returns before any statistics
    /// exist; a failed reconnection still prints the final summary.
    pub async fn run(&mut self) -> Result<RunSummary, InjectorError> {
        self.transport.connect().await?;
        self.transition(RunState::Connected)?;
        self.print_banner();

        let stats = Arc::new(RunStats::new());
        let reporter_shutdown = self.shutdown.child_token();
        let reporter = ProgressReporter::new(stats.clone(), reporter_shutdown.clone()).spawn();

        self.transition(RunState::Running)?;
        let outcome = self.send_batches(&stats).await;

        self.transition(RunState::Draining)?;
        reporter_shutdown.cancel();
        if let Err(error) = reporter.await {
            warn!("Progress reporter failed: {error}");
        }
        let snapshot = stats.snapshot();
        println!("{}", snapshot.final_summary(self.next_counter));
        self.transport.disconnect().await;
        self.transition(RunState::Terminated)?;

        outcome?;
        let cancelled = self.shutdown.is_cancelled();
        info!(
            "Run finished{}: {} message(s) sent, {} error(s).",
            if cancelled { " after cancellation" } else { "" },
            snapshot.messages,
            snapshot.errors
        );
        Ok(RunSummary {
            snapshot,
            next_counter: self.next_counter,
            cancelled,
        })
    }

    fn print_banner(&self) {
        println!("Connected to socket: {}", self.transport.target());
        println!("Target rate: {} msg/s", self.config.target_rate);
        println!("Duration: {}s", self.config.duration);
        println!("Batch size: {}", self.config.batch_size);
        println!("\nStarting test...\n");
    }

    async fn send_batches(&mut self, stats: &RunStats) -> Result<(), InjectorError> {
        let mut scheduler = PacingScheduler::new(self.config.batch_size, self.config.target_rate)?;
        let duration = self.config.run_duration();
        let started = Instant::now();
        scheduler.start(started);
        debug!(
            "Pacing {} message(s) every {:?}.",
            scheduler.batch_size(),
            scheduler.batch_interval()
        );

        let mut message = String::with_capacity(self.template.source().len() + 64);
        while !self.shutdown.is_cancelled() && started.elapsed() < duration {
            for _ in 0..scheduler.batch_size() {
                if self.shutdown.is_cancelled() {
                    break;
                }
                let counter = self.next_counter;
                self.template.render_into(counter, &mut message);
                self.next_counter += 1;

                match self.transport.send(message.as_bytes()).await {
                    Ok(bytes) => stats.record_sent(bytes),
                    Err(error) if !error.is_fatal() => {
                        stats.record_error();
                        if self.config.verbose {
                            warn!("Error sending message #{counter}: {error}");
                        } else {
                            debug!("Error sending message #{counter}: {error}");
                        }
                        self.transport.reconnect(&self.shutdown).await?;
                    }
                    Err(error) => return Err(error),
                }
            }

            if !scheduler.wait_for_next_batch(&self.shutdown).await {
                break;
            }
        }
        Ok(())
    }
}
