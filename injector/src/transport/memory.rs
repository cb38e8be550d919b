use super::{ConnectionStream, Connector, RECORD_DELIMITER};
use async_trait::async_trait;
use std::io;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;

/// In-memory sink with failure injection, shared between the test and the transport.
#[derive(Debug, Clone, Default)]
pub(crate) struct MemoryConnector {
    state: Arc<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    received: Mutex<Vec<u8>>,
    failing_writes: AtomicU32,
    refusing: AtomicBool,
    attempts: AtomicU32,
    // Zero means unlimited.
    connection_limit: AtomicU32,
    cancel_after: Mutex<Option<(u32, CancellationToken)>>,
}

#[derive(Debug)]
struct MemoryStream {
    state: Arc<MemoryState>,
}

impl MemoryConnector {
    pub fn fail_next_writes(&self, count: u32) {
        self.state.failing_writes.store(count, Ordering::SeqCst);
    }

    pub fn refuse_connections(&self, refuse: bool) {
        self.state.refusing.store(refuse, Ordering::SeqCst);
    }

    /// Refuses every connection after the first `limit` ones.
    pub fn limit_connections(&self, limit: u32) {
        self.state.connection_limit.store(limit, Ordering::SeqCst);
    }

    /// Cancels `shutdown` once `writes` more records have been written.
    pub fn cancel_after_writes(&self, writes: u32, shutdown: CancellationToken) {
        *self.state.cancel_after.lock().unwrap() = Some((writes, shutdown));
    }

    pub fn connection_attempts(&self) -> u32 {
        self.state.attempts.load(Ordering::SeqCst)
    }

    pub fn received(&self) -> Vec<u8> {
        self.state.received.lock().unwrap().clone()
    }

    pub fn received_lines(&self) -> Vec<String> {
        String::from_utf8(self.received())
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }
}

#[async_trait]
impl Connector for MemoryConnector {
    fn target(&self) -> &str {
        "memory"
    }

    async fn connect(&self) -> io::Result<Box<dyn ConnectionStream>> {
        let attempt = self.state.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        let limit = self.state.connection_limit.load(Ordering::SeqCst);
        if self.state.refusing.load(Ordering::SeqCst) || (limit > 0 && attempt > limit) {
            return Err(io::Error::from(io::ErrorKind::ConnectionRefused));
        }
        Ok(Box::new(MemoryStream {
            state: self.state.clone(),
        }))
    }
}

#[async_trait]
impl ConnectionStream for MemoryStream {
    async fn write_record(&mut self, message: &[u8]) -> io::Result<()> {
        let failing = self
            .state
            .failing_writes
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1));
        if failing.is_ok() {
            return Err(io::Error::from(io::ErrorKind::BrokenPipe));
        }
        let mut received = self.state.received.lock().unwrap();
        received.extend_from_slice(message);
        received.extend_from_slice(RECORD_DELIMITER);
        if let Some((left, shutdown)) = self.state.cancel_after.lock().unwrap().as_mut() {
            *left = left.saturating_sub(1);
            if *left == 0 {
                shutdown.cancel();
            }
        }
        Ok(())
    }

    async fn shutdown(&mut self) -> io::Result<()> {
        Ok(())
    }
}
