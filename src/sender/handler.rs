//! Public sender type exported by the crate.

use std::time::Duration;

use log::{debug, warn};
use parking_lot::Mutex;
use serde::Serialize;

use crate::rate_limited_warner::RateLimitedWarner;

use super::{
    buffer::{PendingBuffer, Retention},
    config::SenderConfig,
    error::SendError,
    packet::PacketBuilder,
    transport::{ActiveConnection, Endpoint, connect_endpoint},
};

/// Connection and unsent bytes, only ever touched under the sender's lock.
#[derive(Debug)]
struct SenderState {
    connection: Option<ActiveConnection>,
    pending: PendingBuffer,
}

impl SenderState {
    /// Connect unless a connection already exists. Liveness is only
    /// discovered by the next write.
    fn ensure_connected(
        &mut self,
        endpoint: &Endpoint,
        timeout: Duration,
    ) -> Result<&mut ActiveConnection, SendError> {
        let connection = match self.connection.take() {
            Some(connection) => connection,
            None => connect_endpoint(endpoint, timeout).map_err(SendError::Connect)?,
        };
        Ok(self.connection.insert(connection))
    }

    fn transmit(
        &mut self,
        bytes: &[u8],
        endpoint: &Endpoint,
        timeout: Duration,
    ) -> Result<(), SendError> {
        let connection = self.ensure_connected(endpoint, timeout)?;
        connection.send_all(bytes).map_err(SendError::Write)
    }

    fn close(&mut self) {
        if let Some(connection) = self.connection.take() {
            let _ = connection.shutdown();
        }
    }
}

/// Forwards tagged events to a Fluentd-compatible collector.
///
/// Encoding happens on the calling thread without holding any lock; the
/// connect, write and buffer update that follow run under a single mutex so
/// concurrent callers are serialised. Failures are absorbed: unsent bytes
/// are kept for the next call up to the configured ceiling and dropped
/// beyond it.
pub struct FluentSender {
    packets: PacketBuilder,
    endpoint: Endpoint,
    timeout: Duration,
    verbose: bool,
    warner: RateLimitedWarner,
    state: Mutex<SenderState>,
}

impl FluentSender {
    /// Construct a sender for `tag` targeting the default collector.
    pub fn new(tag: impl Into<String>) -> Self {
        Self::with_config(SenderConfig::new(tag))
    }

    /// Construct the sender from a configuration object.
    ///
    /// One connection attempt is made immediately; if it fails the first
    /// emitted event retries it.
    pub fn with_config(config: SenderConfig) -> Self {
        let sender = Self {
            packets: PacketBuilder::new(config.tag, config.verbose),
            endpoint: config.endpoint,
            timeout: config.timeout,
            verbose: config.verbose,
            warner: RateLimitedWarner::new(config.warn_interval),
            state: Mutex::new(SenderState {
                connection: None,
                pending: PendingBuffer::new(config.buffer_max),
            }),
        };
        if let Err(err) = sender
            .state
            .lock()
            .ensure_connected(&sender.endpoint, sender.timeout)
        {
            debug!("FluentSender initial connection to {} failed: {err}", sender.endpoint);
        }
        sender
    }

    pub fn tag(&self) -> &str {
        self.packets.tag()
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Emit `payload` stamped with the current Unix time in seconds.
    pub fn emit<P>(&self, label: Option<&str>, payload: &P)
    where
        P: Serialize + ?Sized,
    {
        self.emit_with_time(label, chrono::Utc::now().timestamp(), payload);
    }

    /// Emit `payload` with an explicit Unix timestamp.
    ///
    /// Never fails from the caller's perspective: unencodable payloads are
    /// replaced by a diagnostic record and transmission failures are
    /// buffered or dropped.
    pub fn emit_with_time<P>(&self, label: Option<&str>, timestamp: i64, payload: &P)
    where
        P: Serialize + ?Sized,
    {
        let packet = self.packets.build(label, timestamp, payload);
        if packet.is_empty() {
            return;
        }
        self.send(packet);
    }

    /// Number of unsent bytes awaiting the next attempt.
    pub fn pending_len(&self) -> usize {
        self.state.lock().pending.len()
    }

    /// Whether a connection handle is currently held. A held connection may
    /// still turn out to be dead on the next write.
    pub fn is_connected(&self) -> bool {
        self.state.lock().connection.is_some()
    }

    /// Drop the current connection, if any. Pending bytes are kept.
    pub fn close(&self) {
        self.state.lock().close();
    }

    fn send(&self, bytes: Vec<u8>) {
        let mut state = self.state.lock();
        let combined = state.pending.combine(bytes);
        match state.transmit(&combined, &self.endpoint, self.timeout) {
            Ok(()) => state.pending.clear(),
            Err(err) => {
                state.close();
                self.report_send_failure(&err);
                if let Retention::Dropped(len) = state.pending.retain(combined) {
                    self.report_drop(len, state.pending.ceiling());
                }
            }
        }
    }

    fn report_send_failure(&self, err: &SendError) {
        if self.verbose {
            warn!("FluentSender send to {} failed: {err}", self.endpoint);
        } else {
            debug!("FluentSender send to {} failed: {err}", self.endpoint);
        }
    }

    fn report_drop(&self, len: usize, ceiling: usize) {
        self.warner.record_drop(len);
        if self.verbose {
            self.warner.warn_if_due(|count, bytes| {
                warn!(
                    "FluentSender discarded {count} pending buffers ({bytes} bytes) exceeding the {ceiling} byte ceiling"
                );
            });
        } else {
            debug!("FluentSender discarded {len} pending bytes exceeding the {ceiling} byte ceiling");
        }
    }
}

impl Drop for FluentSender {
    fn drop(&mut self) {
        self.state.get_mut().close();
    }
}

impl std::fmt::Debug for FluentSender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FluentSender")
            .field("tag", &self.tag())
            .field("endpoint", &self.endpoint)
            .field("timeout", &self.timeout)
            .field("verbose", &self.verbose)
            .finish()
    }
}
