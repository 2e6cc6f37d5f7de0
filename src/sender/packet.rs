//! Packet construction and MessagePack encoding.
//!
//! Every event is encoded as a three element array `[tag, timestamp,
//! payload]`. Structs are written as maps keyed by field name, so payloads
//! deriving `Serialize` arrive at the collector as nested records. When a
//! payload refuses to encode, a [`DiagnosticRecord`] is sent in its place.

use std::{backtrace::Backtrace, borrow::Cow, error::Error, fmt::Write as _};

use log::{debug, info, warn};
use rmp_serde::Serializer;
use serde::Serialize;

use super::error::EncodeError;

/// Separator between the base tag and a per-call label.
pub const TAG_SEPARATOR: char = '.';
/// Severity reported by diagnostic records.
pub const DIAGNOSTIC_LEVEL: &str = "CRITICAL";
/// Source identifier reported by diagnostic records.
pub const DIAGNOSTIC_MODULE: &str = "fluent-logger";
/// Message reported by diagnostic records.
pub const DIAGNOSTIC_MESSAGE: &str = "Can't output log";

/// Join `base` and `label`; an absent or empty label yields `base` unchanged.
pub fn qualified_tag<'a>(base: &'a str, label: Option<&str>) -> Cow<'a, str> {
    match label {
        Some(label) if !label.is_empty() => Cow::Owned(format!("{base}{TAG_SEPARATOR}{label}")),
        _ => Cow::Borrowed(base),
    }
}

/// Serialise an event triple into a MessagePack array.
pub fn encode_event<P>(tag: &str, timestamp: i64, payload: &P) -> Result<Vec<u8>, EncodeError>
where
    P: Serialize + ?Sized,
{
    let mut buf = Vec::with_capacity(128);
    (tag, timestamp, payload).serialize(&mut Serializer::new(&mut buf).with_struct_map())?;
    Ok(buf)
}

/// Substitute payload describing an event that could not be encoded.
///
/// Only string fields, so encoding it cannot hit the failure it reports.
#[derive(Clone, Debug, Serialize)]
pub struct DiagnosticRecord {
    pub level: &'static str,
    pub module: &'static str,
    pub message: &'static str,
    pub hostname: String,
    pub traceback: String,
}

impl DiagnosticRecord {
    /// Describe `err` along with the local host name and current backtrace.
    pub fn capture(err: &dyn Error) -> Self {
        Self {
            level: DIAGNOSTIC_LEVEL,
            module: DIAGNOSTIC_MODULE,
            message: DIAGNOSTIC_MESSAGE,
            hostname: gethostname::gethostname().to_string_lossy().into_owned(),
            traceback: describe_failure(err),
        }
    }
}

fn describe_failure(err: &dyn Error) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let _ = write!(out, "\ncaused by: {cause}");
        source = cause.source();
    }
    let _ = write!(out, "\n{}", Backtrace::force_capture());
    out
}

fn log_packet<P>(tag: &str, timestamp: i64, payload: &P)
where
    P: Serialize + ?Sized,
{
    let rendered = serde_json::to_string(payload)
        .unwrap_or_else(|err| format!("<payload not representable as JSON: {err}>"));
    info!(target: "fluent_sender::packet", "({tag:?}, {timestamp}, {rendered})");
}

/// Builds wire packets for a single base tag.
#[derive(Clone, Debug)]
pub struct PacketBuilder {
    tag: String,
    verbose: bool,
}

impl PacketBuilder {
    pub fn new(tag: impl Into<String>, verbose: bool) -> Self {
        Self {
            tag: tag.into(),
            verbose,
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Encode an event, falling back to a [`DiagnosticRecord`] on failure.
    ///
    /// Returns an empty vector only if the diagnostic record itself fails to
    /// encode, which callers treat as nothing to send.
    pub fn build<P>(&self, label: Option<&str>, timestamp: i64, payload: &P) -> Vec<u8>
    where
        P: Serialize + ?Sized,
    {
        let tag = qualified_tag(&self.tag, label);
        if self.verbose {
            log_packet(&tag, timestamp, payload);
        }
        match encode_event(&tag, timestamp, payload) {
            Ok(bytes) => bytes,
            Err(err) => {
                let record = DiagnosticRecord::capture(&err);
                if self.verbose {
                    warn!("FluentSender could not encode event for {tag}: {}", record.traceback);
                } else {
                    debug!("FluentSender could not encode event for {tag}: {err}");
                }
                encode_event(&tag, timestamp, &record).unwrap_or_else(|err| {
                    warn!("FluentSender could not encode diagnostic record for {tag}: {err}");
                    Vec::new()
                })
            }
        }
    }
}
