//! Failure values produced inside the send pipeline.
//!
//! None of these reach callers of [`FluentSender::emit`](super::FluentSender::emit);
//! the send path matches on them to decide whether to retain or drop bytes.
//! Only [`EncodeError`] is exported, as the error type of
//! [`encode_event`](super::encode_event).

use std::io;

use thiserror::Error;

/// A transmission attempt that did not deliver its bytes.
#[derive(Debug, Error)]
pub enum SendError {
    #[error("failed to connect: {0}")]
    Connect(#[source] io::Error),
    #[error("failed to write: {0}")]
    Write(#[source] io::Error),
}

/// The payload could not be rendered as MessagePack.
#[derive(Debug, Error)]
#[error("failed to encode event")]
pub struct EncodeError(#[from] pub rmp_serde::encode::Error);
