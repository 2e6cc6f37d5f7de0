//! Event sender implementation.
//!
//! This module defines [`FluentSender`], which encodes `(tag, timestamp,
//! payload)` triples as MessagePack and writes them to a collector over TCP
//! or a Unix domain socket. The connection is opened lazily and discarded on
//! any I/O error; bytes that fail to send are retained, up to a ceiling, and
//! written ahead of the next event.

mod buffer;
mod config;
mod error;
mod handler;
mod packet;
mod transport;


pub use config::{DEFAULT_BUFFER_MAX, DEFAULT_HOST, DEFAULT_PORT, DEFAULT_TIMEOUT, SenderConfig};
pub use error::EncodeError;
pub use handler::FluentSender;
pub use packet::{
    DIAGNOSTIC_LEVEL, DIAGNOSTIC_MESSAGE, DIAGNOSTIC_MODULE, DiagnosticRecord, PacketBuilder,
    TAG_SEPARATOR, encode_event, qualified_tag,
};
pub use transport::{Endpoint, TcpEndpoint, UNIX_SCHEME, UnixEndpoint};
