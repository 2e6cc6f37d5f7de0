//! Best-effort forwarding of structured events to a Fluentd-compatible
//! collector.
//!
//! ```no_run
//! use std::collections::BTreeMap;
//!
//! use fluent_sender::SenderBuilder;
//!
//! let sender = SenderBuilder::new("app")
//!     .with_host("localhost")
//!     .with_port(24224)
//!     .build()
//!     .expect("valid configuration");
//! let mut event = BTreeMap::new();
//! event.insert("from", "userA");
//! event.insert("to", "userB");
//! sender.emit(Some("follow"), &event);
//! ```

pub mod builder;
pub mod global;
pub mod payload;
pub mod rate_limited_warner;
pub mod sender;

pub use builder::{SenderBuildError, SenderBuilder};
pub use global::{global_sender, reset_global_sender, setup};
pub use payload::Lossy;
pub use sender::{Endpoint, FluentSender, SenderConfig};
