//! Process-wide default sender.
//!
//! Entry points that cannot thread a sender through their call graph may
//! install one here and fetch it later. [`FluentSender`] itself never reads
//! this registry. Access is guarded by a `parking_lot::RwLock`.

use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;

use crate::{
    builder::{SenderBuildError, SenderBuilder},
    sender::FluentSender,
};

static GLOBAL_SENDER: Lazy<RwLock<Option<Arc<FluentSender>>>> = Lazy::new(|| RwLock::new(None));

/// Build a sender from `builder` and install it as the process-wide default,
/// replacing any previously installed sender.
pub fn setup(builder: SenderBuilder) -> Result<Arc<FluentSender>, SenderBuildError> {
    let sender = Arc::new(builder.build()?);
    *GLOBAL_SENDER.write() = Some(Arc::clone(&sender));
    Ok(sender)
}

/// Return the installed sender, if any.
pub fn global_sender() -> Option<Arc<FluentSender>> {
    GLOBAL_SENDER.read().clone()
}

/// Remove the installed sender. It is closed once the last clone is dropped.
pub fn reset_global_sender() {
    GLOBAL_SENDER.write().take();
}
