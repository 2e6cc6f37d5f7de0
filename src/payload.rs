//! Helpers for shaping event payloads.
//!
//! Payloads are anything implementing [`serde::Serialize`]. Structs encode
//! as maps of their fields, recursively, so deriving `Serialize` is the way
//! to expose a type's fields to the collector. Types without a `Serialize`
//! implementation can still be attached through [`Lossy`], which sends their
//! `Display` rendering instead.

use std::fmt;

use serde::{Serialize, Serializer};

/// Encodes the wrapped value as its `Display` string.
///
/// ```
/// use std::collections::BTreeMap;
/// use std::net::Ipv4Addr;
///
/// use fluent_sender::payload::Lossy;
///
/// let addr = Ipv4Addr::LOCALHOST;
/// let mut payload = BTreeMap::new();
/// payload.insert("peer", Lossy(&addr));
/// let json = serde_json::to_string(&payload).expect("serialise payload");
/// assert_eq!(json, r#"{"peer":"127.0.0.1"}"#);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Lossy<T>(pub T);

impl<T: fmt::Display> Serialize for Lossy<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

impl<T: fmt::Display> fmt::Display for Lossy<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
