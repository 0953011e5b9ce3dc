// [libs/domain-models/src/ptr_record.rs]
//! Result-store row: a single PTR observation for one IPv4 address.

use serde::{Deserialize, Serialize};

/// The alphabet every stored PTR value is drawn from. Recoverable
/// resolver conditions are folded into this enum so the result stream
/// is always well-formed, never a raw error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PtrText {
    Domain(String),
    NxDomain,
    Timeout,
    ServFail,
    Error,
}

impl PtrText {
    pub const NXDOMAIN: &'static str = "NXDOMAIN";
    pub const TIMEOUT: &'static str = "TIMEOUT";
    pub const SERVFAIL: &'static str = "SERVFAIL";
    pub const ERROR: &'static str = "ERROR";

    pub fn as_str(&self) -> &str {
        match self {
            PtrText::Domain(name) => name,
            PtrText::NxDomain => Self::NXDOMAIN,
            PtrText::Timeout => Self::TIMEOUT,
            PtrText::ServFail => Self::SERVFAIL,
            PtrText::Error => Self::ERROR,
        }
    }
}

impl From<PtrText> for String {
    fn from(value: PtrText) -> Self {
        value.as_str().to_string()
    }
}

/// A durable `(ip -> ptr)` row. The most recent observation wins on upsert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PtrRecord {
    pub ip: u32,
    pub ptr: String,
}

impl PtrRecord {
    pub fn new(ip: u32, ptr: impl Into<String>) -> Self {
        Self { ip, ptr: ptr.into() }
    }
}
