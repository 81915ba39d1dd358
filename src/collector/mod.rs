//! Raw field collection from the pool commands.
//!
//! Each source runs one command line through a [`Transport`] and returns its
//! output as an ordered list of raw text fields. The field count and order
//! are fixed per source and must match the source's declared metric keys
//! exactly; the snapshot assembler enforces that contract.

pub mod mock;
mod transport;
mod zpool;

pub use transport::{LocalTransport, SshTransport, Transport};
pub use zpool::{
    IOSTAT_KEYS, PoolSources, ZFS_GET_KEYS, ZPOOL_LIST_KEYS, ZPOOL_STATUS_KEYS,
};

use crate::metrics::{DERIVED_KEYS, MetricKey};

/// Declared key slices of all sources, in collection order.
pub const SOURCE_KEYS: [&[MetricKey]; 4] =
    [IOSTAT_KEYS, ZFS_GET_KEYS, ZPOOL_LIST_KEYS, ZPOOL_STATUS_KEYS];

/// All metric keys a snapshot can contain: every source's declared keys plus
/// the derived keys. Used to validate requested columns at startup.
pub fn declared_keys() -> Vec<MetricKey> {
    let mut keys: Vec<MetricKey> = SOURCE_KEYS
        .iter()
        .flat_map(|s| s.iter().copied())
        .collect();
    keys.extend(DERIVED_KEYS);
    keys
}

/// Error type for transport and command execution failures.
#[derive(Debug, Clone)]
pub enum FetchError {
    /// Failed to spawn or talk to the transport process.
    Io(String),
    /// The command ran but exited unsuccessfully.
    Command { cmdline: String, detail: String },
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchError::Io(msg) => write!(f, "transport I/O error: {}", msg),
            FetchError::Command { cmdline, detail } => {
                write!(f, "command '{}' failed: {}", cmdline, detail)
            }
        }
    }
}

impl std::error::Error for FetchError {}
