//! Canned transport for tests and for demoing without a pool host.

use super::{FetchError, Transport};

/// Transport that answers command lines from a prefix-matched table.
#[derive(Debug, Default, Clone)]
pub struct MockTransport {
    responses: Vec<(String, String)>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or replaces) the response for commands starting with
    /// `prefix`.
    pub fn respond(&mut self, prefix: impl Into<String>, output: impl Into<String>) {
        let prefix = prefix.into();
        let output = output.into();
        if let Some(entry) = self.responses.iter_mut().find(|(p, _)| *p == prefix) {
            entry.1 = output;
        } else {
            self.responses.push((prefix, output));
        }
    }

    /// A healthy single-pool scenario with realistic field values, including
    /// the `-` markers iostat prints for idle write queues.
    pub fn typical_pool() -> Self {
        let mut mock = Self::new();
        mock.respond(
            "zpool iostat",
            "amalgm 51567724367872 16344298516480 16 0 8468325 0 15682379 - 15682379 - 3532 - 3510 - - -",
        );
        mock.respond(
            "zfs get used",
            "54866186481664 12908397449216 1.01 54700434006016 ",
        );
        mock.respond("zfs get usedbysnapshots", "1381425606656");
        mock.respond("zpool list", "ONLINE\t20%");
        mock.respond(
            "zpool status",
            "scan: scrub repaired 0B in 1 days 12:59:37 with 0 errors on Sat Jan 27 22:59:39 2024",
        );
        mock
    }
}

impl Transport for MockTransport {
    fn run(&mut self, cmdline: &str) -> Result<String, FetchError> {
        // Longest match wins: "zfs get usedbysnapshots" must not be captured
        // by a shorter "zfs get used" registration.
        self.responses
            .iter()
            .filter(|(prefix, _)| cmdline.starts_with(prefix.as_str()))
            .max_by_key(|(prefix, _)| prefix.len())
            .map(|(_, output)| output.clone())
            .ok_or_else(|| FetchError::Command {
                cmdline: cmdline.to_string(),
                detail: "no canned response".to_string(),
            })
    }
}
