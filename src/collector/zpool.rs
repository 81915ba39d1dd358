//! Pool command sources: declared keys and command lines per source.

use super::{FetchError, Transport};
use crate::metrics::{MetricKey, MetricType::*, RawSection};

/// Keys for `zpool iostat -Hypl`, in output column order.
///
/// If the output column sequence of a future zpool version changes, the
/// field count changes with it and assembly fails with a schema mismatch
/// instead of pairing keys with the wrong values.
pub const IOSTAT_KEYS: &[MetricKey] = &[
    MetricKey::new("Name", Label),
    MetricKey::new("CapLogicUsed", Size),
    MetricKey::new("CapLogicFree", Size),
    MetricKey::new("OpsRead", Label),
    MetricKey::new("OpsWrite", Label),
    MetricKey::new("BwRead", Size),
    MetricKey::new("BwWrite", Size),
    MetricKey::new("TotalwaitRead", Duration),
    MetricKey::new("TotalwaitWrite", Duration),
    MetricKey::new("DiskwaitRead", Duration),
    MetricKey::new("DiskwaitWrite", Duration),
    MetricKey::new("SyncqwaitRead", Duration),
    MetricKey::new("SyncqwaitWrite", Duration),
    MetricKey::new("AsyncqwaitRead", Duration),
    MetricKey::new("AsyncqwaitWrite", Duration),
    MetricKey::new("ScrubWait", Duration),
    MetricKey::new("TrimWait", Duration),
];

/// Keys for `zfs get` values plus the recursive snapshot-usage sum.
pub const ZFS_GET_KEYS: &[MetricKey] = &[
    MetricKey::new("VirtCapUsed", Size),
    MetricKey::new("VirtCapFree", Size),
    MetricKey::new("VirtCompRatio", Label),
    MetricKey::new("CapUsedByChilds", Size),
    MetricKey::new("CapUsedBySnapshots", Size),
];

/// Keys for `zpool list -H -o health,frag`.
pub const ZPOOL_LIST_KEYS: &[MetricKey] = &[
    MetricKey::new("StateHealth", Label),
    MetricKey::new("StateFrag", Label),
];

/// Key for the flattened `zpool status` tail text.
pub const ZPOOL_STATUS_KEYS: &[MetricKey] = &[MetricKey::new("StateText", Label)];

/// The fixed set of command sources for one pool.
///
/// The sampling interval is forwarded to `zpool iostat` as its measurement
/// window; a window of at least one second gives accurate statistics.
pub struct PoolSources {
    pool: String,
    interval_secs: f64,
}

impl PoolSources {
    pub fn new(pool: impl Into<String>, interval_secs: f64) -> Self {
        Self {
            pool: pool.into(),
            interval_secs,
        }
    }

    fn iostat_cmd(&self) -> String {
        format!(
            "zpool iostat -Hypl {} {} 1",
            self.pool, self.interval_secs
        )
    }

    fn zfs_get_cmd(&self) -> String {
        format!(
            "zfs get used,available,compressratio,usedbychildren {} -Hp -d 0 -o value | tr '\\n' ' '",
            self.pool
        )
    }

    // TODO: sum the per-snapshot sizes locally instead of with grep/awk;
    // the remote pipeline is slow and brittle across zfs versions.
    fn snapshots_cmd(&self) -> String {
        format!(
            "zfs get usedbysnapshots {} -Hp -r -o value | grep -v '-' | awk '{{s+=$1}} END {{printf \"%.0f\", s}}'",
            self.pool
        )
    }

    fn zpool_list_cmd(&self) -> String {
        format!("zpool list -H -o health,frag {}", self.pool)
    }

    fn zpool_status_cmd(&self) -> String {
        format!(
            "zpool status {} | sed -n '3,$p' | tr '\\n' ' ' | tr -d '\\011\\012' | sed -e 's/^[ \\t]*//' | sed --regexp-extended 's/ config:.*//g'",
            self.pool
        )
    }

    /// Fetches all sources in declaration order.
    ///
    /// Field splitting mirrors what each command prints: whitespace-separated
    /// fields for iostat / zfs get / zpool list, one flattened text field for
    /// zpool status.
    pub fn collect<T: Transport>(
        &self,
        transport: &mut T,
    ) -> Result<Vec<RawSection>, FetchError> {
        let iostat = split_fields(&transport.run(&self.iostat_cmd())?);

        let mut zfs_get = split_fields(&transport.run(&self.zfs_get_cmd())?);
        zfs_get.extend(split_fields(&transport.run(&self.snapshots_cmd())?));

        let list = split_fields(&transport.run(&self.zpool_list_cmd())?);

        let status_text = transport.run(&self.zpool_status_cmd())?;
        let status = vec![status_text.trim().to_string()];

        Ok(vec![
            RawSection {
                source_id: "zpool-iostat",
                keys: IOSTAT_KEYS,
                values: iostat,
            },
            RawSection {
                source_id: "zfs-get",
                keys: ZFS_GET_KEYS,
                values: zfs_get,
            },
            RawSection {
                source_id: "zpool-list",
                keys: ZPOOL_LIST_KEYS,
                values: list,
            },
            RawSection {
                source_id: "zpool-status",
                keys: ZPOOL_STATUS_KEYS,
                values: status,
            },
        ])
    }
}

fn split_fields(output: &str) -> Vec<String> {
    output.split_whitespace().map(str::to_string).collect()
}
