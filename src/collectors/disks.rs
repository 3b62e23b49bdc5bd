use std::collections::HashSet;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};

use crate::collectors::{mounts, usage};
use crate::collectors::mounts::MountEntry;
use crate::collectors::usage::UsageSample;
use crate::models::disk::DiskRecord;

#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("failed to enumerate mounted filesystems: {0}")]
    Enumeration(String),
    #[error("usage query failed for {path}: {reason}")]
    Usage { path: String, reason: String },
}

/// OS partition/usage query seam. The real implementation reads procfs and
/// calls statvfs; tests supply fixture probes.
pub trait DiskProbe {
    fn mounted_partitions(&self) -> Result<Vec<MountEntry>, ProbeError>;
    fn usage(&self, mount_point: &str) -> Result<UsageSample, ProbeError>;
}

/// Probe backed by the live system, rooted at a host prefix.
///
/// Mounts come from `<root>/proc/mounts` and usage queries run against
/// `<root>/<mount_point>`, so a container with the host filesystem mounted
/// at e.g. /host can report on the host's disks.
pub struct SystemProbe {
    root: PathBuf,
}

impl SystemProbe {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn host_path(&self, mount_point: &str) -> PathBuf {
        // PathBuf::join replaces on absolute paths; splice manually.
        self.root.join(mount_point.trim_start_matches('/'))
    }
}

impl Default for SystemProbe {
    fn default() -> Self {
        Self::new("/")
    }
}

impl DiskProbe for SystemProbe {
    fn mounted_partitions(&self) -> Result<Vec<MountEntry>, ProbeError> {
        mounts::read_mounts(&self.root).map_err(|e| ProbeError::Enumeration(e.to_string()))
    }

    fn usage(&self, mount_point: &str) -> Result<UsageSample, ProbeError> {
        usage::statvfs_usage(&self.host_path(mount_point)).map_err(|e| ProbeError::Usage {
            path: mount_point.to_string(),
            reason: e.to_string(),
        })
    }
}

/// Collect one `DiskRecord` per mounted filesystem that survives filtering.
///
/// Skips, in order: entries with an empty mount point, entries whose usage
/// query fails, zero-size filesystems, and types in `ignore_types`
/// (case-sensitive exact match). A failed enumeration yields an empty list.
/// Output preserves mount-table order; each call queries the OS fresh.
pub fn collect(probe: &dyn DiskProbe, ignore_types: &HashSet<String>) -> Vec<DiskRecord> {
    let partitions = match probe.mounted_partitions() {
        Ok(p) => p,
        Err(e) => {
            warn!("{e}");
            return Vec::new();
        }
    };

    let mut records = Vec::new();
    let mut skipped = 0usize;

    for p in &partitions {
        if p.mount_point.is_empty() {
            debug!(device = %p.device, "no mount point, skipping");
            skipped += 1;
            continue;
        }

        let usage = match probe.usage(&p.mount_point) {
            Ok(u) => u,
            Err(e) => {
                warn!("{e}");
                skipped += 1;
                continue;
            }
        };

        if usage.total_bytes == 0 {
            debug!(mount = %p.mount_point, "total size 0, skipping");
            skipped += 1;
            continue;
        }

        if ignore_types.contains(&p.fs_type) {
            debug!(mount = %p.mount_point, fs_type = %p.fs_type, "ignored type, skipping");
            skipped += 1;
            continue;
        }

        records.push(DiskRecord::new(
            &p.device,
            &p.mount_point,
            &p.fs_type,
            usage.total_bytes,
            usage.used_bytes,
            usage.free_bytes,
        ));
    }

    debug!(kept = records.len(), skipped, "disk collection finished");
    records
}

/// Convenience wrapper for the live system.
pub fn collect_system(host_root: &Path, ignore_types: &HashSet<String>) -> Vec<DiskRecord> {
    collect(&SystemProbe::new(host_root), ignore_types)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeProbe {
        partitions: Vec<MountEntry>,
        samples:    Vec<(String, Result<UsageSample, String>)>,
        enumeration_fails: bool,
    }

    impl FakeProbe {
        fn new() -> Self {
            Self { partitions: Vec::new(), samples: Vec::new(), enumeration_fails: false }
        }

        fn with(mut self, device: &str, mount: &str, fs: &str, sample: Result<UsageSample, &str>) -> Self {
            self.partitions.push(MountEntry {
                device:      device.to_string(),
                mount_point: mount.to_string(),
                fs_type:     fs.to_string(),
            });
            if !mount.is_empty() {
                self.samples.push((mount.to_string(), sample.map_err(String::from)));
            }
            self
        }
    }

    impl DiskProbe for FakeProbe {
        fn mounted_partitions(&self) -> Result<Vec<MountEntry>, ProbeError> {
            if self.enumeration_fails {
                return Err(ProbeError::Enumeration("mount table unreadable".into()));
            }
            Ok(self.partitions.clone())
        }

        fn usage(&self, mount_point: &str) -> Result<UsageSample, ProbeError> {
            match self.samples.iter().find(|(m, _)| m == mount_point) {
                Some((_, Ok(s))) => Ok(*s),
                Some((_, Err(reason))) => Err(ProbeError::Usage {
                    path: mount_point.to_string(),
                    reason: reason.clone(),
                }),
                None => panic!("unexpected usage query for {mount_point}"),
            }
        }
    }

    fn sample(total: u64, used: u64) -> UsageSample {
        UsageSample { total_bytes: total, used_bytes: used, free_bytes: total - used }
    }

    fn ignore(types: &[&str]) -> HashSet<String> {
        types.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn valid_partitions_become_records_in_enumeration_order() {
        let probe = FakeProbe::new()
            .with("/dev/sda1", "/", "ext4", Ok(sample(1000, 400)))
            .with("/dev/sdb1", "/data", "xfs", Ok(sample(2000, 500)));

        let records = collect(&probe, &HashSet::new());
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].mount_point, "/");
        assert_eq!(records[1].mount_point, "/data");
        assert_eq!(records[0].used_percent, 40.0);
        assert_eq!(records[0].free_percent, 60.0);
    }

    #[test]
    fn ignored_types_never_appear() {
        let probe = FakeProbe::new()
            .with("/dev/sr0", "/media/cdrom", "iso9660", Ok(sample(700, 700)))
            .with("/dev/sda1", "/", "ext4", Ok(sample(1000, 400)));

        let records = collect(&probe, &ignore(&["iso9660"]));
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].fs_type, "ext4");
    }

    #[test]
    fn ignore_match_is_case_sensitive() {
        let probe = FakeProbe::new()
            .with("/dev/sda1", "/", "ext4", Ok(sample(1000, 400)));

        assert_eq!(collect(&probe, &ignore(&["EXT4"])).len(), 1);
        assert!(collect(&probe, &ignore(&["ext4"])).is_empty());
    }

    #[test]
    fn zero_size_partitions_are_skipped() {
        let probe = FakeProbe::new()
            .with("proc", "/proc", "proc", Ok(sample(0, 0)))
            .with("/dev/sda1", "/", "ext4", Ok(sample(1000, 400)));

        let records = collect(&probe, &HashSet::new());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].mount_point, "/");
    }

    #[test]
    fn empty_mount_points_are_skipped() {
        let probe = FakeProbe::new()
            .with("/dev/sdc", "", "ext4", Ok(sample(1000, 400)))
            .with("/dev/sda1", "/", "ext4", Ok(sample(1000, 400)));

        let records = collect(&probe, &HashSet::new());
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn a_failing_mount_does_not_abort_the_listing() {
        let probe = FakeProbe::new()
            .with("nas:/vol", "/mnt/nas", "nfs", Err("stale file handle"))
            .with("/dev/sda1", "/", "ext4", Ok(sample(1000, 400)));

        let records = collect(&probe, &HashSet::new());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].device, "/dev/sda1");
    }

    #[test]
    fn enumeration_failure_yields_an_empty_list() {
        let mut probe = FakeProbe::new();
        probe.enumeration_fails = true;
        assert!(collect(&probe, &HashSet::new()).is_empty());
    }

    #[test]
    fn all_filtered_out_is_a_valid_empty_result() {
        let probe = FakeProbe::new()
            .with("tmpfs", "/run", "tmpfs", Ok(sample(1000, 10)));
        assert!(collect(&probe, &ignore(&["tmpfs"])).is_empty());
    }

    #[test]
    fn repeat_collection_over_unchanged_state_is_identical() {
        let probe = FakeProbe::new()
            .with("/dev/sda1", "/", "ext4", Ok(sample(1000, 400)))
            .with("/dev/sdb1", "/data", "xfs", Ok(sample(2000, 1)));

        let first = collect(&probe, &HashSet::new());
        let second = collect(&probe, &HashSet::new());
        assert_eq!(first, second);
    }

    #[test]
    fn percentages_derive_from_total_and_used_only() {
        // Reserved blocks: used + free < total.
        let probe = FakeProbe::new().with(
            "/dev/sda1",
            "/",
            "ext4",
            Ok(UsageSample { total_bytes: 1000, used_bytes: 900, free_bytes: 50 }),
        );

        let records = collect(&probe, &HashSet::new());
        assert_eq!(records[0].used_percent, 90.0);
        assert_eq!(records[0].free_percent, 10.0);
        assert_eq!(records[0].free_bytes, 50);
    }

    #[test]
    fn system_probe_splices_mount_points_under_the_root() {
        let probe = SystemProbe::new("/host");
        assert_eq!(probe.host_path("/var/log"), PathBuf::from("/host/var/log"));
        assert_eq!(probe.host_path("/"), PathBuf::from("/host"));
    }
}
