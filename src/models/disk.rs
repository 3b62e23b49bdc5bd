use serde::Serialize;

use crate::util::human::fmt_bytes;

/// One mounted filesystem with live usage data, ready for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiskRecord {
    pub device:      String,
    pub mount_point: String,
    pub fs_type:     String,
    pub size_bytes:  u64,
    pub used_bytes:  u64,
    pub free_bytes:  u64,
    pub human_size:  String,
    pub human_used:  String,
    pub human_free:  String,
    pub used_percent: f64,
    pub free_percent: f64,
}

impl DiskRecord {
    /// Builds a record from raw byte counts. `total` must be nonzero;
    /// the collector filters zero-size mounts before construction.
    pub fn new(device: &str, mount_point: &str, fs_type: &str, total: u64, used: u64, free: u64) -> Self {
        let used_percent = used as f64 / total as f64 * 100.0;
        Self {
            device:      device.to_string(),
            mount_point: mount_point.to_string(),
            fs_type:     fs_type.to_string(),
            size_bytes:  total,
            used_bytes:  used,
            free_bytes:  free,
            human_size:  fmt_bytes(total),
            human_used:  fmt_bytes(used),
            human_free:  fmt_bytes(free),
            used_percent,
            free_percent: 100.0 - used_percent,
        }
    }

    /// Returns the short device name ("sda1" from "/dev/sda1").
    pub fn short_device(&self) -> &str {
        self.device.trim_start_matches("/dev/").trim_start_matches("mapper/")
    }
}
