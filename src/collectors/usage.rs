use std::path::Path;

use anyhow::Result;

/// Byte counts reported by statvfs for one mounted filesystem.
///
/// `total >= used + free` does not necessarily hold exactly (root-reserved
/// blocks); percentages must derive from total and used only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsageSample {
    pub total_bytes: u64,
    pub used_bytes:  u64,
    pub free_bytes:  u64,
}

/// Query usage for a path via statvfs, bounded to that path's filesystem.
pub fn statvfs_usage(path: &Path) -> Result<UsageSample> {
    use nix::sys::statvfs::statvfs;
    let stat = statvfs(path)?;

    let frsize = stat.fragment_size() as u64;
    let total_bytes = stat.blocks() * frsize;
    let free_bytes  = stat.blocks_available() * frsize;
    let used_bytes  = total_bytes.saturating_sub(stat.blocks_free() * frsize);

    Ok(UsageSample { total_bytes, used_bytes, free_bytes })
}
