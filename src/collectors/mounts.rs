use std::path::Path;

use anyhow::Result;

/// One row of the kernel mount table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountEntry {
    pub device:      String,
    pub mount_point: String,
    pub fs_type:     String,
}

/// Read the mount table from `<root>/proc/mounts`, preserving kernel order.
///
/// Pseudo filesystems are included; filtering is the caller's policy.
pub fn read_mounts(root: &Path) -> Result<Vec<MountEntry>> {
    let content = std::fs::read_to_string(root.join("proc/mounts"))?;
    Ok(parse_mounts(&content))
}

fn parse_mounts(content: &str) -> Vec<MountEntry> {
    let mut v = Vec::new();
    for line in content.lines() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 3 { continue; }
        v.push(MountEntry {
            device:      unescape_octal(fields[0]),
            mount_point: unescape_octal(fields[1]),
            fs_type:     fields[2].to_string(),
        });
    }
    v
}

/// The kernel escapes space, tab, newline and backslash in mount paths
/// as three-digit octal sequences ("\040" for space).
fn unescape_octal(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\\' && i + 3 < bytes.len()
            && bytes[i + 1..i + 4].iter().all(|b| (b'0'..=b'7').contains(b))
        {
            let code = (bytes[i + 1] - b'0') as u32 * 64
                + (bytes[i + 2] - b'0') as u32 * 8
                + (bytes[i + 3] - b'0') as u32;
            out.push(code as u8);
            i += 4;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}
