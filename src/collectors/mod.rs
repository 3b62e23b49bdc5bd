pub mod disks;
pub mod mounts;
pub mod usage;
