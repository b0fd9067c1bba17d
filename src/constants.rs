pub const DEFAULT_QUALITY: u8 = 80;
pub const MIN_QUALITY: u8 = 1;
pub const MAX_QUALITY: u8 = 100;

pub const MAX_FILE_SIZE: u64 = 100 * 1024 * 1024;
pub const MAX_IMAGE_DIMENSION: u32 = 30_000;

pub const ZOPFLI_ITERATIONS: u8 = 15;
pub const LIBDEFLATER_HIGH_LEVEL: u8 = 12;
pub const LIBDEFLATER_LOW_LEVEL: u8 = 8;

/// Memory headroom kept free when sizing the batch worker pool.
pub const MIN_AVAILABLE_MEMORY_MIB: u64 = 512;

/// Entry names the sweep scanner never enters or considers.
pub const DEFAULT_EXCLUDES: &[&str] = &["node_modules", ".git", "target"];

pub const PROGRESS_SPINNER_TEMPLATE: &str = "{spinner:.green} {msg}";
