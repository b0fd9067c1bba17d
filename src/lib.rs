pub mod batch;
pub mod cli;
pub mod constants;
pub mod error;
pub mod info;
pub mod logger;
pub mod processing;
pub mod scanner;
pub mod sweep;
pub mod utils;

pub use batch::{batch_compress_images, collect_image_files, generate_output_path, is_image_file};
pub use error::{Result, SweepError};
pub use info::show_image_info;
pub use processing::{
    compress_image, determine_output_format, load_image, resize_image, save_compressed,
    CompressionOptions,
};
pub use scanner::{scan, MatchMode, ScanOptions};
pub use sweep::{delete_sequentially, run_sweep, AlwaysConfirm, Confirm, StdinConfirm};
