use crate::constants::MIN_AVAILABLE_MEMORY_MIB;
use crate::error::{Result, SweepError};
use crate::processing::{load_image, resize_image, save_compressed, CompressionOptions};
use crate::utils::{compression_ratio, format_bytes};
use crate::{info, verbose, warn};
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Instant;
use sysinfo::{MemoryRefreshKind, RefreshKind, System};
use walkdir::WalkDir;

pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            matches!(
                ext.to_lowercase().as_str(),
                "jpg" | "jpeg"
                    | "png"
                    | "webp"
                    | "bmp"
                    | "tiff"
                    | "gif"
                    | "avif"
                    | "heic"
                    | "heif"
                    | "jxl"
            )
        })
        .unwrap_or(false)
}

/// Collect image files from a file path, a directory, or a glob pattern.
pub fn collect_image_files(input: &str, recursive: bool) -> Result<Vec<PathBuf>> {
    let mut image_files = Vec::new();
    let input_path = Path::new(input);

    if input_path.is_file() {
        image_files.push(input_path.canonicalize()?);
    } else if input_path.is_dir() {
        let walker = if recursive {
            WalkDir::new(input_path).into_iter()
        } else {
            WalkDir::new(input_path).max_depth(1).into_iter()
        };

        // 隐藏目录不进入, 但根目录本身不算
        for entry in walker.filter_entry(|e| {
            e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.')
        }) {
            let entry = entry?;
            let path = entry.path();
            if path.is_file() && is_image_file(path) {
                if let Ok(canonical) = path.canonicalize() {
                    image_files.push(canonical);
                }
            }
        }
        image_files.sort();
    } else if let Ok(pattern) = glob(input) {
        for entry in pattern.flatten() {
            if entry.is_file() && is_image_file(&entry) {
                if let Ok(canonical) = entry.canonicalize() {
                    image_files.push(canonical);
                }
            }
        }
        image_files.sort();
    } else {
        return Err(SweepError::NoImageFilesFound(input.to_string()));
    }

    Ok(image_files)
}

/// Output path for one input: same stem, extension from the format override
/// or the original file.
pub fn generate_output_path(
    input_path: &Path,
    output_dir: &Path,
    format: &Option<String>,
) -> Result<PathBuf> {
    let file_stem = input_path
        .file_stem()
        .ok_or_else(|| SweepError::UnsupportedFormat("Invalid file name".to_string()))?;

    let extension = if let Some(fmt) = format {
        match fmt.to_lowercase().as_str() {
            "jpeg" | "jpg" => "jpg",
            "png" => "png",
            "webp" => "webp",
            "avif" => "avif",
            _ => return Err(SweepError::UnsupportedFormat(fmt.clone())),
        }
        .to_string()
    } else {
        input_path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("jpg")
            .to_string()
    };

    let output_filename = format!("{}.{}", file_stem.to_string_lossy(), extension);
    Ok(output_dir.join(output_filename))
}

fn available_memory_mib() -> u64 {
    let mut sys =
        System::new_with_specifics(RefreshKind::new().with_memory(MemoryRefreshKind::new()));
    sys.refresh_memory();
    sys.available_memory() / (1024 * 1024)
}

/// Cap the worker count so decoded images fit in available memory, keeping
/// `MIN_AVAILABLE_MEMORY_MIB` of headroom. Decode footprint is estimated at
/// 4x file size.
fn pick_parallelism(files: &[PathBuf], requested: Option<usize>) -> usize {
    let baseline = requested
        .unwrap_or_else(num_cpus::get)
        .clamp(1, files.len().max(1));

    let total_bytes: u64 = files
        .iter()
        .filter_map(|p| fs::metadata(p).ok())
        .map(|m| m.len())
        .sum();
    let avg_mib = ((total_bytes / files.len().max(1) as u64) * 4 / (1024 * 1024)).max(1);

    let budget = available_memory_mib().saturating_sub(MIN_AVAILABLE_MEMORY_MIB);
    let mem_cap = (budget / avg_mib).clamp(1, baseline as u64) as usize;

    baseline.min(mem_cap)
}

fn compress_one(
    input_path: &Path,
    output_dir: &Path,
    options: &CompressionOptions,
) -> Result<(u64, u64)> {
    let output_path = generate_output_path(input_path, output_dir, &options.format)?;

    let (mut img, original_size) = load_image(input_path)?;
    resize_image(&mut img, options);
    let compressed_size = save_compressed(&img, &output_path, options)?;

    Ok((original_size, compressed_size))
}

/// The `batch` subcommand: compress every collected image in parallel and
/// report aggregate totals. Per-file failures are reported and counted but
/// do not stop the batch.
pub fn batch_compress_images(
    input: &str,
    output: &Path,
    options: &CompressionOptions,
    threads: Option<usize>,
    recursive: bool,
) -> Result<()> {
    info!("🚀 Starting batch compression...");
    info!("📁 Input: {}", input);
    info!("📁 Output: {}", output.display());

    let start_time = Instant::now();

    let image_files = collect_image_files(input, recursive)?;
    let total_files = image_files.len();

    if total_files == 0 {
        warn!("No image files found in the input path");
        return Ok(());
    }

    info!("📊 Found {} image files to process", total_files);

    fs::create_dir_all(output)
        .map_err(|_| SweepError::DirectoryCreationFailed(output.to_path_buf()))?;

    let workers = pick_parallelism(&image_files, threads);
    verbose!(
        "Using {} parallel threads ({} MiB memory available)",
        workers,
        available_memory_mib()
    );

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build()
        .expect("Failed to build Rayon thread pool");

    let progress = ProgressBar::new(total_files as u64);
    progress.set_style(ProgressStyle::default_bar());

    let processed_count = AtomicUsize::new(0);
    let total_size_before = AtomicU64::new(0);
    let total_size_after = AtomicU64::new(0);

    let results: Vec<Result<()>> = pool.install(|| {
        image_files
            .par_iter()
            .map(|input_path| {
                match compress_one(input_path, output, options) {
                    Ok((before, after)) => {
                        total_size_before.fetch_add(before, Ordering::Relaxed);
                        total_size_after.fetch_add(after, Ordering::Relaxed);
                        processed_count.fetch_add(1, Ordering::Relaxed);
                        progress.inc(1);
                        Ok(())
                    }
                    Err(e) => {
                        crate::error!("Failed to process {}: {}", input_path.display(), e);
                        progress.inc(1);
                        Err(e)
                    }
                }
            })
            .collect()
    });

    progress.finish_with_message("✅ Batch compression complete");

    let total_before = total_size_before.load(Ordering::Relaxed);
    let total_after = total_size_after.load(Ordering::Relaxed);
    let elapsed = start_time.elapsed();

    info!("\n📊 Batch Compression Summary:");
    info!(
        "  📁 Total files processed: {}",
        processed_count.load(Ordering::Relaxed)
    );
    info!("  📊 Total original size: {}", format_bytes(total_before));
    info!("  📊 Total compressed size: {}", format_bytes(total_after));
    info!(
        "  🎯 Overall compression ratio: {:.1}%",
        compression_ratio(total_before, total_after)
    );
    info!("  ⏱️  Total time: {:?}", elapsed);
    info!(
        "  ⚡ Average speed: {:.2} files/second",
        processed_count.load(Ordering::Relaxed) as f64 / elapsed.as_secs_f64()
    );

    let failed_count = results.iter().filter(|r| r.is_err()).count();
    if failed_count > 0 {
        warn!("Failed files: {}", failed_count);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_is_image_file() {
        assert!(is_image_file(Path::new("test.jpg")));
        assert!(is_image_file(Path::new("test.jpeg")));
        assert!(is_image_file(Path::new("test.png")));
        assert!(is_image_file(Path::new("test.webp")));
        assert!(is_image_file(Path::new("test.gif")));
        assert!(is_image_file(Path::new("test.JPG")));

        assert!(!is_image_file(Path::new("test.txt")));
        assert!(!is_image_file(Path::new("test")));
    }

    #[test]
    fn test_generate_output_path() {
        let result =
            generate_output_path(Path::new("test.jpg"), Path::new("/tmp/output"), &None).unwrap();
        assert_eq!(result, PathBuf::from("/tmp/output/test.jpg"));
    }

    #[test]
    fn test_generate_output_path_with_format_override() {
        let result = generate_output_path(
            Path::new("test.jpg"),
            Path::new("/tmp/output"),
            &Some("webp".to_string()),
        )
        .unwrap();
        assert_eq!(result, PathBuf::from("/tmp/output/test.webp"));
    }

    #[test]
    fn test_generate_output_path_unsupported_format() {
        let result = generate_output_path(
            Path::new("test.jpg"),
            Path::new("/tmp/output"),
            &Some("bogus".to_string()),
        );
        assert!(matches!(result, Err(SweepError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_collect_image_files_single_file() {
        let temp = TempDir::new().unwrap();
        let test_file = temp.path().join("test.jpg");
        File::create(&test_file)
            .unwrap()
            .write_all(b"fake image data")
            .unwrap();

        let files = collect_image_files(&test_file.to_string_lossy(), false).unwrap();
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn test_collect_image_files_directory() {
        let temp = TempDir::new().unwrap();
        File::create(temp.path().join("test1.jpg")).unwrap();
        File::create(temp.path().join("test2.png")).unwrap();
        File::create(temp.path().join("not_image.txt")).unwrap();

        let files = collect_image_files(&temp.path().to_string_lossy(), false).unwrap();
        assert_eq!(files.len(), 2);
    }

    #[test]
    fn test_collect_image_files_recursion_flag() {
        let temp = TempDir::new().unwrap();
        let subdir = temp.path().join("subdir");
        std::fs::create_dir(&subdir).unwrap();
        File::create(temp.path().join("top.jpg")).unwrap();
        File::create(subdir.join("nested.png")).unwrap();

        let flat = collect_image_files(&temp.path().to_string_lossy(), false).unwrap();
        assert_eq!(flat.len(), 1);

        let deep = collect_image_files(&temp.path().to_string_lossy(), true).unwrap();
        assert_eq!(deep.len(), 2);
    }

    #[test]
    fn test_collect_image_files_skips_hidden_dirs() {
        let temp = TempDir::new().unwrap();
        let hidden = temp.path().join(".cache");
        std::fs::create_dir(&hidden).unwrap();
        File::create(hidden.join("stale.jpg")).unwrap();
        File::create(temp.path().join("visible.jpg")).unwrap();

        let files = collect_image_files(&temp.path().to_string_lossy(), true).unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("visible.jpg"));
    }

    #[test]
    fn test_collect_image_files_glob_pattern() {
        let temp = TempDir::new().unwrap();
        File::create(temp.path().join("test1.jpg")).unwrap();
        File::create(temp.path().join("test2.png")).unwrap();
        File::create(temp.path().join("other.txt")).unwrap();

        let pattern = format!("{}/*.jpg", temp.path().to_string_lossy());
        let files = collect_image_files(&pattern, false).unwrap();
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn test_pick_parallelism_bounded_by_files() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("one.jpg");
        File::create(&file).unwrap().write_all(&[0u8; 64]).unwrap();

        let workers = pick_parallelism(&[file], Some(16));
        assert_eq!(workers, 1);
    }

    #[test]
    fn test_pick_parallelism_at_least_one() {
        let temp = TempDir::new().unwrap();
        let mut files = Vec::new();
        for i in 0..4 {
            let f = temp.path().join(format!("f{}.jpg", i));
            File::create(&f).unwrap().write_all(&[0u8; 64]).unwrap();
            files.push(f);
        }

        assert!(pick_parallelism(&files, None) >= 1);
        assert!(pick_parallelism(&files, Some(2)) <= 2);
    }
}
