use crate::constants::{
    DEFAULT_QUALITY, LIBDEFLATER_HIGH_LEVEL, LIBDEFLATER_LOW_LEVEL, MAX_FILE_SIZE,
    MAX_IMAGE_DIMENSION, MAX_QUALITY, MIN_QUALITY, ZOPFLI_ITERATIONS,
};
use crate::error::{Result, SweepError};
use crate::utils::{compression_ratio, create_progress_spinner, format_bytes};
use crate::{info, warn};
use image::{DynamicImage, GenericImageView, ImageFormat, ImageReader};
use oxipng::{Deflaters, InFile, Options, OutFile};
use std::fs;
use std::num::NonZeroU8;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct CompressionOptions {
    pub quality: u8,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub format: Option<String>,
}

impl CompressionOptions {
    pub fn new(
        quality: Option<u8>,
        width: Option<u32>,
        height: Option<u32>,
        format: Option<String>,
    ) -> Result<Self> {
        let quality = quality.unwrap_or(DEFAULT_QUALITY);
        if !(MIN_QUALITY..=MAX_QUALITY).contains(&quality) {
            return Err(SweepError::InvalidQuality(quality));
        }

        Ok(Self {
            quality,
            width,
            height,
            format,
        })
    }
}

/// Load an image, returning it together with the source file size.
///
/// File size and pixel dimensions are bounded before decoding so a
/// malformed input cannot exhaust memory.
pub fn load_image(input_path: &Path) -> Result<(DynamicImage, u64)> {
    if !input_path.exists() {
        return Err(SweepError::FileNotFound(input_path.to_path_buf()));
    }

    let canonical = input_path
        .canonicalize()
        .map_err(|_| SweepError::FileNotFound(input_path.to_path_buf()))?;

    let file_size = fs::metadata(&canonical)?.len();
    if file_size > MAX_FILE_SIZE {
        return Err(SweepError::FileTooLarge(file_size, MAX_FILE_SIZE));
    }

    let img = ImageReader::open(&canonical)?.decode()?;

    let (width, height) = img.dimensions();
    if width > MAX_IMAGE_DIMENSION || height > MAX_IMAGE_DIMENSION {
        return Err(SweepError::InvalidDimensions(
            width,
            height,
            MAX_IMAGE_DIMENSION,
        ));
    }

    Ok((img, file_size))
}

/// Resize to the requested width and/or height. Each axis is applied
/// independently, leaving the other unchanged.
pub fn resize_image(img: &mut DynamicImage, options: &CompressionOptions) {
    if let Some(w) = options.width.filter(|&w| w > 0 && w != img.width()) {
        *img = img.resize_exact(w, img.height(), image::imageops::FilterType::Lanczos3);
    }

    if let Some(h) = options.height.filter(|&h| h > 0 && h != img.height()) {
        *img = img.resize_exact(img.width(), h, image::imageops::FilterType::Lanczos3);
    }
}

/// Pick the output format: explicit `--format` wins, then the output file
/// extension, then JPEG.
pub fn determine_output_format(output: &Path, format: &Option<String>) -> Result<ImageFormat> {
    let ext_owned;
    let name = if let Some(fmt) = format {
        fmt.as_str()
    } else if let Some(ext) = output.extension().and_then(|ext| ext.to_str()) {
        ext_owned = ext.to_lowercase();
        ext_owned.as_str()
    } else {
        return Ok(ImageFormat::Jpeg);
    };

    match name.to_lowercase().as_str() {
        "jpeg" | "jpg" => Ok(ImageFormat::Jpeg),
        "png" => Ok(ImageFormat::Png),
        "webp" => Ok(ImageFormat::WebP),
        "avif" => Ok(ImageFormat::Avif),
        "heic" | "heif" | "jxl" | "jpegxl" => Err(SweepError::UnsupportedFormat(format!(
            "{} format is not yet supported in this version. Use AVIF for modern compression",
            name
        ))),
        // 未知扩展名按 JPEG 处理, 显式 --format 写错则报错
        other => {
            if format.is_some() {
                Err(SweepError::UnsupportedFormat(other.to_string()))
            } else {
                Ok(ImageFormat::Jpeg)
            }
        }
    }
}

/// Encode `img` to `output` and return the written file size.
pub fn save_compressed(
    img: &DynamicImage,
    output: &Path,
    options: &CompressionOptions,
) -> Result<u64> {
    let format = determine_output_format(output, &options.format)?;

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|_| SweepError::DirectoryCreationFailed(parent.to_path_buf()))?;
    }

    match format {
        ImageFormat::Jpeg | ImageFormat::WebP | ImageFormat::Avif => {
            img.save_with_format(output, format)?;
        }
        ImageFormat::Png => {
            save_optimized_png(img, output, options.quality)?;
        }
        _ => {
            return Err(SweepError::UnsupportedFormat(format!("{:?}", format)));
        }
    }

    Ok(fs::metadata(output)?.len())
}

/// PNG output goes through oxipng. The intermediate encode lands in a
/// tempfile next to the output so the optimize step stays on one filesystem.
fn save_optimized_png(img: &DynamicImage, output: &Path, quality: u8) -> Result<()> {
    let dir: PathBuf = output
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));

    let temp = tempfile::Builder::new()
        .prefix(".img-sweep-")
        .suffix(".png")
        .tempfile_in(&dir)?;
    img.save_with_format(temp.path(), ImageFormat::Png)?;

    let mut oxipng_options = Options::from_preset(4);
    oxipng_options.force = true;

    // 质量分数映射到压缩级别
    if quality >= 90 {
        oxipng_options.deflate = Deflaters::Zopfli {
            iterations: NonZeroU8::new(ZOPFLI_ITERATIONS).unwrap(),
        };
    } else if quality >= 70 {
        oxipng_options.deflate = Deflaters::Libdeflater {
            compression: LIBDEFLATER_HIGH_LEVEL,
        };
    } else {
        oxipng_options.deflate = Deflaters::Libdeflater {
            compression: LIBDEFLATER_LOW_LEVEL,
        };
    }

    let input = InFile::Path(temp.path().to_path_buf());
    let out = OutFile::Path {
        path: Some(output.to_path_buf()),
        preserve_attrs: false,
    };
    oxipng::optimize(&input, &out, &oxipng_options)
        .map_err(|e| SweepError::PngOptimization(e.to_string()))?;

    Ok(())
}

/// The `compress` subcommand: one file in, one file out.
pub fn compress_image(input: &Path, output: &Path, options: &CompressionOptions) -> Result<()> {
    info!("🗜️  Compressing image: {}", input.display());
    info!("📁 Output: {}", output.display());

    let pb = create_progress_spinner("Loading image...");
    let (mut img, original_size) = load_image(input)?;
    pb.finish_with_message("✅ Image loaded");

    info!(
        "📊 Original size: {} ({}x{})",
        format_bytes(original_size),
        img.width(),
        img.height()
    );

    resize_image(&mut img, options);

    let pb = create_progress_spinner("Saving compressed image...");
    let compressed_size = save_compressed(&img, output, options)?;
    pb.finish_with_message("✅ Compression complete");

    let ratio = compression_ratio(original_size, compressed_size);
    info!("📈 Compressed size: {}", format_bytes(compressed_size));
    info!("🎯 Compression ratio: {:.1}%", ratio);

    if ratio > 0.0 {
        info!("✅ Successfully reduced file size by {:.1}%", ratio);
    } else {
        warn!("File size increased by {:.1}%", ratio.abs());
    }

    Ok(())
}
