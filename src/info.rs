use crate::error::{Result, SweepError};
use crate::utils::format_bytes;
use image::{GenericImageView, ImageReader};
use std::fs;
use std::path::Path;

/// The `info` subcommand: dimensions, format, size, and compression
/// suggestions for one image.
pub fn show_image_info(input_path: &Path) -> Result<()> {
    if !input_path.exists() {
        return Err(SweepError::FileNotFound(input_path.to_path_buf()));
    }

    println!("📊 Analyzing image: {}", input_path.display());

    let reader = ImageReader::open(input_path)?;
    let format = reader.format();
    let img = reader.decode()?;
    let metadata = fs::metadata(input_path)?;

    println!("📋 Basic Information:");
    println!("  📁 File: {}", input_path.display());
    println!("  📏 Dimensions: {}x{} pixels", img.width(), img.height());
    println!("  📦 File size: {}", format_bytes(metadata.len()));
    println!("  🎨 Color type: {:?}", img.color());
    if let Some(format) = format {
        println!("  🎭 Image format: {:?}", format);
    }

    let total_pixels = img.width() as u64 * img.height() as u64;
    let aspect_ratio = img.width() as f64 / img.height() as f64;
    println!("  🔢 Total pixels: {}", total_pixels);
    println!("  📐 Aspect ratio: {:.2}:1", aspect_ratio);

    // 按文件大小和尺寸给出压缩建议
    println!("\n💡 Compression Suggestions:");

    if metadata.len() > 5 * 1024 * 1024 {
        println!("  🎯 Large file (>5MB): Consider high compression (quality 60-80)");
    } else if metadata.len() > 1024 * 1024 {
        println!("  🎯 Medium file (1-5MB): Consider medium compression (quality 70-85)");
    } else {
        println!("  🎯 Small file (<1MB): Consider light compression (quality 85-95)");
    }

    if img.width() > 1920 || img.height() > 1080 {
        println!("  📏 Large dimensions: Consider resizing to 1920x1080 or smaller");
    } else if img.width() > 1280 || img.height() > 720 {
        println!("  📏 HD dimensions: Consider resizing to 1280x720 for web use");
    }

    match format {
        Some(image::ImageFormat::Png) => {
            println!("  🎭 PNG format: oxipng optimization is applied on compress");
        }
        Some(image::ImageFormat::Jpeg) => {
            println!("  🎭 JPEG format: Adjust quality setting for size/quality balance");
        }
        Some(image::ImageFormat::WebP) => {
            println!("  🎭 WebP format: Already well compressed, consider quality adjustment");
        }
        _ => {
            println!("  🎭 Other format: Consider converting to JPEG/WebP for better compression");
        }
    }

    Ok(())
}
