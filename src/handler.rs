//! # 命令处理逻辑模块
//!
//! 包含处理 `hide`、`recover` 和 `capacity` 子命令的高级业务逻辑。
//! 本模块负责图像文件的解码与编码、文件 I/O、调用核心隐写算法以及向用户报告结果。

use crate::capacity::max_payload_chars;
use crate::cli::{CapacityArgs, HideArgs, RecoverArgs};
use crate::error::{CapacityError, HideError};
use crate::pixels::PixelBuffer;
use crate::steganography::{hide, recover, verify};
use anyhow::{Context, Result, anyhow};
use colored::Colorize;
use image::{RgbImage, RgbaImage};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// 处理 'Hide' 命令的执行逻辑。
///
/// 负责读取图像和文本文件、调用隐写核心函数按块复杂度顺序写入文本，
/// 校验写入结果能否被恢复，最后将结果写入目标图像文件。
///
/// # Arguments
///
/// * `args` - 包含输入/输出路径与覆盖选项的 `HideArgs` 结构体。
///
/// # Errors
///
/// 如果发生以下任一情况，将返回错误：
/// * 目标路径是有损格式 (JPEG)，或目标文件已存在且未指定 `--force`。
/// * 无法读取输入的图像或文本文件。
/// * 文本包含码点大于 255 的字符。
/// * 图像没有足够的空间来隐藏文本。
/// * 无法写入到目标图像文件。
pub fn handle_hide(args: HideArgs) -> Result<()> {
    let dest = args
        .dest
        .clone()
        .unwrap_or_else(|| default_path(&args.image, "doctored_", None));

    ensure_lossless(&dest)?;
    ensure_writable(&dest, args.force)?;

    let mut pixels = load_pixels(&args.image)?;

    let text = fs::read_to_string(&args.text).with_context(|| {
        format!(
            "Unable to read text file: {}",
            args.text.to_string_lossy().red().bold()
        )
    })?;

    let written = hide(&mut pixels, &text).map_err(|err| match err {
        HideError::Capacity(CapacityError::MessageTooLarge {
            required,
            available,
        }) => anyhow!(
            "Not enough space in the image to hide the text. \nRequired: {} bits, Available: {} bits",
            required.to_string().red().bold(),
            available.to_string().green().bold()
        ),
        HideError::Encoding(e) => anyhow::Error::new(e).context(format!(
            "Unable to hide the text from {}. \nOnly single-byte characters (code points 0-255) are supported.",
            args.text.to_string_lossy().red().bold()
        )),
    })?;

    info!(
        written,
        chars = text.chars().count(),
        "payload embedded"
    );

    if !verify(&pixels, &text) {
        warn!(
            "the embedded text could not be read back from {}; nearly equal blocks changed order",
            dest.display()
        );
    }

    save_pixels(pixels, &dest)?;

    println!(
        "The text has been successfully hidden and saved: {}",
        dest.to_string_lossy().green().bold()
    );

    Ok(())
}

/// 处理 'Recover' 命令的执行逻辑。
///
/// 负责读取经过隐写的图像文件、按块复杂度顺序读取最低位直到结束标记，
/// 最后将恢复的文本内容写入目标文本文件。
///
/// # Arguments
///
/// * `args` - 包含输入/输出路径与覆盖选项的 `RecoverArgs` 结构体。
///
/// # Errors
///
/// 如果发生以下任一情况，将返回错误：
/// * 目标文件已存在且未指定 `--force`。
/// * 无法读取输入的图像文件。
/// * 图像中找不到结束标记。
/// * 无法写入到目标文本文件。
pub fn handle_recover(args: RecoverArgs) -> Result<()> {
    let dest = args
        .text
        .clone()
        .unwrap_or_else(|| default_path(&args.image, "recovered_", Some("txt")));

    ensure_writable(&dest, args.force)?;

    let pixels = load_pixels(&args.image)?;

    let text = recover(&pixels).with_context(|| {
        format!(
            "Failed to recover hidden text from '{}'. \nThe image may not contain a hidden message or was saved in a lossy format.",
            args.image.to_string_lossy().red().bold()
        )
    })?;

    info!(chars = text.chars().count(), "payload recovered");

    fs::write(&dest, text).with_context(|| {
        format!(
            "Unable to write to target text file: {}",
            dest.to_string_lossy().red().bold()
        )
    })?;

    println!(
        "The text has been successfully recovered and saved: {}",
        dest.to_string_lossy().green().bold()
    );
    Ok(())
}

/// 'Capacity' 命令报告的图像容量信息。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapacityReport {
    pub width: u32,
    pub height: u32,
    pub channels: usize,
    pub capacity_bits: usize,
    pub max_chars: usize,
}

/// 处理 'Capacity' 命令：打印并返回图像尺寸、可用比特数以及最多可隐藏的字符数。
pub fn handle_capacity(args: CapacityArgs) -> Result<CapacityReport> {
    let pixels = load_pixels(&args.image)?;

    let report = CapacityReport {
        width: pixels.width(),
        height: pixels.height(),
        channels: pixels.channels(),
        capacity_bits: pixels.capacity_bits(),
        max_chars: max_payload_chars(&pixels),
    };

    println!(
        "Image: {} ({}x{}, {} channels)",
        args.image.to_string_lossy().green().bold(),
        report.width,
        report.height,
        report.channels
    );
    println!(
        "Capacity: {} bits, up to {} characters",
        report.capacity_bits.to_string().green().bold(),
        report.max_chars.to_string().green().bold()
    );

    Ok(report)
}

/// 解码图像文件。带 Alpha 通道的图像保留为 RGBA，其余转换为 RGB。
fn load_pixels(path: &Path) -> Result<PixelBuffer> {
    let img = image::open(path).with_context(|| {
        format!(
            "Unable to read image file: {}",
            path.to_string_lossy().red().bold()
        )
    })?;

    let (width, height) = (img.width(), img.height());
    let (channels, raw) = if img.color().has_alpha() {
        (4, img.into_rgba8().into_raw())
    } else {
        (3, img.into_rgb8().into_raw())
    };

    debug!(width, height, channels, path = %path.display(), "image decoded");

    PixelBuffer::new(width, height, channels, raw).with_context(|| {
        format!(
            "Decoded pixel data of {} has an unexpected layout",
            path.to_string_lossy().red().bold()
        )
    })
}

fn save_pixels(pixels: PixelBuffer, path: &Path) -> Result<()> {
    let (width, height, channels) = (pixels.width(), pixels.height(), pixels.channels());
    let raw = pixels.into_raw();

    let saved = match channels {
        4 => RgbaImage::from_raw(width, height, raw)
            .context("RGBA pixel buffer does not match the image dimensions")?
            .save(path),
        _ => RgbImage::from_raw(width, height, raw)
            .context("RGB pixel buffer does not match the image dimensions")?
            .save(path),
    };

    saved.with_context(|| {
        format!(
            "Unable to write to target image file: {}",
            path.to_string_lossy().red().bold()
        )
    })
}

/// 在输入文件同目录下生成默认输出路径，例如 `doctored_original.png` 或 `recovered_original.txt`。
fn default_path(input: &Path, prefix: &str, extension: Option<&str>) -> PathBuf {
    let name = match extension {
        Some(ext) => {
            let stem = input.file_stem().unwrap_or_default().to_string_lossy();
            format!("{prefix}{stem}.{ext}")
        }
        None => {
            let file_name = input.file_name().unwrap_or_default().to_string_lossy();
            format!("{prefix}{file_name}")
        }
    };
    input.with_file_name(name)
}

fn ensure_writable(path: &Path, force: bool) -> Result<()> {
    anyhow::ensure!(
        force || !path.exists(),
        "Output file already exists: {} \nUse --force to overwrite it.",
        path.to_string_lossy().red().bold()
    );
    Ok(())
}

/// JPEG 会破坏最低位，拒绝以有损格式保存隐写结果。
fn ensure_lossless(path: &Path) -> Result<()> {
    let ext = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    anyhow::ensure!(
        !matches!(ext.as_str(), "jpg" | "jpeg"),
        "JPEG is a lossy format and will destroy the hidden text: {} \nPlease use PNG, BMP, TIFF, WebP or QOI instead.",
        path.to_string_lossy().red().bold()
    );
    Ok(())
}
