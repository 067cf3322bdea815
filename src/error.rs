//! # 错误类型模块
//!
//! 隐写核心返回的所有类型化错误。所有错误都在修改像素之前同步返回，
//! 命令行层再用 `anyhow` 为其附加上下文。

use thiserror::Error;

/// 像素缓冲区的布局不合法。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    #[error("Pixel buffer needs at least 3 channels, got {0}")]
    TooFewChannels(usize),

    #[error("Pixel buffer of {width}x{height} with {channels} channels does not fit in memory")]
    TooLarge {
        width: u32,
        height: u32,
        channels: usize,
    },

    #[error("Pixel buffer length mismatch: expected {expected} bytes, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },
}

/// 文本无法转换为比特流。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodingError {
    #[error("Character {character:?} at index {index} is outside the single-byte range (0-255)")]
    NonByteCharacter { character: char, index: usize },
}

/// 比特流超出图像的隐写容量。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CapacityError {
    #[error("Not enough space in the image to hide the text. Required: {required} bits, Available: {available} bits")]
    MessageTooLarge { required: usize, available: usize },
}

/// 图像中找不到结束标记。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("No hidden message found or data corrupted")]
    NoHiddenMessage,
}

/// 隐写流程 (`hide`) 可能返回的错误。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HideError {
    #[error(transparent)]
    Encoding(#[from] EncodingError),

    #[error(transparent)]
    Capacity(#[from] CapacityError),
}
