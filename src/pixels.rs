//! # 像素缓冲区模块
//!
//! `PixelBuffer` 是隐写核心唯一操作的图像表示：一段按行优先排列、
//! 每通道 8 bit 的扁平字节序列。图像文件的解码与编码由调用方负责。

use crate::constants::COLOR_CHANNELS;
use crate::error::LayoutError;

/// 已解码的 RGB(A) 像素缓冲区。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    channels: usize,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// 用已解码的像素数据创建缓冲区。
    ///
    /// # Errors
    ///
    /// * 通道数少于 3 时返回 [`LayoutError::TooFewChannels`]。
    /// * `width * height * channels` 溢出 `usize` 时返回 [`LayoutError::TooLarge`]。
    /// * `data` 的长度不等于 `width * height * channels` 时返回
    ///   [`LayoutError::LengthMismatch`]。
    pub fn new(width: u32, height: u32, channels: usize, data: Vec<u8>) -> Result<Self, LayoutError> {
        if channels < COLOR_CHANNELS {
            return Err(LayoutError::TooFewChannels(channels));
        }

        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|pixels| pixels.checked_mul(channels))
            .ok_or(LayoutError::TooLarge {
                width,
                height,
                channels,
            })?;
        if data.len() != expected {
            return Err(LayoutError::LengthMismatch {
                expected,
                actual: data.len(),
            });
        }

        Ok(Self {
            width,
            height,
            channels,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    /// 隐写容量 (bits)：每个像素的 R、G、B 通道各承载 1 bit。
    pub fn capacity_bits(&self) -> usize {
        self.width as usize * self.height as usize * COLOR_CHANNELS
    }

    /// 返回 `(x, y)` 处第 `channel` 个通道在扁平数据中的下标。
    ///
    /// # Panics
    ///
    /// 坐标或通道越界属于编程错误，会直接 panic。
    pub fn offset(&self, x: u32, y: u32, channel: usize) -> usize {
        assert!(
            x < self.width && y < self.height,
            "pixel ({x}, {y}) is outside a {}x{} image",
            self.width,
            self.height
        );
        assert!(
            channel < self.channels,
            "channel {channel} is outside a {}-channel image",
            self.channels
        );

        (y as usize * self.width as usize + x as usize) * self.channels + channel
    }

    pub fn channel(&self, x: u32, y: u32, channel: usize) -> u8 {
        self.data[self.offset(x, y, channel)]
    }

    pub fn set_channel(&mut self, x: u32, y: u32, channel: usize, value: u8) {
        let idx = self.offset(x, y, channel);
        self.data[idx] = value;
    }

    pub(crate) fn raw_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }
}
