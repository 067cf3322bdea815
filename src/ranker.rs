//! # 块复杂度排序模块
//!
//! 将图像划分为 8×8 的块，以块内 R、G、B 样本的总体标准差作为复杂度，
//! 并按复杂度降序给出遍历顺序。隐藏和恢复两条流程都从当前像素数据
//! 独立地重新计算这一顺序，因此排序必须完全确定。

use crate::constants::{BLOCK_SIZE, COLOR_CHANNELS};
use crate::pixels::PixelBuffer;

/// 图像中的一个块 (不持有像素数据)。
///
/// `width` 和 `height` 是裁剪到图像边界后的实际尺寸，边缘块可能小于 8×8。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Block {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub complexity: f64,
}

impl Block {
    /// 按行优先顺序遍历块内的像素坐标。
    pub fn pixels(self) -> impl Iterator<Item = (u32, u32)> {
        let Block {
            x, y, width, height, ..
        } = self;
        (y..y + height).flat_map(move |py| (x..x + width).map(move |px| (px, py)))
    }
}

/// 计算以 `(x, y)` 为左上角的块的复杂度。
///
/// 超出图像范围的部分会被跳过；没有任何样本时复杂度为 0。
pub fn block_complexity(buffer: &PixelBuffer, x: u32, y: u32) -> f64 {
    let x_end = x.saturating_add(BLOCK_SIZE).min(buffer.width());
    let y_end = y.saturating_add(BLOCK_SIZE).min(buffer.height());

    let samples: Vec<f64> = (y..y_end)
        .flat_map(|py| (x..x_end).map(move |px| (px, py)))
        .flat_map(|(px, py)| (0..COLOR_CHANNELS).map(move |c| buffer.channel(px, py, c) as f64))
        .collect();

    if samples.is_empty() {
        return 0.0;
    }

    let n = samples.len() as f64;
    let mean = samples.iter().sum::<f64>() / n;
    let variance = samples.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt()
}

/// 按复杂度降序返回图像的所有块。
///
/// 块先按行优先顺序生成，再做稳定排序，因此复杂度相同的块保持扫描顺序。
pub fn rank_blocks(buffer: &PixelBuffer) -> Vec<Block> {
    let (width, height) = (buffer.width(), buffer.height());

    let mut blocks: Vec<Block> = (0..height)
        .step_by(BLOCK_SIZE as usize)
        .flat_map(|y| (0..width).step_by(BLOCK_SIZE as usize).map(move |x| (x, y)))
        .map(|(x, y)| Block {
            x,
            y,
            width: BLOCK_SIZE.min(width - x),
            height: BLOCK_SIZE.min(height - y),
            complexity: block_complexity(buffer, x, y),
        })
        .collect();

    blocks.sort_by(|a, b| b.complexity.total_cmp(&a.complexity));
    blocks
}

/// 按隐写顺序给出每个颜色通道在扁平数据中的下标：
/// 块 → 块内像素 (行优先) → R、G、B。
///
/// # Panics
///
/// 块内任一像素超出 `buffer` 的范围时 panic，见 [`PixelBuffer::offset`]。
pub fn channel_slots<'a>(
    buffer: &'a PixelBuffer,
    blocks: &'a [Block],
) -> impl Iterator<Item = usize> + 'a {
    blocks
        .iter()
        .flat_map(|block| block.pixels())
        .flat_map(move |(x, y)| (0..COLOR_CHANNELS).map(move |c| buffer.offset(x, y, c)))
}
