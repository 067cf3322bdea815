//! # 容量检查模块

use crate::constants::{BITS_PER_CHAR, TERMINATOR_BITS};
use crate::error::CapacityError;
use crate::pixels::PixelBuffer;

/// 在修改任何像素之前检查比特流能否放入图像。
///
/// # Errors
///
/// `bitstream_len` 大于 `width * height * 3` 时返回
/// [`CapacityError::MessageTooLarge`]。
pub fn check_capacity(buffer: &PixelBuffer, bitstream_len: usize) -> Result<(), CapacityError> {
    let available = buffer.capacity_bits();
    if bitstream_len > available {
        return Err(CapacityError::MessageTooLarge {
            required: bitstream_len,
            available,
        });
    }
    Ok(())
}

/// 扣除结束标记后，图像最多能隐藏的字符数。
pub fn max_payload_chars(buffer: &PixelBuffer) -> usize {
    buffer.capacity_bits().saturating_sub(TERMINATOR_BITS) / BITS_PER_CHAR
}
