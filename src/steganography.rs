use tracing::debug;

use crate::bits::{decode_bits_to_text, encode_text_to_bits, read_bit, write_bit};
use crate::capacity::check_capacity;
use crate::error::{DecodeError, HideError};
use crate::pixels::PixelBuffer;
use crate::ranker::{channel_slots, rank_blocks};

/// 按块复杂度降序，将 `text` 及结束标记逐比特写入颜色通道的最低位。
///
/// 返回被写入的通道数 (即比特流长度)。编码和容量检查都在写入之前完成，
/// 出错时缓冲区保持原样。
pub fn hide(buffer: &mut PixelBuffer, text: &str) -> Result<usize, HideError> {
    let blocks = rank_blocks(buffer);
    let bits = encode_text_to_bits(text)?;
    check_capacity(buffer, bits.len())?;

    debug!(
        blocks = blocks.len(),
        bits = bits.len(),
        capacity = buffer.capacity_bits(),
        "embedding payload"
    );

    let slots: Vec<usize> = channel_slots(buffer, &blocks).take(bits.len()).collect();
    let pix = buffer.raw_mut();
    for (idx, bit) in slots.into_iter().zip(bits.iter()) {
        pix[idx] = write_bit(pix[idx], bit);
    }

    Ok(bits.len())
}

/// 以与 `hide` 相同的顺序读取最低位，直到遇到结束标记。
pub fn recover(buffer: &PixelBuffer) -> Result<String, DecodeError> {
    let blocks = rank_blocks(buffer);
    debug!(blocks = blocks.len(), "scanning for payload");

    let pix = buffer.as_raw();
    let bits = channel_slots(buffer, &blocks).map(|idx| read_bit(pix[idx]));

    decode_bits_to_text(bits)
}

/// 检查已写入的缓冲区能否恢复出原文。
///
/// 恢复时的块顺序由修改后的像素重新计算，若最低位的改动让复杂度接近的块
/// 交换了位置，这里会返回 `false`。
pub fn verify(buffer: &PixelBuffer, text: &str) -> bool {
    recover(buffer).is_ok_and(|recovered| recovered == text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::TERMINATOR;
    use crate::error::{CapacityError, EncodingError};
    use rand::Rng;

    fn solid(width: u32, height: u32, value: u8) -> PixelBuffer {
        let len = (width * height * 3) as usize;
        PixelBuffer::new(width, height, 3, vec![value; len]).unwrap()
    }

    /// 每个 8×8 块都是围绕 128 的棋盘纹理，振幅互不相同且相差 4，
    /// 最低位的改动不足以改变块的排序。
    fn textured(width: u32, height: u32, channels: usize) -> PixelBuffer {
        let blocks_wide = width.div_ceil(8);
        let block_count = blocks_wide * height.div_ceil(8);
        let mut data = Vec::with_capacity((width * height) as usize * channels);

        for y in 0..height {
            for x in 0..width {
                let block = (y / 8) * blocks_wide + x / 8;
                let amp = ((block * 7) % block_count) * 4 + 4;
                for c in 0..channels {
                    let value = if c >= 3 {
                        255
                    } else if (x + y + c as u32) % 2 == 0 {
                        128 - amp
                    } else {
                        128 + amp
                    };
                    data.push(value as u8);
                }
            }
        }

        PixelBuffer::new(width, height, channels, data).unwrap()
    }

    #[test]
    fn single_block_round_trip() {
        let mut buf = textured(8, 8, 3);
        assert_eq!(buf.capacity_bits(), 192);

        let written = hide(&mut buf, "hi").unwrap();
        assert_eq!(written, 56);
        assert_eq!(recover(&buf).unwrap(), "hi");
    }

    #[test]
    fn textured_rgba_round_trip() {
        let original = textured(32, 32, 4);
        let mut buf = original.clone();
        let text = "Adaptive LSB keeps the alpha channel intact. café";

        hide(&mut buf, text).unwrap();
        assert_eq!(recover(&buf).unwrap(), text);
        assert!(verify(&buf, text));

        // Alpha 通道不参与隐写，其余通道最多改变 1
        for (i, (&before, &after)) in original.as_raw().iter().zip(buf.as_raw()).enumerate() {
            if i % 4 == 3 {
                assert_eq!(before, after);
            } else {
                assert!(before.abs_diff(after) <= 1);
            }
        }
    }

    #[test]
    fn random_latin1_payloads_round_trip() {
        let mut rng = rand::rng();
        let original = textured(32, 32, 4);
        let max_chars = (original.capacity_bits() - 40) / 8;

        for _ in 0..50 {
            let len = rng.random_range(0..=max_chars);
            let text: String = (0..len).map(|_| char::from(rng.random::<u8>())).collect();
            // 结束标记必须在文本之后才首次出现
            if format!("{text}{TERMINATOR}").find(TERMINATOR) != Some(text.len()) {
                continue;
            }

            let mut buf = original.clone();
            hide(&mut buf, &text).unwrap();
            assert_eq!(recover(&buf).unwrap(), text);
        }
    }

    #[test]
    fn writes_follow_complexity_order() {
        // 左块均匀，右块纹理复杂：比特应先写入右块
        let mut buf = solid(16, 8, 100);
        for y in 0..8 {
            for x in 8..16 {
                let v = if (x + y) % 2 == 0 { 50 } else { 150 };
                (0..3).for_each(|c| buf.set_channel(x, y, c, v));
            }
        }
        let original = buf.clone();

        hide(&mut buf, "x").unwrap();

        for y in 0..8 {
            for x in 0..8 {
                for c in 0..3 {
                    assert_eq!(buf.channel(x, y, c), original.channel(x, y, c));
                }
            }
        }
        assert_eq!(recover(&buf).unwrap(), "x");
    }

    #[test]
    fn mutates_only_the_written_span() {
        let original = solid(16, 16, 0);
        let mut buf = original.clone();
        let written = hide(&mut buf, "secret").unwrap();

        let changed = original
            .as_raw()
            .iter()
            .zip(buf.as_raw())
            .filter(|(a, b)| a != b)
            .count();
        // 全黑图像只有写入 1 的通道会变化
        let ones = encode_text_to_bits("secret").unwrap().iter().filter(|&b| b == 1).count();
        assert_eq!(changed, ones);
        assert!(changed <= written);

        // 全部平局时按行优先顺序写入，只触及第一个块
        let first_block_bytes: Vec<usize> = (0..8)
            .flat_map(|y| (0..8).flat_map(move |x| (0..3).map(move |c| (y * 16 + x) * 3 + c)))
            .collect();
        for (i, (a, b)) in original.as_raw().iter().zip(buf.as_raw()).enumerate() {
            if a != b {
                assert!(first_block_bytes.contains(&i));
            }
        }
    }

    #[test]
    fn uniform_image_round_trip_uses_scan_order() {
        let mut buf = solid(16, 16, 0);
        hide(&mut buf, "secret").unwrap();
        assert_eq!(recover(&buf).unwrap(), "secret");
    }

    #[test]
    fn exact_capacity_is_accepted() {
        // 4×4 图像容量 48 bit = 1 个字符 + 40 bit 结束标记
        let mut buf = solid(4, 4, 200);
        assert_eq!(hide(&mut buf, "a").unwrap(), 48);
        assert_eq!(recover(&buf).unwrap(), "a");
    }

    #[test]
    fn oversized_payload_leaves_buffer_untouched() {
        let original = textured(4, 4, 3);
        let mut buf = original.clone();

        let err = hide(&mut buf, "toolongmessage").unwrap_err();
        assert_eq!(
            err,
            HideError::Capacity(CapacityError::MessageTooLarge {
                required: 14 * 8 + 40,
                available: 48
            })
        );
        assert_eq!(buf, original);
    }

    #[test]
    fn non_byte_payload_leaves_buffer_untouched() {
        let original = textured(16, 16, 3);
        let mut buf = original.clone();

        let err = hide(&mut buf, "snow ☃").unwrap_err();
        assert!(matches!(
            err,
            HideError::Encoding(EncodingError::NonByteCharacter { index: 5, .. })
        ));
        assert_eq!(buf, original);
    }

    #[test]
    fn clean_image_has_no_message() {
        let buf = solid(16, 16, 0);
        assert_eq!(recover(&buf), Err(DecodeError::NoHiddenMessage));
    }

    #[test]
    fn empty_payload_round_trip() {
        let mut buf = textured(8, 8, 3);
        assert_eq!(hide(&mut buf, "").unwrap(), 40);
        assert_eq!(recover(&buf).unwrap(), "");
    }

    #[test]
    fn verify_rejects_other_text() {
        let mut buf = textured(16, 16, 3);
        hide(&mut buf, "alpha").unwrap();
        assert!(verify(&buf, "alpha"));
        assert!(!verify(&buf, "beta"));
    }
}
