//! # 比特编解码模块
//!
//! 文本与比特流之间的转换，以及单个颜色通道上的 LSB 读写。
//! 每个字符按其码点的 8 位大端二进制表示，文本末尾追加结束标记 `_EOF_`。

use crate::constants::{BITS_PER_CHAR, TERMINATOR, TERMINATOR_BITS};
use crate::error::{DecodeError, EncodingError};

/// 有序的单比特序列，每个元素为 0 或 1。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bitstream(Vec<u8>);

impl Bitstream {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        self.0.iter().copied()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    fn push_byte(&mut self, byte: u8) {
        self.0
            .extend((0..BITS_PER_CHAR).rev().map(|shift| (byte >> shift) & 1));
    }
}

/// 将文本编码为比特流，并追加 40 bit 的结束标记。
///
/// # Errors
///
/// 文本中任一字符的码点大于 255 时返回 [`EncodingError::NonByteCharacter`]。
pub fn encode_text_to_bits(text: &str) -> Result<Bitstream, EncodingError> {
    let mut bits = Bitstream(Vec::with_capacity(
        text.len() * BITS_PER_CHAR + TERMINATOR_BITS,
    ));

    for (index, character) in text.chars().enumerate() {
        let byte = u8::try_from(u32::from(character))
            .map_err(|_| EncodingError::NonByteCharacter { character, index })?;
        bits.push_byte(byte);
    }

    TERMINATOR.bytes().for_each(|byte| bits.push_byte(byte));

    Ok(bits)
}

/// 按 8 bit 一组将比特还原为字符，直到输出中首次出现结束标记。
///
/// 找到标记后立即停止，剩余比特不再读取。末尾不足 8 bit 的分组按其自身的
/// 数值还原为一个字符，同样参与结束标记的匹配。
///
/// # Errors
///
/// 比特耗尽仍未出现结束标记时返回 [`DecodeError::NoHiddenMessage`]。
pub fn decode_bits_to_text<I>(bits: I) -> Result<String, DecodeError>
where
    I: IntoIterator<Item = u8>,
{
    let mut bits = bits.into_iter();
    let mut text = String::new();

    loop {
        let mut byte = 0u8;
        let mut taken = 0;
        for bit in bits.by_ref().take(BITS_PER_CHAR) {
            byte = (byte << 1) | (bit & 1);
            taken += 1;
        }
        if taken == 0 {
            return Err(DecodeError::NoHiddenMessage);
        }

        text.push(char::from(byte));
        // 每次只追加一个字符，首次匹配必然出现在末尾
        if text.ends_with(TERMINATOR) {
            text.truncate(text.len() - TERMINATOR.len());
            return Ok(text);
        }
        if taken < BITS_PER_CHAR {
            return Err(DecodeError::NoHiddenMessage);
        }
    }
}

/// LSB 替换：保留高 7 位，写入 `bit`。
pub fn write_bit(channel_value: u8, bit: u8) -> u8 {
    (channel_value & 0xFE) | (bit & 1)
}

pub fn read_bit(channel_value: u8) -> u8 {
    channel_value & 1
}
