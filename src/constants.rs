/// 复杂度分块的边长 (像素)。
/// 图像按 8×8 的块划分，右侧和底部的边缘块会被裁剪到图像边界内。
pub const BLOCK_SIZE: u32 = 8;

/// 参与隐写的颜色通道数 (R, G, B)。
/// 即使像素缓冲区带有 Alpha 通道，也只使用前三个通道。
pub const COLOR_CHANNELS: usize = 3;

/// 每个字符占用的比特数。
/// 每个字符按单字节 (码点 0–255) 处理，因此需要 8 个颜色通道来隐藏。
pub const BITS_PER_CHAR: usize = 8;

/// 附加在隐藏文本之后的结束标记。
pub const TERMINATOR: &str = "_EOF_";

/// 结束标记占用的比特数：5 个 ASCII 字符 × 8 bits。
pub const TERMINATOR_BITS: usize = TERMINATOR.len() * BITS_PER_CHAR;
