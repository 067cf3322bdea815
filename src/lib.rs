//! # adaptive_lsb 库
//!
//! 本库包含块复杂度自适应 LSB 隐写工具的核心逻辑：
//! 块复杂度排序、比特编解码、容量检查，以及隐藏 / 恢复两条流程。

// 声明库包含的所有模块。

pub mod bits;
pub mod capacity;
pub mod cli;
pub mod constants;
pub mod error;
pub mod handler;
pub mod pixels;
pub mod ranker;
pub mod steganography;
