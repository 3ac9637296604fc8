// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 记录输出
//!
//! 流水线产出有序的行，这里负责把行持久化成CSV文件，
//! 并维护追加式的错误日志。

pub mod csv;
pub mod error_log;

use std::io;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SinkError {
    #[error("输出IO错误: {0}")]
    Io(#[from] io::Error),
}

/// 记录输出端
pub trait RecordSink {
    /// 追加一行
    fn write_row(&mut self, row: &[String]) -> Result<(), SinkError>;

    /// 刷新缓冲，确保已产出的行落盘
    fn flush(&mut self) -> Result<(), SinkError>;
}
