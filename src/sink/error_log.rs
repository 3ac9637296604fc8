// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 追加式错误日志
//!
//! 每条失败一行，格式固定为"时间 - 描述: 标识"，便于grep。

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::sink::SinkError;
use crate::utils::time::now_stamp;

pub struct ErrorLog {
    path: PathBuf,
}

impl ErrorLog {
    pub fn new(path: &Path) -> Self {
        ErrorLog {
            path: path.to_path_buf(),
        }
    }

    /// 追加一条带时间戳的失败记录
    pub fn append(&self, message: &str) -> Result<(), SinkError> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{} - {}", now_stamp(), message)?;
        Ok(())
    }
}
