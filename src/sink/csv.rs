// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! CSV文件输出
//!
//! 文件以UTF-8 BOM开头，Excel直接打开不会乱码。

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::sink::{RecordSink, SinkError};

pub struct CsvSink {
    writer: BufWriter<File>,
    path: PathBuf,
}

impl CsvSink {
    /// 创建输出文件并写入表头
    ///
    /// 父目录不存在时自动创建，已存在的同名文件会被覆盖。
    pub fn create(path: &Path, headers: &[&str]) -> Result<Self, SinkError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        writer.write_all("\u{feff}".as_bytes())?;

        let mut sink = CsvSink {
            writer,
            path: path.to_path_buf(),
        };
        sink.write_fields(headers.iter().copied())?;
        Ok(sink)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_fields<'f>(
        &mut self,
        fields: impl Iterator<Item = &'f str>,
    ) -> Result<(), SinkError> {
        let line = fields.map(escape_field).collect::<Vec<_>>().join(",");
        writeln!(self.writer, "{}", line)?;
        Ok(())
    }
}

impl RecordSink for CsvSink {
    fn write_row(&mut self, row: &[String]) -> Result<(), SinkError> {
        self.write_fields(row.iter().map(String::as_str))
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        self.writer.flush()?;
        Ok(())
    }
}

/// 统计文件中已落盘的数据行数，表头不计入
///
/// 中断后以磁盘上的行数为准，内部计数可能超前于尚未
/// 刷新的写入。
pub fn rows_on_disk(path: &Path) -> Result<u64, SinkError> {
    let content = fs::read_to_string(path)?;
    Ok((content.lines().count() as u64).saturating_sub(1))
}

/// Escape a field for CSV output.
fn escape_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
