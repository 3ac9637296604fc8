// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::fmt;
use thiserror::Error;
use url::Url;

/// 爬取目标
///
/// 表示一个待爬取的视频，由外部提供的标识符构造。
/// 标识符既可以是短代码（如 `BV1xx411c7mD`），
/// 也可以是完整的视频页面地址。构造后不可变。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    /// 视频短代码
    bv: String,
}

/// 目标解析错误
#[derive(Error, Debug)]
pub enum TargetError {
    /// 空白的目标标识符
    #[error("empty target identifier")]
    Empty,

    /// 无法从URL中解析出视频代码
    #[error("cannot derive a video code from url: {0}")]
    UnusableUrl(String),
}

impl Target {
    /// 从一行输入解析目标
    ///
    /// 接受短代码或完整URL，URL取其最后一个非空路径段作为代码。
    ///
    /// # 参数
    ///
    /// * `line` - 输入文件中的一行
    ///
    /// # 返回值
    ///
    /// * `Ok(Target)` - 解析成功的目标
    /// * `Err(TargetError)` - 输入为空或URL不含视频代码
    pub fn parse(line: &str) -> Result<Self, TargetError> {
        let token = line.trim();
        if token.is_empty() {
            return Err(TargetError::Empty);
        }

        if token.contains("://") {
            let url = Url::parse(token).map_err(|_| TargetError::UnusableUrl(token.to_string()))?;
            let code = url
                .path_segments()
                .and_then(|mut segments| segments.find(|s| s.starts_with("BV")))
                .map(|s| s.to_string())
                .ok_or_else(|| TargetError::UnusableUrl(token.to_string()))?;
            return Ok(Self { bv: code });
        }

        Ok(Self {
            bv: token.to_string(),
        })
    }

    /// 视频短代码
    pub fn bv(&self) -> &str {
        &self.bv
    }

    /// 视频页面的标准地址
    pub fn page_url(&self) -> String {
        format!("https://www.bilibili.com/video/{}", self.bv)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.bv)
    }
}
