// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 视频页面解析
//!
//! 双策略提取：优先解析页面内嵌的结构化状态，状态缺失或
//! 无法解析时回退到meta标签与正则扫描。

pub mod initial_state;
pub mod meta_fallback;

use scraper::{Html, Selector};
use thiserror::Error;
use tracing::debug;

use crate::domain::models::video::VideoRecord;

/// 提取失败的结构性原因
///
/// 结构性失败对同一页面重试没有意义，调用方应记录后跳过。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    #[error("找不到包含 window.__INITIAL_STATE__ 的脚本")]
    ScriptNotFound,
    #[error("无法提取{0}")]
    MissingField(&'static str),
    #[error("未找到统计数据")]
    MissingStats,
}

/// 从页面正文提取视频记录
///
/// 先尝试结构化状态解析，内嵌JSON缺失或无法解析时改用
/// 回退提取。两种策略都失败时返回具体的结构性原因。
pub fn extract(body: &str) -> Result<VideoRecord, ExtractError> {
    let document = Html::parse_document(body);
    let script_text =
        find_initial_state_script(&document).ok_or(ExtractError::ScriptNotFound)?;

    if let Some(record) = initial_state::from_script(&script_text) {
        return Ok(record);
    }

    debug!("结构化状态解析失败，改用回退提取");
    meta_fallback::from_document(&document, &script_text)
}

/// 判断正文是否为人机验证页面
///
/// 被风控重定向后的页面标题带有验证字样，这类页面需要
/// 人工干预，重试无法恢复。
pub fn is_verification_page(body: &str) -> bool {
    let document = Html::parse_document(body);
    match page_title(&document) {
        Some(title) => title.contains("验证"),
        None => false,
    }
}

/// 页面title元素的文本
pub(crate) fn page_title(document: &Html) -> Option<String> {
    let selector = Selector::parse("title").unwrap();
    document
        .select(&selector)
        .next()
        .map(|element| element.text().collect::<String>())
}

fn find_initial_state_script(document: &Html) -> Option<String> {
    let selector = Selector::parse("script").unwrap();
    document
        .select(&selector)
        .map(|element| element.text().collect::<String>())
        .find(|text| text.contains("window.__INITIAL_STATE__"))
}
