// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 回退提取
//!
//! 内嵌状态缺失或损坏时，从脚本原文扫描强制标识，并用
//! meta标签中按固定模板书写的描述还原统计数据。强制项
//! （作者ID、视频AID、时长、统计模板）缺失即判定结构性
//! 失败，不做重试。

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use scraper::{Html, Selector};

use crate::domain::models::video::{PublishTime, VideoRecord, VideoStats};
use crate::extract::{page_title, ExtractError};

static AUTHOR_ID_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#""mid":(\d+)"#).unwrap());
static VIDEO_AID_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#""aid":(\d+)"#).unwrap());
static DURATION_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#""duration":(\d+)"#).unwrap());

// 描述meta按固定模板书写，六个数字的顺序即列顺序
static STATS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"视频播放量 (\d+)、弹幕量 (\d+)、点赞数 (\d+)、投硬币枚数 (\d+)、收藏人数 (\d+)、转发人数 (\d+)",
    )
    .unwrap()
});
static AUTHOR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"视频作者\s*([^,]+)").unwrap());
static AUTHOR_BIO_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"作者简介 (.+?),").unwrap());
static META_SPLIT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r",\s*").unwrap());

/// 页面标题的品牌后缀
const TITLE_SUFFIX: &str = "_哔哩哔哩_bilibili";

/// 从文档结构与脚本原文回退提取视频记录
pub(crate) fn from_document(
    document: &Html,
    script_text: &str,
) -> Result<VideoRecord, ExtractError> {
    let author_id = capture_digits(&AUTHOR_ID_RE, script_text)
        .ok_or(ExtractError::MissingField("作者ID"))?;
    let aid =
        capture_digits(&VIDEO_AID_RE, script_text).ok_or(ExtractError::MissingField("视频AID"))?;
    let duration_raw: i64 = capture_digits(&DURATION_RE, script_text)
        .and_then(|text| text.parse().ok())
        .ok_or(ExtractError::MissingField("视频时长"))?;
    // 脚本中的时长比实际值偏大2秒
    let duration_seconds = duration_raw - 2;

    let title = match page_title(document) {
        Some(raw) => raw.replace(TITLE_SUFFIX, "").trim().to_string(),
        None => "未找到标题".to_string(),
    };

    let tags = match meta_content(document, "keywords") {
        Some(content) => split_keywords(&content, &title),
        None => Vec::new(),
    };

    let meta_description =
        meta_content(document, "description").ok_or(ExtractError::MissingField("描述信息"))?;
    let captures = STATS_RE
        .captures(&meta_description)
        .ok_or(ExtractError::MissingStats)?;
    let stats = VideoStats {
        view: group_number(&captures, 1),
        danmaku: group_number(&captures, 2),
        like: group_number(&captures, 3),
        coin: group_number(&captures, 4),
        favorite: group_number(&captures, 5),
        share: group_number(&captures, 6),
        reply: 0,
    };

    let author = AUTHOR_RE
        .captures(&meta_description)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_else(|| "未找到作者".to_string());
    let author_bio = AUTHOR_BIO_RE
        .captures(&meta_description)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| "未找到作者简介".to_string());
    // 描述的第一段是视频简介本身
    let description = META_SPLIT_RE
        .split(&meta_description)
        .next()
        .unwrap_or_default()
        .trim()
        .to_string();

    let publish_time = match meta_content(document, "uploadDate") {
        Some(content) => PublishTime::Text(content),
        None => PublishTime::Unknown,
    };

    Ok(VideoRecord {
        title,
        aid,
        bvid: String::new(),
        author,
        author_id,
        stats,
        duration_seconds,
        publish_time,
        description,
        author_bio,
        tags,
    })
}

/// keywords meta 去掉开头的标题与结尾四个站点固定词后才是标签
fn split_keywords(content: &str, title: &str) -> Vec<String> {
    let without_title = content.replace(&format!("{},", title), "");
    let keywords: Vec<&str> = without_title.split(',').collect();
    if keywords.len() > 4 {
        keywords[..keywords.len() - 4]
            .iter()
            .map(|s| s.to_string())
            .collect()
    } else {
        Vec::new()
    }
}

fn capture_digits(re: &Regex, text: &str) -> Option<String> {
    re.captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

fn group_number(captures: &Captures<'_>, index: usize) -> u64 {
    captures
        .get(index)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or_default()
}

fn meta_content(document: &Html, itemprop: &str) -> Option<String> {
    let selector = Selector::parse(&format!(r#"meta[itemprop="{}"]"#, itemprop)).ok()?;
    document
        .select(&selector)
        .next()
        .and_then(|element| element.value().attr("content"))
        .map(|content| content.to_string())
}
