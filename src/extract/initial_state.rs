// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 结构化状态提取
//!
//! 页面脚本中内嵌 `window.__INITIAL_STATE__ = {...};` 赋值，
//! 其中的 videoData 块是最可靠的数据来源。

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use crate::domain::models::video::{PublishTime, VideoRecord, VideoStats};

static INITIAL_STATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)window\.__INITIAL_STATE__\s*=\s*(\{.*?\});").unwrap());

#[derive(Debug, Default, Deserialize)]
struct InitialState {
    #[serde(default, rename = "videoData")]
    video_data: VideoData,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct VideoData {
    title: String,
    bvid: String,
    aid: Option<u64>,
    owner: Owner,
    stat: VideoStats,
    duration: i64,
    pubdate: i64,
    desc: String,
    tags: Vec<Tag>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Owner {
    name: String,
    mid: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Tag {
    tag_name: String,
}

/// 从脚本文本中解析内嵌状态
///
/// 赋值缺失或JSON无法解析时返回 `None`，由调用方回退。
/// videoData 整块缺失不算失败，各字段取默认值。
pub(crate) fn from_script(script_text: &str) -> Option<VideoRecord> {
    let captures = INITIAL_STATE_RE.captures(script_text)?;
    let json = captures.get(1)?.as_str();
    let state: InitialState = serde_json::from_str(json).ok()?;
    let video = state.video_data;

    Some(VideoRecord {
        title: video.title,
        aid: video.aid.map(|n| n.to_string()).unwrap_or_default(),
        bvid: video.bvid,
        author: video.owner.name,
        author_id: video.owner.mid.map(|n| n.to_string()).unwrap_or_default(),
        stats: video.stat,
        duration_seconds: video.duration,
        publish_time: PublishTime::Epoch(video.pubdate),
        description: video.desc,
        author_bio: String::new(),
        tags: video.tags.into_iter().map(|tag| tag.tag_name).collect(),
    })
}
