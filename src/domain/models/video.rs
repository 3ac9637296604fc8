// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};

use crate::utils::time::format_epoch;

/// 视频CSV输出列
pub const VIDEO_CSV_HEADERS: &[&str] = &[
    "标题",
    "链接",
    "up主",
    "up主id",
    "精确播放数",
    "历史累计弹幕数",
    "点赞数",
    "投硬币枚数",
    "收藏人数",
    "转发人数",
    "评论数",
    "发布时间",
    "视频时长(秒)",
    "视频简介",
    "作者简介",
    "标签",
    "视频aid",
];

/// 视频简介在输出中的最大字符数
const DESCRIPTION_CAP: usize = 200;

/// 输出中保留的标签数量上限
const TAG_CAP: usize = 5;

/// 视频统计数据
///
/// 对应页面嵌入状态中的 stat 块，缺失的字段取零值。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoStats {
    /// 播放量
    pub view: u64,
    /// 弹幕数
    pub danmaku: u64,
    /// 点赞数
    pub like: u64,
    /// 投币数
    pub coin: u64,
    /// 收藏量
    pub favorite: u64,
    /// 分享数
    pub share: u64,
    /// 评论数量
    pub reply: u64,
}

/// 发布时间
///
/// 结构化提取得到Unix时间戳，回退提取得到的是页面上
/// 已格式化的日期文本，两种来源在输出时统一为本地时间
/// 字符串。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PublishTime {
    /// Unix时间戳（秒）
    Epoch(i64),
    /// 页面中已格式化的日期文本
    Text(String),
    /// 未能提取
    Unknown,
}

impl PublishTime {
    /// 输出用的本地时间字符串，未知时为空
    pub fn to_display(&self) -> String {
        match self {
            PublishTime::Epoch(ts) if *ts > 0 => format_epoch(*ts),
            PublishTime::Epoch(_) => String::new(),
            PublishTime::Text(text) => text.clone(),
            PublishTime::Unknown => String::new(),
        }
    }
}

impl Default for PublishTime {
    fn default() -> Self {
        PublishTime::Unknown
    }
}

/// 视频记录
///
/// 单个视频的结构化元数据，每个目标构建一次，
/// 构建完成后不可变。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoRecord {
    /// 视频标题
    pub title: String,
    /// 数字内容ID（AID），以不透明字符串保存
    pub aid: String,
    /// 视频短代码（BVID），回退提取时可能为空
    pub bvid: String,
    /// 作者名称
    pub author: String,
    /// 作者ID（MID）
    pub author_id: String,
    /// 统计数据块
    pub stats: VideoStats,
    /// 视频时长（秒）
    pub duration_seconds: i64,
    /// 发布时间
    pub publish_time: PublishTime,
    /// 视频简介
    pub description: String,
    /// 作者简介，仅回退提取会填充
    pub author_bio: String,
    /// 标签，按页面出现顺序保存
    pub tags: Vec<String>,
}

impl VideoRecord {
    /// 生成CSV输出行
    ///
    /// 列顺序与 [`VIDEO_CSV_HEADERS`] 一致。简介截断到200字符，
    /// 标签取前5个以逗号连接，发布时间统一为本地时间字符串。
    ///
    /// # 参数
    ///
    /// * `page_url` - 视频页面地址，作为"视频链接"列输出
    pub fn csv_row(&self, page_url: &str) -> Vec<String> {
        let description: String = self.description.chars().take(DESCRIPTION_CAP).collect();
        let tags = self
            .tags
            .iter()
            .take(TAG_CAP)
            .cloned()
            .collect::<Vec<_>>()
            .join(",");

        vec![
            self.title.clone(),
            page_url.to_string(),
            self.author.clone(),
            self.author_id.clone(),
            self.stats.view.to_string(),
            self.stats.danmaku.to_string(),
            self.stats.like.to_string(),
            self.stats.coin.to_string(),
            self.stats.favorite.to_string(),
            self.stats.share.to_string(),
            self.stats.reply.to_string(),
            self.publish_time.to_display(),
            self.duration_seconds.to_string(),
            description,
            self.author_bio.clone(),
            tags,
            self.aid.clone(),
        ]
    }
}
