// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 评论接口的请求参数与响应模型
//!
//! 两个分页接口：`reply/main` 返回一级评论，`reply/reply`
//! 按root返回某条评论的二级回复。响应字段全部取默认值
//! 兜底，接口裁剪字段时不影响解析。

use serde::Deserialize;

use crate::domain::models::comment::CommentRow;
use crate::utils::time::format_epoch;

/// 一级评论分页接口，拼在配置的基础地址后
pub const MAIN_REPLY_PATH: &str = "/x/v2/reply/main";

/// 二级评论分页接口
pub const NESTED_REPLY_PATH: &str = "/x/v2/reply/reply";

/// 评论接口响应
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ReplyPage {
    /// 平台级状态码，0为成功
    pub code: i64,
    pub message: String,
    /// 错误响应里该字段是null
    pub data: Option<ReplyData>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ReplyData {
    /// 本页评论，没有更多数据时为空或缺失
    pub replies: Option<Vec<ReplyItem>>,
    pub cursor: ReplyCursor,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ReplyCursor {
    /// 服务端给出的末页标志
    pub is_end: bool,
}

/// 单条评论
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ReplyItem {
    pub rpid: u64,
    pub member: Member,
    pub content: ReplyContent,
    /// 发表时间的Unix时间戳（秒）
    pub ctime: i64,
    /// 二级回复总数，只在一级评论上有意义
    pub rcount: i64,
    pub like: i64,
    pub reply_control: ReplyControl,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Member {
    pub mid: u64,
    pub uname: String,
    pub sex: String,
    pub sign: String,
    pub avatar: String,
    pub level_info: LevelInfo,
    pub vip: VipInfo,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LevelInfo {
    pub current_level: u8,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct VipInfo {
    /// 1表示大会员生效中
    pub status: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ReplyContent {
    pub message: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ReplyControl {
    /// 形如"IP属地：广东"的展示文本
    pub location: String,
}

/// 一级评论分页的查询参数
pub fn main_page_params(oid: &str, page: u32, page_size: u32) -> Vec<(&'static str, String)> {
    vec![
        ("oid", oid.to_string()),
        ("type", "1".to_string()),
        ("mode", "3".to_string()),
        ("pn", page.to_string()),
        ("ps", page_size.to_string()),
        ("plat", "1".to_string()),
        ("web_location", "1315875".to_string()),
    ]
}

/// 二级评论分页的查询参数
pub fn nested_page_params(
    oid: &str,
    root: &str,
    page: u32,
    page_size: u32,
) -> Vec<(&'static str, String)> {
    vec![
        ("oid", oid.to_string()),
        ("type", "1".to_string()),
        ("root", root.to_string()),
        ("pn", page.to_string()),
        ("ps", page_size.to_string()),
        ("web_location", "333.788".to_string()),
    ]
}

/// 将接口评论转换为输出行
///
/// 一级评论的 `parent` 为 `None`，此时行内携带回复数；
/// 二级回复携带其一级评论ID作为上级，回复数列留空。
pub fn comment_row(reply: &ReplyItem, sequence: u64, parent: Option<&str>) -> CommentRow {
    CommentRow {
        sequence,
        parent_id: parent.unwrap_or_default().to_string(),
        comment_id: reply.rpid.to_string(),
        author_id: reply.member.mid.to_string(),
        author_name: reply.member.uname.clone(),
        level: reply.member.level_info.current_level,
        gender: reply.member.sex.clone(),
        message: reply.content.message.clone(),
        post_time: format_epoch(reply.ctime),
        reply_count: if parent.is_none() {
            Some(reply.rcount)
        } else {
            None
        },
        like_count: reply.like,
        signature: reply.member.sign.clone(),
        region: region_label(&reply.reply_control.location),
        is_member: reply.member.vip.status == 1,
        avatar_url: reply.member.avatar.clone(),
    }
}

/// 属地文本去掉"IP属地："前缀（5个字符）后才是地区名
pub(crate) fn region_label(location: &str) -> String {
    if location.chars().count() > 5 {
        location.chars().skip(5).collect()
    } else {
        "未知".to_string()
    }
}
