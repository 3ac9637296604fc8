// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};

/// 评论CSV输出列
pub const COMMENT_CSV_HEADERS: &[&str] = &[
    "序号",
    "上级评论ID",
    "评论ID",
    "用户ID",
    "用户名",
    "用户等级",
    "性别",
    "评论内容",
    "评论时间",
    "回复数",
    "点赞数",
    "个性签名",
    "IP属地",
    "是否是大会员",
    "头像",
];

/// 评论记录
///
/// 一条带序号的评论输出行，顶层评论与楼中楼回复共用同一
/// 结构。创建后不再修改。
///
/// 序号在单个目标的遍历中从1开始严格递增，是输出的唯一
/// 排序依据，与平台自身的评论ID顺序无关。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentRow {
    /// 进程内分配的序号
    pub sequence: u64,
    /// 上级评论ID，顶层评论为空
    pub parent_id: String,
    /// 平台分配的评论ID
    pub comment_id: String,
    /// 评论者用户ID
    pub author_id: String,
    /// 评论者用户名
    pub author_name: String,
    /// 评论者等级
    pub level: u8,
    /// 性别文本（男/女/保密）
    pub gender: String,
    /// 评论内容
    pub message: String,
    /// 评论时间，本地时间字符串
    pub post_time: String,
    /// 回复数，楼中楼回复不输出该列
    pub reply_count: Option<i64>,
    /// 点赞数
    pub like_count: i64,
    /// 个性签名
    pub signature: String,
    /// IP属地标签，未公开时为"未知"
    pub region: String,
    /// 是否是大会员
    pub is_member: bool,
    /// 头像地址
    pub avatar_url: String,
}

impl CommentRow {
    /// 生成CSV输出行，列顺序与 [`COMMENT_CSV_HEADERS`] 一致
    pub fn csv_row(&self) -> Vec<String> {
        vec![
            self.sequence.to_string(),
            self.parent_id.clone(),
            self.comment_id.clone(),
            self.author_id.clone(),
            self.author_name.clone(),
            self.level.to_string(),
            self.gender.clone(),
            self.message.clone(),
            self.post_time.clone(),
            self.reply_count.map(|n| n.to_string()).unwrap_or_default(),
            self.like_count.to_string(),
            self.signature.clone(),
            self.region.clone(),
            if self.is_member { "是" } else { "否" }.to_string(),
            self.avatar_url.clone(),
        ]
    }

    /// 是否为顶层评论
    pub fn is_top_level(&self) -> bool {
        self.parent_id.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_matches_header_width() {
        let row = CommentRow {
            sequence: 1,
            parent_id: String::new(),
            comment_id: "99001".to_string(),
            author_id: "10086".to_string(),
            author_name: "用户甲".to_string(),
            level: 5,
            gender: "保密".to_string(),
            message: "第一".to_string(),
            post_time: "2024-01-01 12:00:00".to_string(),
            reply_count: Some(0),
            like_count: 2,
            signature: String::new(),
            region: "广东".to_string(),
            is_member: false,
            avatar_url: "https://example.invalid/a.jpg".to_string(),
        };

        let cells = row.csv_row();
        assert_eq!(cells.len(), COMMENT_CSV_HEADERS.len());
        assert_eq!(cells[0], "1");
        assert_eq!(cells[13], "否");
        assert!(row.is_top_level());
    }
}
