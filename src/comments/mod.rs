// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 评论抓取
//!
//! 按页遍历一级评论，并对有回复的评论同步遍历其二级
//! 评论分页，产出带全局序号的评论行。

pub mod api;
pub mod paginator;
