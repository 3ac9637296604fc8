// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域模型模块
///
/// 该模块定义了系统的核心业务实体，包括：
/// - 爬取目标（target）：表示一个待爬取的视频标识
/// - 视频记录（video）：单个视频的结构化元数据
/// - 评论记录（comment）：带序号的评论输出行
///
/// 这些模型构成了系统的数据基础，定义了业务概念的
/// 结构和行为。
pub mod comment;
pub mod target;
pub mod video;
