// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域层模块
///
/// 该模块包含系统的核心业务实体，即爬取目标、视频记录
/// 和评论记录等数据结构。
///
/// 领域层不依赖于任何外部实现，体现了纯粹的业务数据
/// 结构和业务规则。
pub mod models;
