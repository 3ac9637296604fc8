// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 配置模块
///
/// 处理应用程序的配置设置，包括请求节奏、请求头轮换、
/// 评论分页和输出路径等配置
pub mod settings;
