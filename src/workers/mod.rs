// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 工作器模块
///
/// 单目标的视频与评论工作器，以及跨目标的批量调度
pub mod batch;
pub mod comment_worker;
pub mod video_worker;
