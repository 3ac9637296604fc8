// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 请求引擎层
//!
//! 负责HTTP请求的节奏控制、浏览器头伪装与封锁恢复。

pub mod executor;
pub mod headers;
pub mod pacing;
