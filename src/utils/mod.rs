// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 工具模块
///
/// 提供通用的工具函数和辅助功能，
/// 包括遥测初始化、时间格式化和文件名处理。
pub mod filename;
pub mod telemetry;
pub mod time;
