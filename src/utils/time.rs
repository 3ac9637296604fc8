// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{Local, TimeZone};

/// 输出时间统一使用的本地时间格式
pub const LOCAL_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// 将Unix时间戳格式化为本地时间字符串
///
/// 非正数返回空字符串，超出可表示范围时退化为原始数字文本。
pub fn format_epoch(timestamp: i64) -> String {
    if timestamp <= 0 {
        return String::new();
    }
    match Local.timestamp_opt(timestamp, 0).single() {
        Some(datetime) => datetime.format(LOCAL_TIME_FORMAT).to_string(),
        None => timestamp.to_string(),
    }
}

/// 当前本地时间字符串
pub fn now_stamp() -> String {
    Local::now().format(LOCAL_TIME_FORMAT).to_string()
}
