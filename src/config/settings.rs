// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// 应用程序配置设置
///
/// 包含请求节奏、请求头轮换、评论分页、批处理和输出等所有配置项
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// 请求执行配置
    pub fetch: FetchSettings,
    /// 请求头轮换配置
    pub headers: HeaderSettings,
    /// 评论分页配置
    pub comments: CommentSettings,
    /// 批处理配置
    pub batch: BatchSettings,
    /// 输出配置
    pub output: OutputSettings,
}

/// 请求执行配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct FetchSettings {
    /// 每次请求前的基础延迟（毫秒）
    pub request_delay_ms: u64,
    /// 基础延迟之上的随机抖动上限（毫秒）
    pub jitter_ms: u64,
    /// 单次请求超时时间（秒）
    pub timeout_secs: u64,
    /// 单个地址的最大尝试次数
    pub max_retries: u32,
    /// 页面正文的最小可信长度（字节）
    pub min_content_length: usize,
    /// 超时重试前的额外等待（秒）
    pub timeout_extra_delay_secs: u64,
    /// 触发反爬后的冷却时间下限（秒）
    pub cooldown_min_secs: u64,
    /// 触发反爬后的冷却时间上限（秒）
    pub cooldown_max_secs: u64,
}

/// 请求头轮换配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct HeaderSettings {
    /// User-Agent轮换间隔（秒）
    pub ua_rotation_interval_secs: u64,
}

/// 评论分页配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct CommentSettings {
    /// 评论接口的基础地址
    pub api_base: String,
    /// 顶层评论每页数量
    pub page_size: u32,
    /// 楼中楼回复每页数量
    pub reply_page_size: u32,
    /// 顶层翻页间隔（毫秒）
    pub page_delay_ms: u64,
    /// 楼中楼翻页间隔（毫秒）
    pub reply_page_delay_ms: u64,
    /// 是否抓取楼中楼回复
    pub fetch_replies: bool,
}

/// 批处理配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct BatchSettings {
    /// 同时处理的目标数量
    pub concurrency: usize,
    /// 每处理多少个目标输出一次进度
    pub progress_interval: usize,
}

/// 输出配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct OutputSettings {
    /// 数据输出根目录
    pub data_dir: String,
    /// 失败记录文件
    pub error_log: String,
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 默认值 → 可选的配置文件 → 环境变量，逐层覆盖
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载的配置
    /// * `Err(ConfigError)` - 配置加载失败
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        let builder = Config::builder()
            // Default fetch pacing settings
            .set_default("fetch.request_delay_ms", 2000)?
            .set_default("fetch.jitter_ms", 1000)?
            .set_default("fetch.timeout_secs", 20)?
            .set_default("fetch.max_retries", 3)?
            .set_default("fetch.min_content_length", 15000)?
            .set_default("fetch.timeout_extra_delay_secs", 5)?
            .set_default("fetch.cooldown_min_secs", 10)?
            .set_default("fetch.cooldown_max_secs", 30)?
            // Default header rotation settings
            .set_default("headers.ua_rotation_interval_secs", 3600)?
            // Default comment pagination settings
            .set_default("comments.api_base", "https://api.bilibili.com")?
            .set_default("comments.page_size", 20)?
            .set_default("comments.reply_page_size", 10)?
            .set_default("comments.page_delay_ms", 800)?
            .set_default("comments.reply_page_delay_ms", 300)?
            .set_default("comments.fetch_replies", true)?
            // Default batch settings
            .set_default("batch.concurrency", 1)?
            .set_default("batch.progress_interval", 10)?
            // Default output settings
            .set_default("output.data_dir", "data")?
            .set_default("output.error_log", "video_errorlist.txt")?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::with_prefix("BILICRAWL").separator("__"));

        builder.build()?.try_deserialize()
    }
}

#[cfg(test)]
#[path = "settings_test.rs"]
mod tests;
