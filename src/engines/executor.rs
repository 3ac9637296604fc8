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

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::settings::{FetchSettings, HeaderSettings};
use crate::engines::headers::{HeaderError, HeaderPool};
use crate::engines::pacing::PacingPolicy;

/// 视为反爬拦截的HTTP状态码
const BLOCK_STATUS_CODES: &[u16] = &[403, 429, 503];

/// 反爬页面关键词，按提示类型分组
const BLOCK_KEYWORD_GROUPS: &[(&str, &[&str])] = &[
    ("验证页面", &["验证", "安全验证", "人机验证", "recaptcha"]),
    ("访问限制", &["访问受限", "频率过高", "请稍后再试"]),
    ("异常响应", &["异常访问", "非法请求"]),
];

/// 一次成功抓取的结果
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// 响应正文
    pub body: String,
    /// HTTP状态码
    pub http_status: u16,
}

/// 抓取错误类型
#[derive(Error, Debug)]
pub enum FetchError {
    /// 重试耗尽时仍处于反爬拦截状态
    #[error("触发反爬限制 (HTTP {http_status})")]
    SoftBlock {
        /// 最后一次拦截时的状态码，关键词命中时为200
        http_status: u16,
    },

    /// 重试耗尽，网络或内容层面的失败
    #[error("请求失败，已尝试{attempts}次: {reason}")]
    Exhausted { attempts: u32, reason: String },

    /// 重定向循环，立即放弃
    #[error("重定向过多: {0}")]
    RedirectLoop(String),

    /// 凭证无法注入请求头
    #[error("凭证错误: {0}")]
    Credential(#[from] HeaderError),

    /// HTTP客户端构建失败
    #[error("客户端错误: {0}")]
    Client(#[from] reqwest::Error),
}

impl FetchError {
    /// 是否为反爬拦截造成的失败
    pub fn is_soft_block(&self) -> bool {
        matches!(self, FetchError::SoftBlock { .. })
    }
}

/// 抓取器接口
///
/// 请求执行层的抽象，按目标页面和JSON接口两种期望抓取。
/// 工作器与分页器都通过该接口发起请求，便于在测试中以
/// 脚本化实现替换。
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// 抓取HTML页面
    async fn fetch_page(&self, url: &str) -> Result<FetchedPage, FetchError>;

    /// 抓取JSON接口
    ///
    /// # 参数
    ///
    /// * `url` - 接口地址
    /// * `referer` - 关联的视频页面地址
    /// * `params` - 查询参数
    async fn fetch_json(
        &self,
        url: &str,
        referer: &str,
        params: &[(&str, String)],
    ) -> Result<FetchedPage, FetchError>;
}

/// 响应内容的期望类型，决定内容层面的校验项
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expect {
    Html,
    Json,
}

/// 请求执行器
///
/// 负责发出所有HTTP请求：每次请求前施加强制延迟，请求后对
/// 响应做反爬分类，命中拦截时轮换User-Agent并冷却后在重试
/// 预算内重试。每个工作器独占一个实例，严格串行发出请求。
pub struct RequestExecutor {
    client: reqwest::Client,
    headers: HeaderPool,
    pacing: PacingPolicy,
    max_retries: u32,
    min_content_length: usize,
}

impl RequestExecutor {
    /// 创建请求执行器
    ///
    /// # 参数
    ///
    /// * `fetch` - 请求节奏与重试配置
    /// * `headers` - 请求头轮换配置
    /// * `cookie` - 可选凭证，注入每个请求
    pub fn new(
        fetch: &FetchSettings,
        headers: &HeaderSettings,
        cookie: Option<&str>,
    ) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(fetch.timeout_secs))
            .build()?;

        let pool = HeaderPool::new(
            Duration::from_secs(headers.ua_rotation_interval_secs),
            cookie,
        )?;

        Ok(Self {
            client,
            headers: pool,
            pacing: PacingPolicy::from_settings(fetch),
            max_retries: fetch.max_retries.max(1),
            min_content_length: fetch.min_content_length,
        })
    }

    /// 当前生效的User-Agent，供上层记录
    pub async fn active_user_agent(&self) -> &'static str {
        self.headers.active_user_agent().await
    }

    async fn fetch_inner(
        &self,
        url: &str,
        referer: &str,
        params: &[(&str, String)],
        expect: Expect,
    ) -> Result<FetchedPage, FetchError> {
        let mut last_reason = String::from("未发出任何请求");
        // 记录最后一次失败是否为反爬拦截，决定最终错误类型
        let mut last_block: Option<u16> = None;

        for attempt in 1..=self.max_retries {
            tokio::time::sleep(self.pacing.request_delay()).await;

            let header_map = match expect {
                Expect::Html => self.headers.page_headers(Some(referer)).await,
                Expect::Json => self.headers.api_headers(referer).await,
            };

            let mut request = self.client.get(url).headers(header_map);
            if !params.is_empty() {
                request = request.query(params);
            }

            debug!(url, attempt, "发送请求");

            let response = match request.send().await {
                Ok(response) => response,
                Err(err) => {
                    if err.is_redirect() {
                        return Err(FetchError::RedirectLoop(err.to_string()));
                    }
                    last_block = None;
                    last_reason = err.to_string();
                    if err.is_timeout() {
                        warn!(url, attempt, "请求超时，追加等待后重试");
                        tokio::time::sleep(self.pacing.timeout_extra_delay).await;
                    } else {
                        warn!(url, attempt, error = %err, "请求异常");
                    }
                    continue;
                }
            };

            let status = response.status().as_u16();
            let content_type = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("")
                .to_string();

            let body = match response.text().await {
                Ok(text) => text,
                Err(err) => {
                    last_block = None;
                    last_reason = format!("读取响应失败: {}", err);
                    warn!(url, attempt, error = %err, "读取响应失败");
                    continue;
                }
            };

            if BLOCK_STATUS_CODES.contains(&status) {
                last_block = Some(status);
                last_reason = format!("HTTP {}", status);
                warn!(url, attempt, status, "命中反爬状态码");
                if attempt < self.max_retries {
                    self.recover_from_block().await;
                }
                continue;
            }

            if !(200..300).contains(&status) {
                last_block = None;
                last_reason = format!("HTTP {}", status);
                warn!(url, attempt, status, "非预期状态码");
                continue;
            }

            if expect == Expect::Html {
                if let Some((group, keyword)) = detect_block_signal(&body) {
                    last_block = Some(status);
                    last_reason = format!("{}: {}", group, keyword);
                    warn!(url, attempt, group, keyword, "页面命中反爬关键词");
                    if attempt < self.max_retries {
                        self.recover_from_block().await;
                    }
                    continue;
                }

                if !content_type.contains("text/html") {
                    last_block = None;
                    last_reason = format!("非HTML响应: {}", content_type);
                    warn!(url, attempt, content_type, "非HTML响应");
                    continue;
                }

                if body.len() < self.min_content_length {
                    last_block = None;
                    last_reason = format!("响应过短 ({} 字节)", body.len());
                    warn!(url, attempt, length = body.len(), "响应内容过短");
                    continue;
                }
            }

            return Ok(FetchedPage {
                body,
                http_status: status,
            });
        }

        match last_block {
            Some(http_status) => Err(FetchError::SoftBlock { http_status }),
            None => Err(FetchError::Exhausted {
                attempts: self.max_retries,
                reason: last_reason,
            }),
        }
    }

    /// 反爬恢复：轮换User-Agent并冷却一段明显长于正常节奏的时间
    async fn recover_from_block(&self) {
        self.headers.rotate_user_agent().await;
        let cooldown = self.pacing.cooldown();
        warn!(cooldown_secs = cooldown.as_secs(), "已更换User-Agent，进入冷却");
        tokio::time::sleep(cooldown).await;
    }
}

#[async_trait]
impl Fetcher for RequestExecutor {
    async fn fetch_page(&self, url: &str) -> Result<FetchedPage, FetchError> {
        self.fetch_inner(url, url, &[], Expect::Html).await
    }

    async fn fetch_json(
        &self,
        url: &str,
        referer: &str,
        params: &[(&str, String)],
    ) -> Result<FetchedPage, FetchError> {
        self.fetch_inner(url, referer, params, Expect::Json).await
    }
}

/// 检测页面正文中的反爬关键词
///
/// 命中时返回提示类型与关键词。
pub(crate) fn detect_block_signal(body: &str) -> Option<(&'static str, &'static str)> {
    let text = body.to_lowercase();
    for (group, keywords) in BLOCK_KEYWORD_GROUPS {
        for keyword in *keywords {
            if text.contains(&keyword.to_lowercase()) {
                return Some((group, keyword));
            }
        }
    }
    None
}

#[cfg(test)]
#[path = "executor_test.rs"]
mod tests;
