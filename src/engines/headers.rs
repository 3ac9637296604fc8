// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use reqwest::header::{HeaderMap, HeaderValue};
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::Mutex;

const USER_AGENTS: &[&str] = &[
    // Chrome Windows
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36 Edg/120.0.0.0",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/119.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/118.0.0.0 Safari/537.36",
    // Chrome macOS
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/119.0.0.0 Safari/537.36",
    // Firefox
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:109.0) Gecko/20100101 Firefox/121.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:109.0) Gecko/20100101 Firefox/121.0",
    // Safari
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.2 Safari/605.1.15",
];

const ACCEPT_LANGUAGES: &[&str] = &[
    "zh-CN,zh;q=0.9,en-US;q=0.8,en;q=0.7",
    "zh-CN,zh;q=0.9",
    "zh-CN,zh;q=0.9,en;q=0.8",
    "en-US,en;q=0.9,zh-CN;q=0.8,zh;q=0.7",
];

const DEFAULT_REFERER: &str = "https://www.bilibili.com/";
const PAGE_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";
const API_ACCEPT: &str = "application/json, text/plain, */*";

/// 请求头构造错误
#[derive(Error, Debug)]
pub enum HeaderError {
    /// 凭证内容含有无法放入请求头的字符
    #[error("凭证内容无法作为请求头使用")]
    InvalidCookie,
}

/// 请求头池
///
/// 维护一个浏览器会话形态的请求头集合。User-Agent从固定池中
/// 选取，按墙钟间隔轮换而非每次请求随机，以模拟持续的浏览器
/// 会话；触发反爬时可强制轮换。每个工作器独占一个实例，
/// 轮换状态不跨目标共享。
pub struct HeaderPool {
    active_ua: Mutex<&'static str>,
    last_rotation: Mutex<Instant>,
    rotation_interval: Duration,
    accept_language: &'static str,
    cookie: Option<HeaderValue>,
}

impl HeaderPool {
    /// 创建请求头池
    ///
    /// # 参数
    ///
    /// * `rotation_interval` - User-Agent轮换间隔
    /// * `cookie` - 可选的凭证字符串，存在时注入每个请求
    pub fn new(rotation_interval: Duration, cookie: Option<&str>) -> Result<Self, HeaderError> {
        let cookie = match cookie {
            Some(raw) => {
                Some(HeaderValue::from_str(raw.trim()).map_err(|_| HeaderError::InvalidCookie)?)
            }
            None => None,
        };

        Ok(Self {
            active_ua: Mutex::new(pick_user_agent()),
            last_rotation: Mutex::new(Instant::now()),
            rotation_interval,
            accept_language: ACCEPT_LANGUAGES[rand::random_range(0..ACCEPT_LANGUAGES.len())],
            cookie,
        })
    }

    /// 页面请求头
    ///
    /// Referer缺省为站点首页，请求视频页时传入视频地址。
    pub async fn page_headers(&self, referer: Option<&str>) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("Accept", HeaderValue::from_static(PAGE_ACCEPT));
        headers.insert("Accept-Encoding", HeaderValue::from_static("gzip, deflate, br"));
        headers.insert(
            "Accept-Language",
            HeaderValue::from_static(self.accept_language),
        );
        headers.insert("Connection", HeaderValue::from_static("keep-alive"));
        headers.insert("Cache-Control", HeaderValue::from_static("max-age=0"));
        headers.insert("Sec-Fetch-Dest", HeaderValue::from_static("document"));
        headers.insert("Sec-Fetch-Mode", HeaderValue::from_static("navigate"));
        headers.insert("Sec-Fetch-Site", HeaderValue::from_static("same-origin"));
        headers.insert("Sec-Fetch-User", HeaderValue::from_static("?1"));
        headers.insert("Upgrade-Insecure-Requests", HeaderValue::from_static("1"));
        headers.insert("DNT", HeaderValue::from_static("1"));
        headers.insert("Priority", HeaderValue::from_static("u=0, i"));
        headers.insert("Host", HeaderValue::from_static("www.bilibili.com"));
        headers.insert(
            "User-Agent",
            HeaderValue::from_static(self.current_user_agent().await),
        );

        let referer_value = referer
            .and_then(|r| HeaderValue::from_str(r).ok())
            .unwrap_or_else(|| HeaderValue::from_static(DEFAULT_REFERER));
        headers.insert("Referer", referer_value);

        if let Some(cookie) = &self.cookie {
            headers.insert("Cookie", cookie.clone());
        }

        headers
    }

    /// 接口请求头
    ///
    /// # 参数
    ///
    /// * `referer` - 关联的视频页面地址
    pub async fn api_headers(&self, referer: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("Accept", HeaderValue::from_static(API_ACCEPT));
        headers.insert(
            "Accept-Language",
            HeaderValue::from_static("zh-CN,zh;q=0.9"),
        );
        headers.insert("Connection", HeaderValue::from_static("keep-alive"));
        headers.insert("Origin", HeaderValue::from_static("https://www.bilibili.com"));
        headers.insert(
            "User-Agent",
            HeaderValue::from_static(self.current_user_agent().await),
        );

        let referer_value = HeaderValue::from_str(referer)
            .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_REFERER));
        headers.insert("Referer", referer_value);

        if let Some(cookie) = &self.cookie {
            headers.insert("Cookie", cookie.clone());
        }

        headers
    }

    /// 强制更换User-Agent，触发反爬后调用
    pub async fn rotate_user_agent(&self) {
        // 与current_user_agent保持一致的加锁顺序
        let mut last_rotation = self.last_rotation.lock().await;
        *self.active_ua.lock().await = pick_user_agent();
        *last_rotation = Instant::now();
    }

    /// 当前生效的User-Agent
    pub async fn active_user_agent(&self) -> &'static str {
        *self.active_ua.lock().await
    }

    async fn current_user_agent(&self) -> &'static str {
        let mut last_rotation = self.last_rotation.lock().await;
        if last_rotation.elapsed() > self.rotation_interval {
            *self.active_ua.lock().await = pick_user_agent();
            *last_rotation = Instant::now();
        }
        *self.active_ua.lock().await
    }
}

fn pick_user_agent() -> &'static str {
    USER_AGENTS[rand::random_range(0..USER_AGENTS.len())]
}
