// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::Router;
use tokio::net::TcpListener;

use bilicrawl::config::settings::{CommentSettings, FetchSettings, HeaderSettings};
use bilicrawl::engines::executor::RequestExecutor;

/// 绑定随机端口启动测试服务，返回基础地址
pub async fn serve(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

/// 不等待的请求节奏，测试里重试立即发生
pub fn fast_fetch_settings() -> FetchSettings {
    FetchSettings {
        request_delay_ms: 1,
        jitter_ms: 0,
        timeout_secs: 5,
        max_retries: 3,
        min_content_length: 10,
        timeout_extra_delay_secs: 0,
        cooldown_min_secs: 0,
        cooldown_max_secs: 0,
    }
}

pub fn test_header_settings() -> HeaderSettings {
    HeaderSettings {
        ua_rotation_interval_secs: 3600,
    }
}

pub fn comment_settings(api_base: &str) -> CommentSettings {
    CommentSettings {
        api_base: api_base.to_string(),
        page_size: 20,
        reply_page_size: 10,
        page_delay_ms: 0,
        reply_page_delay_ms: 0,
        fetch_replies: true,
    }
}

pub fn test_executor() -> RequestExecutor {
    RequestExecutor::new(
        &fast_fetch_settings(),
        &test_header_settings(),
        Some("SESSDATA=integration"),
    )
    .unwrap()
}
