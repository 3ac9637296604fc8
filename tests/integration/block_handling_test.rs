// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::extract::Query;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

use bilicrawl::comments::paginator::{CommentPaginator, TraversalState};
use bilicrawl::domain::models::comment::COMMENT_CSV_HEADERS;
use bilicrawl::engines::executor::{FetchError, Fetcher};
use bilicrawl::extract;
use bilicrawl::sink::csv::CsvSink;
use bilicrawl::sink::error_log::ErrorLog;
use bilicrawl::sink::RecordSink;

use crate::helpers;

fn single_reply_page() -> serde_json::Value {
    json!({
        "code": 0,
        "message": "0",
        "data": {
            "replies": [{
                "rpid": 900,
                "member": {
                    "mid": 9000,
                    "uname": "先到的用户",
                    "sex": "保密",
                    "sign": "",
                    "avatar": "",
                    "level_info": {"current_level": 2},
                    "vip": {"status": 0}
                },
                "content": {"message": "沙发"},
                "ctime": 1700000000,
                "rcount": 0,
                "like": 0,
                "reply_control": {"location": ""}
            }],
            "cursor": {"is_end": false}
        }
    })
}

#[tokio::test]
async fn rate_limited_page_aborts_crawl_but_keeps_earlier_rows() {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    let app = Router::new().route(
        "/x/v2/reply/main",
        get(move |Query(params): Query<HashMap<String, String>>| {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                if params.get("pn").map(String::as_str) == Some("1") {
                    Json(single_reply_page()).into_response()
                } else {
                    StatusCode::TOO_MANY_REQUESTS.into_response()
                }
            }
        }),
    );
    let base = helpers::serve(app).await;

    let executor = helpers::test_executor();
    let paginator = CommentPaginator::new(
        &executor,
        helpers::comment_settings(&base),
        CancellationToken::new(),
    );
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("comment").join("部分_评论.csv");
    let mut sink = CsvSink::create(&path, COMMENT_CSV_HEADERS).unwrap();

    let outcome = paginator
        .traverse("114514", &format!("{}/video/BV1xx411c7mD/", base), |row| {
            sink.write_row(&row.csv_row())?;
            Ok(())
        })
        .await;
    sink.flush().unwrap();

    assert_eq!(outcome.state, TraversalState::Aborted);
    assert_eq!(outcome.emitted(), 1);
    // 第1页1次，第2页重试3次后认定封锁
    assert_eq!(hits.load(Ordering::SeqCst), 4);

    let content = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[1].starts_with("1,,900,"));
}

#[tokio::test]
async fn verification_challenge_is_classified_as_soft_block() {
    const CHALLENGE_PAGE: &str = "<html><head><title>安全验证 - 哔哩哔哩</title></head>\
         <body><p>请完成安全验证后继续访问。</p></body></html>";

    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    let app = Router::new().route(
        "/page",
        get(move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Html(CHALLENGE_PAGE.to_string())
            }
        }),
    );
    let base = helpers::serve(app).await;
    let url = format!("{}/page", base);

    let executor = helpers::test_executor();
    match executor.fetch_page(&url).await {
        Err(FetchError::SoftBlock { http_status }) => assert_eq!(http_status, 200),
        other => panic!("验证页应判定为反爬拦截，实际: {:?}", other),
    }
    assert_eq!(hits.load(Ordering::SeqCst), 3);

    // 正文本身也能被提取层识别为验证页
    assert!(extract::is_verification_page(CHALLENGE_PAGE));

    let dir = TempDir::new().unwrap();
    let log_path = dir.path().join("video_errorlist.txt");
    let error_log = ErrorLog::new(Path::new(&log_path));
    error_log.append(&format!("触发验证: {}", url)).unwrap();

    let logged = std::fs::read_to_string(&log_path).unwrap();
    assert!(logged.contains(" - 触发验证: "));
    assert!(logged.contains(&url));
}
