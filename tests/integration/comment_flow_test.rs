// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::extract::Query;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

use bilicrawl::comments::paginator::{CommentPaginator, TraversalState};
use bilicrawl::domain::models::comment::COMMENT_CSV_HEADERS;
use bilicrawl::sink::csv::CsvSink;
use bilicrawl::sink::RecordSink;

use crate::helpers;

fn reply_json(rpid: u64, rcount: i64) -> Value {
    json!({
        "rpid": rpid,
        "member": {
            "mid": rpid * 10,
            "uname": format!("用户{}", rpid),
            "sex": "保密",
            "sign": "",
            "avatar": "",
            "level_info": {"current_level": 4},
            "vip": {"status": 0}
        },
        "content": {"message": format!("评论{}", rpid)},
        "ctime": 1700000000,
        "rcount": rcount,
        "like": 0,
        "reply_control": {"location": "IP属地：广东"}
    })
}

fn page_json(replies: Vec<Value>, is_end: bool) -> Value {
    json!({
        "code": 0,
        "message": "0",
        "data": {"replies": replies, "cursor": {"is_end": is_end}}
    })
}

/// 单页主楼带一条有3个回复的评论，复刻典型的楼中楼结构
fn thread_api(main_hits: Arc<AtomicUsize>, nested_hits: Arc<AtomicUsize>) -> Router {
    Router::new()
        .route(
            "/x/v2/reply/main",
            get(move |Query(params): Query<HashMap<String, String>>| {
                let hits = main_hits.clone();
                async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                    match params.get("pn").map(String::as_str) {
                        Some("1") => Json(page_json(
                            vec![reply_json(100, 3), reply_json(200, 0)],
                            true,
                        ))
                        .into_response(),
                        _ => Json(json!({"code": -400, "message": "请求错误", "data": null}))
                            .into_response(),
                    }
                }
            }),
        )
        .route(
            "/x/v2/reply/reply",
            get(move |Query(params): Query<HashMap<String, String>>| {
                let hits = nested_hits.clone();
                async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                    if params.get("root").map(String::as_str) == Some("100") {
                        Json(page_json(
                            vec![reply_json(101, 0), reply_json(102, 0), reply_json(103, 0)],
                            true,
                        ))
                        .into_response()
                    } else {
                        Json(json!({"code": -400, "message": "请求错误", "data": null}))
                            .into_response()
                    }
                }
            }),
        )
}

async fn crawl_to_csv(
    base: &str,
    dir: &TempDir,
) -> (TraversalState, u64, Vec<String>) {
    let executor = helpers::test_executor();
    let paginator = CommentPaginator::new(
        &executor,
        helpers::comment_settings(base),
        CancellationToken::new(),
    );

    let path = dir.path().join("comment").join("集成_评论.csv");
    let mut sink = CsvSink::create(&path, COMMENT_CSV_HEADERS).unwrap();
    let referer = format!("{}/video/BV1xx411c7mD/", base);
    let outcome = paginator
        .traverse("114514", &referer, |row| {
            sink.write_row(&row.csv_row())?;
            Ok(())
        })
        .await;
    sink.flush().unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    let lines = content.lines().map(str::to_string).collect();
    (outcome.state, outcome.emitted(), lines)
}

#[tokio::test]
async fn thread_with_replies_lands_in_reading_order() {
    let main_hits = Arc::new(AtomicUsize::new(0));
    let nested_hits = Arc::new(AtomicUsize::new(0));
    let base = helpers::serve(thread_api(main_hits.clone(), nested_hits.clone())).await;
    let dir = TempDir::new().unwrap();

    let (state, emitted, lines) = crawl_to_csv(&base, &dir).await;

    assert_eq!(state, TraversalState::Completed);
    assert_eq!(emitted, 5);
    assert_eq!(lines.len(), 6);
    assert_eq!(lines[0], format!("\u{feff}{}", COMMENT_CSV_HEADERS.join(",")));
    assert!(lines[1].starts_with("1,,100,1000,用户100,"));
    assert!(lines[2].starts_with("2,100,101,"));
    assert!(lines[3].starts_with("3,100,102,"));
    assert!(lines[4].starts_with("4,100,103,"));
    assert!(lines[5].starts_with("5,,200,"));
    assert_eq!(main_hits.load(Ordering::SeqCst), 1);
    assert_eq!(nested_hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn main_pagination_advances_until_server_signals_end() {
    let main_hits = Arc::new(AtomicUsize::new(0));
    let hits = main_hits.clone();
    let app = Router::new().route(
        "/x/v2/reply/main",
        get(move |Query(params): Query<HashMap<String, String>>| {
            let hits = hits.clone();
            async move {
                hits.fetch_add(1, Ordering::SeqCst);
                match params.get("pn").map(String::as_str) {
                    Some("1") => Json(page_json(vec![reply_json(11, 0)], false)),
                    Some("2") => Json(page_json(vec![reply_json(22, 0)], true)),
                    _ => Json(json!({"code": -400, "message": "请求错误", "data": null})),
                }
            }
        }),
    );
    let base = helpers::serve(app).await;
    let dir = TempDir::new().unwrap();

    let (state, emitted, lines) = crawl_to_csv(&base, &dir).await;

    assert_eq!(state, TraversalState::Completed);
    assert_eq!(emitted, 2);
    assert_eq!(lines.len(), 3);
    assert!(lines[1].starts_with("1,,11,"));
    assert!(lines[2].starts_with("2,,22,"));
    assert_eq!(main_hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn platform_error_leaves_header_only_csv() {
    let app = Router::new().route(
        "/x/v2/reply/main",
        get(|| async { Json(json!({"code": -404, "message": "啥都木有", "data": null})) }),
    );
    let base = helpers::serve(app).await;
    let dir = TempDir::new().unwrap();

    let (state, emitted, lines) = crawl_to_csv(&base, &dir).await;

    assert_eq!(state, TraversalState::Completed);
    assert_eq!(emitted, 0);
    assert_eq!(lines.len(), 1);
}
