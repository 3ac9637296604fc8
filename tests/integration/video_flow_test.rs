// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::response::Html;
use axum::routing::get;
use axum::Router;
use tempfile::TempDir;

use bilicrawl::domain::models::video::{PublishTime, VIDEO_CSV_HEADERS};
use bilicrawl::engines::executor::Fetcher;
use bilicrawl::extract;
use bilicrawl::sink::csv::CsvSink;
use bilicrawl::sink::RecordSink;

use crate::helpers;

fn structured_page() -> String {
    let state = concat!(
        r#"{"videoData":{"title":"中秋晚会完整版","bvid":"BV1xx411c7mD","aid":114514,"#,
        r#""owner":{"name":"晚会官方","mid":23333},"#,
        r#""stat":{"view":123456,"danmaku":789,"like":4321,"coin":1000,"favorite":2000,"share":300,"reply":567},"#,
        r#""duration":3600,"pubdate":1700000000,"desc":"歌舞, 相声与小品","#,
        r#""tags":[{"tag_name":"晚会"},{"tag_name":"中秋"}]}}"#
    );
    format!(
        "<html><head><title>中秋晚会完整版_哔哩哔哩_bilibili</title></head>\
         <body><script>window.__INITIAL_STATE__={};(function(){{}}());</script></body></html>",
        state
    )
}

fn fallback_page() -> String {
    concat!(
        "<html><head><title>线下演出实录_哔哩哔哩_bilibili</title>",
        r#"<meta itemprop="keywords" content="线下演出实录,演出,现场,哔哩哔哩,bilibili,B站,弹幕">"#,
        r#"<meta itemprop="description" content="现场实录第一段简介, 视频播放量 54321、弹幕量 210、点赞数 3000、投硬币枚数 400、收藏人数 500、转发人数 60, 视频作者 现场搬运工, 作者简介 只搬好现场, 相关视频：其他场次">"#,
        r#"<meta itemprop="uploadDate" content="2024-05-20 18:30:00">"#,
        "</head><body><script>window.__INITIAL_STATE__=void 0; ",
        r#"var fallback={"mid":424242,"aid":777777,"duration":605};</script>"#,
        "</body></html>"
    )
    .to_string()
}

fn page_router(body: String) -> Router {
    Router::new().route(
        "/page",
        get(move || {
            let body = body.clone();
            async move { Html(body) }
        }),
    )
}

#[tokio::test]
async fn structured_page_flows_into_csv() {
    let base = helpers::serve(page_router(structured_page())).await;
    let executor = helpers::test_executor();
    let url = format!("{}/page", base);

    let page = executor.fetch_page(&url).await.unwrap();
    assert!(!extract::is_verification_page(&page.body));

    let record = extract::extract(&page.body).unwrap();
    assert_eq!(record.title, "中秋晚会完整版");
    assert_eq!(record.bvid, "BV1xx411c7mD");
    assert_eq!(record.aid, "114514");
    assert_eq!(record.author, "晚会官方");
    assert_eq!(record.stats.view, 123456);
    assert_eq!(record.duration_seconds, 3600);
    assert_eq!(record.publish_time, PublishTime::Epoch(1700000000));
    assert_eq!(record.tags, vec!["晚会", "中秋"]);

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("video").join("中秋晚_视频.csv");
    let mut sink = CsvSink::create(&path, VIDEO_CSV_HEADERS).unwrap();
    sink.write_row(&record.csv_row(&url)).unwrap();
    sink.flush().unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(
        lines[0],
        format!("\u{feff}{}", VIDEO_CSV_HEADERS.join(","))
    );
    assert!(lines[1].starts_with("中秋晚会完整版,"));
    assert!(lines[1].contains(&url));
    // 含逗号的简介整体加引号
    assert!(lines[1].contains("\"歌舞, 相声与小品\""));
    assert!(lines[1].contains("晚会,中秋"));
    assert!(lines[1].ends_with(",114514"));
}

#[tokio::test]
async fn broken_state_page_falls_back_to_meta_extraction() {
    let base = helpers::serve(page_router(fallback_page())).await;
    let executor = helpers::test_executor();
    let url = format!("{}/page", base);

    let page = executor.fetch_page(&url).await.unwrap();
    let record = extract::extract(&page.body).unwrap();

    assert_eq!(record.title, "线下演出实录");
    assert_eq!(record.aid, "777777");
    assert_eq!(record.author_id, "424242");
    assert!(record.bvid.is_empty());
    // 脚本时长比实际值偏大2秒
    assert_eq!(record.duration_seconds, 603);
    assert_eq!(record.stats.view, 54321);
    assert_eq!(record.stats.danmaku, 210);
    assert_eq!(record.stats.share, 60);
    assert_eq!(record.stats.reply, 0);
    assert_eq!(record.author, "现场搬运工");
    assert_eq!(record.author_bio, "只搬好现场");
    assert_eq!(record.description, "现场实录第一段简介");
    assert_eq!(record.tags, vec!["演出", "现场"]);
    assert_eq!(
        record.publish_time,
        PublishTime::Text("2024-05-20 18:30:00".to_string())
    );
}
