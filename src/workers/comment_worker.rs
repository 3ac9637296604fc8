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

use std::path::Path;

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::comments::paginator::{CommentPaginator, TraversalOutcome, TraversalState};
use crate::config::settings::{CommentSettings, OutputSettings};
use crate::domain::models::comment::COMMENT_CSV_HEADERS;
use crate::domain::models::target::Target;
use crate::engines::executor::Fetcher;
use crate::sink::csv::{rows_on_disk, CsvSink};
use crate::sink::RecordSink;
use crate::utils::filename::title_prefix;

/// 评论CSV文件名中标题保留的字符数
const COMMENT_TITLE_CHARS: usize = 12;

/// 标题解析全部失败时的占位
const UNKNOWN_TITLE: &str = "未识别";

/// 视频信息接口，标题解析的最后一级兜底
const VIEW_API_PATH: &str = "/x/web-interface/view";

static BARE_AID_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#""aid":(\d+)"#).unwrap());
static TITLE_TAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<title[^>]*>(.*?)</title>").unwrap());
static JSON_LD_NAME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#""name":"(.*?)""#).unwrap());

/// 视频信息接口响应，只取标题
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ViewResponse {
    code: i64,
    data: ViewData,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ViewData {
    title: String,
}

/// 评论工作器
///
/// 先从视频页面解析出数字ID与标题，再交给分页遍历器逐页
/// 抓取评论并写入CSV。解析失败不会中止流程，以("0", 占位
/// 标题)继续，让评论接口自然返回异常码后结束。
pub struct CommentWorker<'a, F: Fetcher> {
    fetcher: &'a F,
    comments: CommentSettings,
    output: &'a OutputSettings,
    cancel: CancellationToken,
}

impl<'a, F: Fetcher> CommentWorker<'a, F> {
    pub fn new(
        fetcher: &'a F,
        comments: CommentSettings,
        output: &'a OutputSettings,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            fetcher,
            comments,
            output,
            cancel,
        }
    }

    /// 处理一个评论目标，返回遍历结果
    pub async fn process(&self, target: &Target) -> Result<TraversalOutcome> {
        let referer = format!("{}/", target.page_url());
        let (oid, title) = self.resolve_target(target, &referer).await;
        info!("开始爬取视频 {} 的评论", title);

        let filename = format!("{}_评论.csv", title_prefix(&title, COMMENT_TITLE_CHARS));
        let path = Path::new(&self.output.data_dir)
            .join("comment")
            .join(filename);
        let mut sink = CsvSink::create(&path, COMMENT_CSV_HEADERS).context("创建评论CSV失败")?;

        let paginator =
            CommentPaginator::new(self.fetcher, self.comments.clone(), self.cancel.clone());
        let outcome = paginator
            .traverse(&oid, &referer, |row| {
                sink.write_row(&row.csv_row())?;
                Ok(())
            })
            .await;
        sink.flush().context("评论CSV刷盘失败")?;
        self.report(&outcome, &path);
        Ok(outcome)
    }

    /// 解析目标的数字ID与标题
    ///
    /// ID从页面正文扫描，优先匹配携带BV号的形态。标题依次
    /// 尝试title标签、JSON-LD、视频信息接口。
    async fn resolve_target(&self, target: &Target, referer: &str) -> (String, String) {
        info!("获取视频信息: {}", target.bv());
        let body = match self.fetcher.fetch_page(referer).await {
            Ok(page) => page.body,
            Err(err) => {
                error!("获取视频信息失败: {}", err);
                return ("0".to_string(), UNKNOWN_TITLE.to_string());
            }
        };

        let oid = match scan_aid(&body, target.bv()) {
            Some(oid) => oid,
            None => {
                error!("获取视频信息失败: 页面中未找到aid: {}", target.bv());
                return ("0".to_string(), UNKNOWN_TITLE.to_string());
            }
        };

        let mut title = scan_title(&body)
            .filter(|title| !title.is_empty())
            .unwrap_or_else(|| UNKNOWN_TITLE.to_string());
        if title == UNKNOWN_TITLE {
            if let Some(api_title) = self.title_from_api(target.bv()).await {
                title = api_title;
            }
        }
        (oid, title)
    }

    /// 视频信息接口兜底取标题
    async fn title_from_api(&self, bv: &str) -> Option<String> {
        let url = format!("{}{}?bvid={}", self.comments.api_base, VIEW_API_PATH, bv);
        let page = self
            .fetcher
            .fetch_json(&url, "https://www.bilibili.com/", &[])
            .await
            .ok()?;
        let view: ViewResponse = serde_json::from_str(&page.body).ok()?;
        if view.code == 0 && !view.data.title.is_empty() {
            Some(view.data.title)
        } else {
            None
        }
    }

    fn report(&self, outcome: &TraversalOutcome, path: &Path) {
        match outcome.state {
            TraversalState::Completed => {
                info!("数据已保存到: {}", path.display());
            }
            TraversalState::Aborted => {
                warn!(
                    "评论爬取中止，已保留 {} 条评论: {}",
                    outcome.emitted(),
                    path.display()
                );
            }
            TraversalState::Interrupted => {
                // 中断后以磁盘上的行数为准，内存计数可能领先于落盘
                let actual = rows_on_disk(path).unwrap_or(outcome.emitted());
                info!("程序被用户中断，已爬取 {} 条评论", actual);
                info!("数据已保存到: {}", path.display());
            }
        }
    }
}

/// 从页面脚本里扫描视频的数字ID
fn scan_aid(body: &str, bv: &str) -> Option<String> {
    let with_bvid = Regex::new(&format!(r#""aid":(\d+),"bvid":"{}""#, regex::escape(bv))).ok()?;
    if let Some(captures) = with_bvid.captures(body) {
        return captures.get(1).map(|m| m.as_str().to_string());
    }
    BARE_AID_RE
        .captures(body)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str().to_string())
}

/// 从title标签或JSON-LD里取标题，去掉站点后缀
fn scan_title(body: &str) -> Option<String> {
    if let Some(captures) = TITLE_TAG_RE.captures(body) {
        let raw = captures.get(1).map(|m| m.as_str().trim()).unwrap_or_default();
        let title = if raw.contains(" - 哔哩哔哩") {
            raw.split(" - 哔哩哔哩").next().unwrap_or_default()
        } else if raw.contains(" - bilibili") {
            raw.split(" - bilibili").next().unwrap_or_default()
        } else {
            raw
        };
        return Some(title.to_string());
    }
    JSON_LD_NAME_RE
        .captures(body)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
#[path = "comment_worker_test.rs"]
mod tests;
