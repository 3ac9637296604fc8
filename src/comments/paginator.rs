// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 评论分页状态机
//!
//! 每个目标一个遍历：顺序抓取一级评论页，对每条有回复的
//! 评论立即同步走完其二级分页再处理下一条，保证序号与
//! 抓取顺序一致。二级分页的失败只终止该评论的剩余回复，
//! 一级页的失败终止整个目标并保留已产出的部分结果。

use std::time::Duration;

use thiserror::Error;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::comments::api::{
    comment_row, main_page_params, nested_page_params, ReplyItem, ReplyPage, MAIN_REPLY_PATH,
    NESTED_REPLY_PATH,
};
use crate::config::settings::CommentSettings;
use crate::domain::models::comment::CommentRow;
use crate::engines::executor::{FetchError, Fetcher};

/// 每爬取100条输出一次进度
const PROGRESS_EVERY: u64 = 100;

#[derive(Error, Debug)]
pub enum CommentError {
    #[error("评论请求失败: {0}")]
    Fetch(#[from] FetchError),
    #[error("评论数据解析失败: {0}")]
    Decode(#[from] serde_json::Error),
}

/// 分页游标
///
/// 遍历过程中唯一的可变状态。`emitted` 既是累计产出行数，
/// 也是序号的来源，先自增再使用，序号从1开始。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageCursor {
    /// 当前一级评论页码，从1开始
    pub page: u32,
    /// 已产出的评论行数
    pub emitted: u64,
    /// 终止标志
    pub is_terminal: bool,
}

impl PageCursor {
    fn new() -> Self {
        PageCursor {
            page: 1,
            emitted: 0,
            is_terminal: false,
        }
    }
}

/// 遍历结束时的状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraversalState {
    /// 服务端宣告列表结束或没有更多数据
    Completed,
    /// 一级页请求或写入不可恢复失败，保留部分结果
    Aborted,
    /// 收到取消信号，在抓取间隙停止
    Interrupted,
}

/// 单个目标的遍历结果
#[derive(Debug, Clone, Copy)]
pub struct TraversalOutcome {
    /// 结束时的游标，`is_terminal` 恒为真
    pub cursor: PageCursor,
    pub state: TraversalState,
}

impl TraversalOutcome {
    /// 本次遍历产出的评论行数
    pub fn emitted(&self) -> u64 {
        self.cursor.emitted
    }
}

enum Halt {
    Interrupted,
    SinkFailed,
}

/// 评论分页遍历器
pub struct CommentPaginator<'a, F: Fetcher> {
    fetcher: &'a F,
    settings: CommentSettings,
    cancel: CancellationToken,
}

impl<'a, F: Fetcher> CommentPaginator<'a, F> {
    pub fn new(fetcher: &'a F, settings: CommentSettings, cancel: CancellationToken) -> Self {
        CommentPaginator {
            fetcher,
            settings,
            cancel,
        }
    }

    /// 遍历一个视频的全部评论
    ///
    /// 每产出一行调用一次 `emit`，行序号全局连续。取消信号
    /// 只在两次抓取之间生效，已产出的行不会回滚。
    ///
    /// # 参数
    ///
    /// * `oid` - 视频的数字ID（AID）
    /// * `referer` - 作为Referer的视频页面地址
    /// * `emit` - 行消费回调，返回错误时中止遍历
    pub async fn traverse<E>(&self, oid: &str, referer: &str, mut emit: E) -> TraversalOutcome
    where
        E: FnMut(CommentRow) -> anyhow::Result<()>,
    {
        let mut cursor = PageCursor::new();

        loop {
            if self.cancel.is_cancelled() {
                return outcome(cursor, TraversalState::Interrupted);
            }

            let params = main_page_params(oid, cursor.page, self.settings.page_size);
            let url = format!("{}{}", self.settings.api_base, MAIN_REPLY_PATH);
            let page = match self.fetch_reply_page(&url, referer, &params).await {
                Ok(page) => page,
                Err(err) => {
                    error!("评论请求失败: {}", err);
                    return outcome(cursor, TraversalState::Aborted);
                }
            };

            if page.code != 0 {
                warn!("接口返回异常: {}", page.message);
                return outcome(cursor, TraversalState::Completed);
            }
            let data = page.data.unwrap_or_default();
            let replies = match data.replies {
                Some(replies) if !replies.is_empty() => replies,
                _ => {
                    info!("没有更多评论，爬取完成");
                    return outcome(cursor, TraversalState::Completed);
                }
            };

            for reply in &replies {
                cursor.emitted += 1;
                if let Err(err) = emit(comment_row(reply, cursor.emitted, None)) {
                    error!("写入评论记录失败: {}", err);
                    return outcome(cursor, TraversalState::Aborted);
                }
                log_progress(cursor.emitted);

                if self.settings.fetch_replies && reply.rcount > 0 {
                    let nested = self
                        .traverse_replies(oid, referer, reply, &mut cursor, &mut emit)
                        .await;
                    match nested {
                        Ok(()) => {}
                        Err(Halt::Interrupted) => {
                            return outcome(cursor, TraversalState::Interrupted)
                        }
                        Err(Halt::SinkFailed) => return outcome(cursor, TraversalState::Aborted),
                    }
                }
            }

            if data.cursor.is_end {
                info!("评论爬取完成！总共爬取{}条。", cursor.emitted);
                return outcome(cursor, TraversalState::Completed);
            }

            sleep(Duration::from_millis(self.settings.page_delay_ms)).await;
            cursor.page += 1;
        }
    }

    /// 走完一条一级评论的全部二级分页
    ///
    /// 页数由回复总数推出，上界固定，失败时跳出只影响该
    /// 评论的剩余回复。
    async fn traverse_replies<E>(
        &self,
        oid: &str,
        referer: &str,
        parent: &ReplyItem,
        cursor: &mut PageCursor,
        emit: &mut E,
    ) -> Result<(), Halt>
    where
        E: FnMut(CommentRow) -> anyhow::Result<()>,
    {
        let root_id = parent.rpid.to_string();
        let page_size = self.settings.reply_page_size.max(1);
        let total_pages = ((parent.rcount as u64 + page_size as u64 - 1) / page_size as u64) as u32;

        for page_number in 1..=total_pages {
            if self.cancel.is_cancelled() {
                return Err(Halt::Interrupted);
            }

            let params = nested_page_params(oid, &root_id, page_number, page_size);
            let url = format!("{}{}", self.settings.api_base, NESTED_REPLY_PATH);
            let page = match self.fetch_reply_page(&url, referer, &params).await {
                Ok(page) => page,
                Err(err) => {
                    debug!(
                        "二级评论第{}页请求失败，放弃该评论剩余回复: {}",
                        page_number, err
                    );
                    break;
                }
            };
            if page.code != 0 {
                debug!("二级评论接口返回异常: {}", page.message);
                break;
            }
            let replies = match page.data.unwrap_or_default().replies {
                Some(replies) if !replies.is_empty() => replies,
                _ => break,
            };

            for reply in &replies {
                cursor.emitted += 1;
                if let Err(err) = emit(comment_row(reply, cursor.emitted, Some(&root_id))) {
                    error!("写入评论记录失败: {}", err);
                    return Err(Halt::SinkFailed);
                }
                log_progress(cursor.emitted);
            }

            sleep(Duration::from_millis(self.settings.reply_page_delay_ms)).await;
        }

        Ok(())
    }

    async fn fetch_reply_page(
        &self,
        url: &str,
        referer: &str,
        params: &[(&str, String)],
    ) -> Result<ReplyPage, CommentError> {
        let page = self.fetcher.fetch_json(url, referer, params).await?;
        Ok(serde_json::from_str(&page.body)?)
    }
}

fn outcome(mut cursor: PageCursor, state: TraversalState) -> TraversalOutcome {
    cursor.is_terminal = true;
    TraversalOutcome { cursor, state }
}

fn log_progress(emitted: u64) {
    if emitted % PROGRESS_EVERY == 0 {
        info!("已爬取 {} 条评论", emitted);
    }
}

#[cfg(test)]
#[path = "paginator_test.rs"]
mod tests;
