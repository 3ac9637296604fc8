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
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::comments::paginator::TraversalState;
use crate::config::settings::Settings;
use crate::domain::models::target::Target;
use crate::engines::executor::RequestExecutor;
use crate::sink::error_log::ErrorLog;
use crate::workers::comment_worker::CommentWorker;
use crate::workers::video_worker::VideoWorker;

/// 一次批量运行的汇总
#[derive(Debug, Clone, Copy)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
}

/// 批量调度器
///
/// 每个目标由独立任务处理，任务各自持有自己的请求执行器，
/// 头部轮换与节奏控制不跨目标共享。并发度由配置决定，
/// 默认串行。
pub struct BatchRunner {
    settings: Settings,
    cookie: Option<String>,
    cancel: CancellationToken,
}

impl BatchRunner {
    pub fn new(settings: Settings, cookie: Option<String>, cancel: CancellationToken) -> Self {
        BatchRunner {
            settings,
            cookie,
            cancel,
        }
    }

    /// 批量抓取视频元数据
    pub async fn run_videos(&self, targets: Vec<Target>) -> BatchSummary {
        let total = targets.len();
        info!("找到 {} 个视频ID", total);
        info!(
            "配置: 延迟={}毫秒, 超时={}秒, 重试={}次",
            self.settings.fetch.request_delay_ms,
            self.settings.fetch.timeout_secs,
            self.settings.fetch.max_retries
        );

        let started = Instant::now();
        let error_log = Arc::new(ErrorLog::new(Path::new(&self.settings.output.error_log)));
        let semaphore = Arc::new(Semaphore::new(self.settings.batch.concurrency.max(1)));
        let mut join_set = JoinSet::new();

        for (index, target) in targets.into_iter().enumerate() {
            let settings = self.settings.clone();
            let cookie = self.cookie.clone();
            let cancel = self.cancel.clone();
            let error_log = Arc::clone(&error_log);
            let semaphore = Arc::clone(&semaphore);
            join_set.spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => return false,
                };
                if cancel.is_cancelled() {
                    return false;
                }
                let executor = match RequestExecutor::new(
                    &settings.fetch,
                    &settings.headers,
                    cookie.as_deref(),
                ) {
                    Ok(executor) => executor,
                    Err(err) => {
                        error!("请求执行器初始化失败: {}", err);
                        return false;
                    }
                };
                let worker = VideoWorker::new(&executor, &settings.output, &error_log);
                worker.process(&target, index + 1).await.is_ok()
            });
        }

        let summary = self.collect(&mut join_set, total, started).await;

        info!(
            "完成! 成功处理 {}/{} 个视频",
            summary.succeeded, summary.total
        );
        if summary.succeeded < summary.total {
            info!(
                "失败 {} 个，详见 {}",
                summary.total - summary.succeeded,
                self.settings.output.error_log
            );
        }
        let elapsed = started.elapsed().as_secs_f64();
        info!("总耗时: {:.1} 分钟", elapsed / 60.0);
        if total > 0 {
            info!("平均每个视频: {:.1} 秒", elapsed / total as f64);
        }
        summary
    }

    /// 批量抓取评论
    ///
    /// 只有服务端宣告结束的目标计为成功，中断或中止的
    /// 目标保留已落盘的部分数据但不计入。
    pub async fn run_comments(&self, targets: Vec<Target>) -> BatchSummary {
        let total = targets.len();
        info!("找到 {} 个视频ID", total);

        let started = Instant::now();
        let semaphore = Arc::new(Semaphore::new(self.settings.batch.concurrency.max(1)));
        let mut join_set = JoinSet::new();

        for target in targets.into_iter() {
            let settings = self.settings.clone();
            let cookie = self.cookie.clone();
            let cancel = self.cancel.clone();
            let semaphore = Arc::clone(&semaphore);
            join_set.spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => return false,
                };
                if cancel.is_cancelled() {
                    return false;
                }
                let executor = match RequestExecutor::new(
                    &settings.fetch,
                    &settings.headers,
                    cookie.as_deref(),
                ) {
                    Ok(executor) => executor,
                    Err(err) => {
                        error!("请求执行器初始化失败: {}", err);
                        return false;
                    }
                };
                let worker = CommentWorker::new(
                    &executor,
                    settings.comments.clone(),
                    &settings.output,
                    cancel.clone(),
                );
                match worker.process(&target).await {
                    Ok(outcome) => outcome.state == TraversalState::Completed,
                    Err(err) => {
                        error!("评论目标处理失败: {}", err);
                        false
                    }
                }
            });
        }

        let summary = self.collect(&mut join_set, total, started).await;
        info!(
            "完成! 成功处理 {}/{} 个目标",
            summary.succeeded, summary.total
        );
        summary
    }

    /// 等待全部任务结束，按间隔输出进度
    async fn collect(
        &self,
        join_set: &mut JoinSet<bool>,
        total: usize,
        started: Instant,
    ) -> BatchSummary {
        let interval = self.settings.batch.progress_interval.max(1);
        let mut done = 0usize;
        let mut succeeded = 0usize;

        while let Some(joined) = join_set.join_next().await {
            done += 1;
            if joined.unwrap_or(false) {
                succeeded += 1;
            }
            if done % interval == 0 || done == total {
                let elapsed = started.elapsed().as_secs_f64();
                let remaining = elapsed / done as f64 * (total - done) as f64;
                info!(
                    "进度: {}/{} ({:.1}%) | 成功: {} | 预计剩余: {:.1}分钟",
                    done,
                    total,
                    done as f64 / total as f64 * 100.0,
                    succeeded,
                    remaining / 60.0
                );
            }
        }

        BatchSummary { total, succeeded }
    }
}

#[cfg(test)]
#[path = "batch_test.rs"]
mod tests;
