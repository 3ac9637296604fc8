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

use anyhow::{anyhow, Context, Result};
use tracing::{info, warn};

use crate::config::settings::OutputSettings;
use crate::domain::models::target::Target;
use crate::domain::models::video::{VideoRecord, VIDEO_CSV_HEADERS};
use crate::engines::executor::Fetcher;
use crate::extract::{self, ExtractError};
use crate::sink::csv::CsvSink;
use crate::sink::error_log::ErrorLog;
use crate::sink::RecordSink;
use crate::utils::filename::title_prefix;

/// 视频CSV文件名中标题保留的字符数
const VIDEO_TITLE_CHARS: usize = 3;

/// 视频元数据工作器
///
/// 对单个目标完成抓取页面、双策略提取、落盘CSV的完整
/// 流程。每个失败环节都写入错误日志后跳过该目标，不影响
/// 批次中的其他目标。
pub struct VideoWorker<'a, F: Fetcher> {
    fetcher: &'a F,
    output: &'a OutputSettings,
    error_log: &'a ErrorLog,
}

impl<'a, F: Fetcher> VideoWorker<'a, F> {
    pub fn new(fetcher: &'a F, output: &'a OutputSettings, error_log: &'a ErrorLog) -> Self {
        Self {
            fetcher,
            output,
            error_log,
        }
    }

    /// 处理一个视频目标
    ///
    /// # 参数
    ///
    /// * `target` - 视频目标
    /// * `index` - 输入列表中的行号，从1开始，用于日志定位
    pub async fn process(&self, target: &Target, index: usize) -> Result<()> {
        let url = target.page_url();
        info!("[{}] 处理: {}", index, url);

        let page = match self.fetcher.fetch_page(&url).await {
            Ok(page) => page,
            Err(err) => {
                warn!("请求失败: {}", err);
                self.log_error(&format!("请求失败: {}", url));
                return Err(anyhow!("请求失败: {}", url));
            }
        };

        if extract::is_verification_page(&page.body) {
            info!("触发验证页面，需要人工干预");
            self.log_error(&format!("触发验证: {}", url));
            return Err(anyhow!("触发验证: {}", url));
        }

        let record = match extract::extract(&page.body) {
            Ok(record) => record,
            Err(err) => {
                warn!("{}", err);
                match &err {
                    ExtractError::ScriptNotFound => {
                        self.log_error(&format!(
                            "第{}行视频找不到INITIAL_STATE脚本: {}",
                            index, url
                        ));
                    }
                    ExtractError::MissingStats => {
                        self.log_error(&format!("第{}行视频未找到统计数据: {}", index, url));
                    }
                    ExtractError::MissingField(_) => {}
                }
                self.log_error(&format!("数据提取失败: {}", url));
                return Err(anyhow!("数据提取失败: {}", url));
            }
        };

        let preview: String = record.title.chars().take(30).collect();
        info!("提取成功: {}", preview);
        self.save(&record, &url).context("保存视频CSV失败")?;
        Ok(())
    }

    /// 每个视频写独立的CSV文件，文件名取标题前3个字符
    fn save(&self, record: &VideoRecord, url: &str) -> Result<()> {
        let filename = format!(
            "{}_视频.csv",
            title_prefix(&record.title, VIDEO_TITLE_CHARS)
        );
        let path = Path::new(&self.output.data_dir)
            .join("video")
            .join(filename);
        let mut sink = CsvSink::create(&path, VIDEO_CSV_HEADERS)?;
        sink.write_row(&record.csv_row(url))?;
        sink.flush()?;
        info!("已保存: {}", sink.path().display());
        Ok(())
    }

    fn log_error(&self, message: &str) {
        if let Err(err) = self.error_log.append(message) {
            warn!("错误日志写入失败: {}", err);
        }
    }
}

#[cfg(test)]
#[path = "video_worker_test.rs"]
mod tests;
