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

use anyhow::Context;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use bilicrawl::cli::{Cli, Commands};
use bilicrawl::config::settings::Settings;
use bilicrawl::domain::models::target::Target;
use bilicrawl::utils::telemetry;
use bilicrawl::workers::batch::BatchRunner;

/// 主函数
///
/// 应用程序入口点，解析命令行后分发到对应的批量流水线
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize logging
    telemetry::init_telemetry();

    let cli = Cli::parse();
    let mut settings = Settings::new().context("加载配置失败")?;
    if let Some(output) = &cli.output {
        settings.output.data_dir = output.to_string_lossy().into_owned();
    }

    // 2. Wire up Ctrl+C as a cancellation signal
    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("收到中断信号，正在停止...");
                cancel.cancel();
            }
        });
    }

    match cli.command {
        Commands::Videos { input, cookie } => {
            let targets = read_targets(&input)?;
            let cookie = match read_cookie(&cookie) {
                Ok(value) => Some(value),
                Err(_) => {
                    info!("未提供Cookie，以游客身份抓取");
                    None
                }
            };
            let runner = BatchRunner::new(settings, cookie, cancel);
            runner.run_videos(targets).await;
        }
        Commands::Comments {
            input,
            cookie,
            no_replies,
        } => {
            let targets = read_targets(&input)?;
            let cookie = read_cookie(&cookie).context("评论爬取需要Cookie")?;
            if no_replies {
                settings.comments.fetch_replies = false;
            }
            let runner = BatchRunner::new(settings, Some(cookie), cancel);
            runner.run_comments(targets).await;
        }
    }

    Ok(())
}

/// 读取目标列表文件，每行一个BV号或视频地址
///
/// 空行跳过，无法解析的行告警后跳过，不中断整个批次。
/// 整个文件没有任何可用目标时视为配置错误。
fn read_targets(path: &Path) -> anyhow::Result<Vec<Target>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("读取目标列表失败: {}", path.display()))?;

    let mut targets = Vec::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match Target::parse(line) {
            Ok(target) => targets.push(target),
            Err(err) => warn!("跳过无效目标 {}: {}", line, err),
        }
    }
    if targets.is_empty() {
        anyhow::bail!("输入文件为空: {}", path.display());
    }
    Ok(targets)
}

fn read_cookie(path: &Path) -> anyhow::Result<String> {
    let cookie = std::fs::read_to_string(path)
        .with_context(|| format!("读取Cookie文件失败: {}", path.display()))?;
    let cookie = cookie.trim().to_string();
    if cookie.is_empty() {
        anyhow::bail!("Cookie文件为空: {}", path.display());
    }
    Ok(cookie)
}
