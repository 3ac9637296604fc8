// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 命令行定义
//!
//! 两个子命令分别对应视频元数据与评论两条爬取流水线，
//! 输入都是BV号列表文件。

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "bilicrawl")]
#[command(about = "B站视频元数据与评论爬取工具")]
#[command(version)]
pub struct Cli {
    /// 数据输出目录，覆盖配置中的 output.data_dir
    #[arg(long, global = true)]
    pub output: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 批量爬取视频元数据，每个视频保存一个CSV文件
    Videos {
        /// BV号列表文件，每行一个BV号或视频地址
        #[arg(short, long, default_value = "bv_list.txt")]
        input: PathBuf,

        /// Cookie文件，缺失时以游客身份抓取
        #[arg(short, long, default_value = "bili_cookie.txt")]
        cookie: PathBuf,
    },

    /// 批量爬取评论，含楼中楼回复
    Comments {
        /// BV号列表文件，每行一个BV号或视频地址
        #[arg(short, long, default_value = "bv_list.txt")]
        input: PathBuf,

        /// Cookie文件，评论接口必须携带登录凭证
        #[arg(short, long, default_value = "bili_cookie.txt")]
        cookie: PathBuf,

        /// 只爬取一级评论，跳过楼中楼
        #[arg(long)]
        no_replies: bool,
    },
}
