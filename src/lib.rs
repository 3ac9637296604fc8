// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 命令行模块
///
/// 定义子命令与参数
pub mod cli;

/// 评论抓取模块
///
/// 评论接口模型与分页遍历
pub mod comments;

/// 配置模块
///
/// 处理应用程序的配置设置和环境变量
pub mod config;

/// 领域模块
///
/// 包含核心业务实体：爬取目标、视频记录和评论记录
pub mod domain;

/// 引擎模块
///
/// 带节奏控制、请求头轮换和封锁识别的请求执行
pub mod engines;

/// 提取模块
///
/// 从视频页面提取结构化元数据，含回退策略
pub mod extract;

/// 输出模块
///
/// CSV落盘与错误日志
pub mod sink;

/// 工具模块
///
/// 提供通用的工具函数和辅助功能
pub mod utils;

/// 工作器模块
///
/// 单目标工作器与批量调度
pub mod workers;
