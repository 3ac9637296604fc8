// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::time::Duration;

use crate::config::settings::FetchSettings;

/// 请求节奏策略配置
///
/// 每次请求前的强制延迟与触发反爬后的冷却时间均由该策略
/// 计算。强制延迟与服务器响应速度无关，是独立的限速手段。
#[derive(Debug, Clone)]
pub struct PacingPolicy {
    /// 每次请求前的基础延迟
    pub base_delay: Duration,
    /// 基础延迟之上的随机抖动上限
    pub jitter: Duration,
    /// 超时重试前的额外等待
    pub timeout_extra_delay: Duration,
    /// 反爬冷却时间下限
    pub cooldown_min: Duration,
    /// 反爬冷却时间上限
    pub cooldown_max: Duration,
}

impl Default for PacingPolicy {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_millis(2000),
            jitter: Duration::from_millis(1000),
            timeout_extra_delay: Duration::from_secs(5),
            cooldown_min: Duration::from_secs(10),
            cooldown_max: Duration::from_secs(30),
        }
    }
}

impl PacingPolicy {
    /// 从配置创建节奏策略
    pub fn from_settings(settings: &FetchSettings) -> Self {
        Self {
            base_delay: Duration::from_millis(settings.request_delay_ms),
            jitter: Duration::from_millis(settings.jitter_ms),
            timeout_extra_delay: Duration::from_secs(settings.timeout_extra_delay_secs),
            cooldown_min: Duration::from_secs(settings.cooldown_min_secs),
            cooldown_max: Duration::from_secs(settings.cooldown_max_secs),
        }
    }

    /// 计算下一次请求前的等待时间
    pub fn request_delay(&self) -> Duration {
        if self.jitter.is_zero() {
            return self.base_delay;
        }
        let jitter_ms = rand::random_range(0..self.jitter.as_millis() as u64);
        self.base_delay + Duration::from_millis(jitter_ms)
    }

    /// 计算触发反爬后的冷却时间
    pub fn cooldown(&self) -> Duration {
        if self.cooldown_max <= self.cooldown_min {
            return self.cooldown_min;
        }
        let range_ms = rand::random_range(
            self.cooldown_min.as_millis() as u64..self.cooldown_max.as_millis() as u64,
        );
        Duration::from_millis(range_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_delay_without_jitter_is_exact() {
        let policy = PacingPolicy {
            base_delay: Duration::from_millis(500),
            jitter: Duration::ZERO,
            ..PacingPolicy::default()
        };
        assert_eq!(policy.request_delay(), Duration::from_millis(500));
    }

    #[test]
    fn request_delay_stays_within_jitter_bound() {
        let policy = PacingPolicy::default();
        for _ in 0..50 {
            let delay = policy.request_delay();
            assert!(delay >= policy.base_delay);
            assert!(delay < policy.base_delay + policy.jitter);
        }
    }

    #[test]
    fn cooldown_stays_within_range() {
        let policy = PacingPolicy::default();
        for _ in 0..50 {
            let cooldown = policy.cooldown();
            assert!(cooldown >= policy.cooldown_min);
            assert!(cooldown < policy.cooldown_max);
        }
    }

    #[test]
    fn degenerate_cooldown_range_returns_minimum() {
        let policy = PacingPolicy {
            cooldown_min: Duration::from_secs(7),
            cooldown_max: Duration::from_secs(7),
            ..PacingPolicy::default()
        };
        assert_eq!(policy.cooldown(), Duration::from_secs(7));
    }
}
