// ==========================================
// 设备综合效率监控系统 - 趋势与统计跟踪器
// ==========================================
// 依据: OEE_Engine_Specs_v0.2.md - 4.5 趋势跟踪
// ==========================================
// 职责: 每指标维护有界滚动历史,分类趋势,计算最小/最大/均值
// 不变式: 0 <= 历史长度 <= 60 恒成立
// ==========================================

use crate::domain::metrics::{MetricRecord, MetricStats};
use crate::domain::types::TrendLabel;
use std::collections::VecDeque;

/// 滚动历史容量 (样本数)
pub const HISTORY_CAPACITY: usize = 60;

// 趋势阈值阶梯
const STRONG_THRESHOLD: f64 = 2.0;
const WEAK_THRESHOLD: f64 = 0.5;

// ==========================================
// MetricHistory - 单指标有界历史
// ==========================================
#[derive(Debug, Default)]
pub struct MetricHistory {
    samples: VecDeque<f64>,
}

impl MetricHistory {
    pub fn new() -> Self {
        Self {
            samples: VecDeque::with_capacity(HISTORY_CAPACITY),
        }
    }

    /// 追加样本, 超容量时逐出最旧样本 (FIFO)
    pub fn push(&mut self, value: f64) {
        if self.samples.len() >= HISTORY_CAPACITY {
            self.samples.pop_front();
        }
        self.samples.push_back(value);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// 趋势分类
    ///
    /// 口径:
    /// - 样本<2: 数据不足
    /// - 2..=4: 末样本减首样本,套阈值阶梯
    /// - >4: 前后两半均值之差套同一阶梯;
    ///   半长取 len/2 (整除), 奇数长度时两半重叠一个样本
    ///   (沿用现场口径,非缺陷)
    pub fn classify(&self) -> TrendLabel {
        let len = self.samples.len();
        if len < 2 {
            return TrendLabel::InsufficientData;
        }

        let delta = if len <= 4 {
            let first = self.samples.front().copied().unwrap_or(0.0);
            let last = self.samples.back().copied().unwrap_or(0.0);
            last - first
        } else {
            let half = len / 2;
            let first_mean = mean(self.samples.iter().take(len - half));
            let last_mean = mean(self.samples.iter().skip(half));
            last_mean - first_mean
        };

        classify_delta(delta)
    }

    /// 全量重算统计 (无增量聚合)
    ///
    /// # 返回
    /// - Some(MetricStats): 历史非空
    /// - None: 历史为空
    pub fn stats(&self) -> Option<MetricStats> {
        if self.samples.is_empty() {
            return None;
        }
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut sum = 0.0;
        for &v in &self.samples {
            min = min.min(v);
            max = max.max(v);
            sum += v;
        }
        Some(MetricStats {
            min,
            max,
            avg: sum / self.samples.len() as f64,
        })
    }
}

/// 阈值阶梯分类
fn classify_delta(delta: f64) -> TrendLabel {
    if delta >= STRONG_THRESHOLD {
        TrendLabel::RisingStrongly
    } else if delta >= WEAK_THRESHOLD {
        TrendLabel::Rising
    } else if delta <= -STRONG_THRESHOLD {
        TrendLabel::FallingStrongly
    } else if delta <= -WEAK_THRESHOLD {
        TrendLabel::Falling
    } else {
        TrendLabel::Stable
    }
}

fn mean<'a>(values: impl Iterator<Item = &'a f64>) -> f64 {
    let mut sum = 0.0;
    let mut count = 0usize;
    for v in values {
        sum += v;
        count += 1;
    }
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

// ==========================================
// TrendTracker - 四指标趋势跟踪器
// ==========================================
pub struct TrendTracker {
    quality: MetricHistory,
    performance: MetricHistory,
    availability: MetricHistory,
    oee: MetricHistory,
}

impl TrendTracker {
    pub fn new() -> Self {
        Self {
            quality: MetricHistory::new(),
            performance: MetricHistory::new(),
            availability: MetricHistory::new(),
            oee: MetricHistory::new(),
        }
    }

    /// 记录一个周期的指标值 (调用方负责活跃判定)
    pub fn record(&mut self, record: &MetricRecord) {
        self.quality.push(record.quality_pct);
        self.performance.push(record.performance_pct);
        self.availability.push(record.availability_pct);
        self.oee.push(record.oee_pct);
    }

    /// 将趋势标签与滚动统计填入指标记录
    pub fn apply(&self, record: &mut MetricRecord) {
        record.quality_trend = self.quality.classify();
        record.performance_trend = self.performance.classify();
        record.availability_trend = self.availability.classify();
        record.oee_trend = self.oee.classify();

        record.quality_stats = self.quality.stats().unwrap_or_default();
        record.performance_stats = self.performance.stats().unwrap_or_default();
        record.availability_stats = self.availability.stats().unwrap_or_default();
        record.oee_stats = self.oee.stats().unwrap_or_default();
    }

    /// 质量历史长度 (测试与诊断用)
    pub fn quality_len(&self) -> usize {
        self.quality.len()
    }
}

impl Default for TrendTracker {
    fn default() -> Self {
        Self::new()
    }
}
