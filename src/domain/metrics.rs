// ==========================================
// 设备综合效率监控系统 - 指标记录
// ==========================================
// 依据: OEE_Engine_Specs_v0.2.md - 3. 数据模型
// ==========================================
// 职责: 单次计算周期产出的扁平指标记录
// 生命周期: 构造→填充→回写→丢弃,不跨周期保留
// ==========================================

use crate::binding::bindings::names;
use crate::binding::value::TagValue;
use crate::domain::types::{OeeRating, SystemStatus, TrendLabel};
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

// ==========================================
// MetricStats - 单指标滚动统计
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct MetricStats {
    pub min: f64,
    pub max: f64,
    pub avg: f64,
}

// ==========================================
// MetricRecord - 指标记录
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
    // ===== 计数 =====
    pub good_count: i64,
    pub bad_count: i64,
    pub total_count: i64,
    pub expected_part_count: f64,

    // ===== 比率 (百分数) =====
    pub quality_pct: f64,
    pub performance_pct: f64,
    pub availability_pct: f64,
    pub oee_pct: f64,
    pub oee_rating: OeeRating,

    // ===== 时长与速率 =====
    pub runtime_seconds: f64,
    pub downtime_seconds: f64,
    pub avg_cycle_time_seconds: f64,
    pub parts_per_hour: f64,
    pub runtime_formatted: String,
    pub downtime_formatted: String,
    pub system_status: SystemStatus,

    // ===== 班次 =====
    pub current_shift: u32,
    pub shift_start: NaiveTime,
    pub shift_end: NaiveTime,
    pub shift_elapsed_seconds: i64,
    pub shift_remaining_seconds: i64,
    pub shift_change_occurred: bool,
    pub shift_change_imminent: bool,

    // ===== 趋势 =====
    pub quality_trend: TrendLabel,
    pub performance_trend: TrendLabel,
    pub availability_trend: TrendLabel,
    pub oee_trend: TrendLabel,

    // ===== 滚动统计 =====
    pub quality_stats: MetricStats,
    pub performance_stats: MetricStats,
    pub availability_stats: MetricStats,
    pub oee_stats: MetricStats,

    // ===== 目标偏差 =====
    pub quality_target_delta: f64,
    pub performance_target_delta: f64,
    pub availability_target_delta: f64,
    pub oee_target_delta: f64,
    pub production_target_delta: f64,
}

impl Default for MetricRecord {
    fn default() -> Self {
        Self {
            good_count: 0,
            bad_count: 0,
            total_count: 0,
            expected_part_count: 0.0,
            quality_pct: 0.0,
            performance_pct: 0.0,
            availability_pct: 0.0,
            oee_pct: 0.0,
            oee_rating: OeeRating::Poor,
            runtime_seconds: 0.0,
            downtime_seconds: 0.0,
            avg_cycle_time_seconds: 0.0,
            parts_per_hour: 0.0,
            runtime_formatted: String::new(),
            downtime_formatted: String::new(),
            system_status: SystemStatus::Starting,
            current_shift: 1,
            shift_start: NaiveTime::MIN,
            shift_end: NaiveTime::MIN,
            shift_elapsed_seconds: 0,
            shift_remaining_seconds: 0,
            shift_change_occurred: false,
            shift_change_imminent: false,
            quality_trend: TrendLabel::InsufficientData,
            performance_trend: TrendLabel::InsufficientData,
            availability_trend: TrendLabel::InsufficientData,
            oee_trend: TrendLabel::InsufficientData,
            quality_stats: MetricStats::default(),
            performance_stats: MetricStats::default(),
            availability_stats: MetricStats::default(),
            oee_stats: MetricStats::default(),
            quality_target_delta: 0.0,
            performance_target_delta: 0.0,
            availability_target_delta: 0.0,
            oee_target_delta: 0.0,
            production_target_delta: 0.0,
        }
    }
}

impl MetricRecord {
    /// 枚举全部可回写输出字段: (逻辑名, 值)
    ///
    /// 回写器逐字段处理;未绑定的输出由回写器跳过
    pub fn output_fields(&self) -> Vec<(&'static str, TagValue)> {
        vec![
            (names::OUT_TOTAL_COUNT, TagValue::Int(self.total_count)),
            (names::OUT_QUALITY, TagValue::Number(self.quality_pct)),
            (names::OUT_PERFORMANCE, TagValue::Number(self.performance_pct)),
            (names::OUT_AVAILABILITY, TagValue::Number(self.availability_pct)),
            (names::OUT_OEE, TagValue::Number(self.oee_pct)),
            (
                names::OUT_OEE_RATING,
                TagValue::Text(self.oee_rating.to_string()),
            ),
            (
                names::OUT_AVG_CYCLE_TIME,
                TagValue::Number(self.avg_cycle_time_seconds),
            ),
            (names::OUT_PARTS_PER_HOUR, TagValue::Number(self.parts_per_hour)),
            (
                names::OUT_EXPECTED_PART_COUNT,
                TagValue::Number(self.expected_part_count),
            ),
            (
                names::OUT_DOWNTIME_SECONDS,
                TagValue::Number(self.downtime_seconds),
            ),
            (
                names::OUT_RUNTIME_FORMATTED,
                TagValue::Text(self.runtime_formatted.clone()),
            ),
            (
                names::OUT_DOWNTIME_FORMATTED,
                TagValue::Text(self.downtime_formatted.clone()),
            ),
            (
                names::OUT_SYSTEM_STATUS,
                TagValue::Text(self.system_status.to_string()),
            ),
            (
                names::OUT_CURRENT_SHIFT,
                TagValue::Int(self.current_shift as i64),
            ),
            (names::OUT_SHIFT_START, TagValue::Time(self.shift_start)),
            (names::OUT_SHIFT_END, TagValue::Time(self.shift_end)),
            (
                names::OUT_SHIFT_ELAPSED_SECONDS,
                TagValue::Int(self.shift_elapsed_seconds),
            ),
            (
                names::OUT_SHIFT_REMAINING_SECONDS,
                TagValue::Int(self.shift_remaining_seconds),
            ),
            (
                names::OUT_SHIFT_CHANGE_OCCURRED,
                TagValue::Bool(self.shift_change_occurred),
            ),
            (
                names::OUT_SHIFT_CHANGE_IMMINENT,
                TagValue::Bool(self.shift_change_imminent),
            ),
            (
                names::OUT_QUALITY_TREND,
                TagValue::Text(self.quality_trend.to_string()),
            ),
            (
                names::OUT_PERFORMANCE_TREND,
                TagValue::Text(self.performance_trend.to_string()),
            ),
            (
                names::OUT_AVAILABILITY_TREND,
                TagValue::Text(self.availability_trend.to_string()),
            ),
            (names::OUT_OEE_TREND, TagValue::Text(self.oee_trend.to_string())),
            (names::OUT_QUALITY_MIN, TagValue::Number(self.quality_stats.min)),
            (names::OUT_QUALITY_MAX, TagValue::Number(self.quality_stats.max)),
            (names::OUT_QUALITY_AVG, TagValue::Number(self.quality_stats.avg)),
            (
                names::OUT_PERFORMANCE_MIN,
                TagValue::Number(self.performance_stats.min),
            ),
            (
                names::OUT_PERFORMANCE_MAX,
                TagValue::Number(self.performance_stats.max),
            ),
            (
                names::OUT_PERFORMANCE_AVG,
                TagValue::Number(self.performance_stats.avg),
            ),
            (
                names::OUT_AVAILABILITY_MIN,
                TagValue::Number(self.availability_stats.min),
            ),
            (
                names::OUT_AVAILABILITY_MAX,
                TagValue::Number(self.availability_stats.max),
            ),
            (
                names::OUT_AVAILABILITY_AVG,
                TagValue::Number(self.availability_stats.avg),
            ),
            (names::OUT_OEE_MIN, TagValue::Number(self.oee_stats.min)),
            (names::OUT_OEE_MAX, TagValue::Number(self.oee_stats.max)),
            (names::OUT_OEE_AVG, TagValue::Number(self.oee_stats.avg)),
            (
                names::OUT_QUALITY_TARGET_DELTA,
                TagValue::Number(self.quality_target_delta),
            ),
            (
                names::OUT_PERFORMANCE_TARGET_DELTA,
                TagValue::Number(self.performance_target_delta),
            ),
            (
                names::OUT_AVAILABILITY_TARGET_DELTA,
                TagValue::Number(self.availability_target_delta),
            ),
            (
                names::OUT_OEE_TARGET_DELTA,
                TagValue::Number(self.oee_target_delta),
            ),
            (
                names::OUT_PRODUCTION_TARGET_DELTA,
                TagValue::Number(self.production_target_delta),
            ),
        ]
    }
}
