// ==========================================
// 设备综合效率监控系统 - 指标计算引擎
// ==========================================
// 依据: OEE_Engine_Specs_v0.2.md - 4.3 计算引擎
// ==========================================
// 职责: (输入 + 派生常量缓存 + 上周期标量状态) → 指标记录
// 输入: 好件数/坏件数/运行秒数/理想节拍/计划小时
// 输出: MetricRecord (班次与趋势字段由上层填充)
// ==========================================

use crate::binding::value::TagValue;
use crate::config::snapshot::ConfigSnapshot;
use crate::domain::metrics::MetricRecord;
use crate::domain::types::{OeeRating, SystemStatus, ZeroDenominatorConvention};
use chrono::NaiveDateTime;

// 运行状态时效窗口: 计数器停滞超过该秒数判定为停机
pub const RUNTIME_STALE_WINDOW_SECONDS: i64 = 5;

// 格式化字符串重算阈值: 秒数变化不超过该值时复用上次字符串
const FORMAT_RECOMPUTE_THRESHOLD_SECONDS: f64 = 0.1;

// ==========================================
// CalcInputs - 单周期原始输入
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct CalcInputs {
    pub good_count: i64,
    pub bad_count: i64,
    pub runtime_seconds: f64,
    /// 理想节拍原始值 (可能为字符串表示,经缓存解析)
    pub ideal_cycle_raw: Option<TagValue>,
    /// 计划生产小时原始值
    pub planned_hours_raw: Option<TagValue>,
}

impl CalcInputs {
    /// 生产活跃判定: 总数>0 或运行时长>0
    pub fn has_activity(&self) -> bool {
        self.good_count + self.bad_count > 0 || self.runtime_seconds > 0.0
    }
}

// ==========================================
// ConstantSlot - 派生常量缓存槽
// ==========================================
// 仅当原始值与上次所见不同时才重新解析,
// 避免热路径上的重复字符串/数值转换
#[derive(Debug, Default)]
struct ConstantSlot {
    last_raw: Option<TagValue>,
    parsed: Option<f64>,
}

impl ConstantSlot {
    /// 解析原始值 (带同一性缓存)
    ///
    /// 不变式: parsed 仅在 last_raw == 当前原始值时有效
    fn resolve(&mut self, raw: &Option<TagValue>) -> Option<f64> {
        if self.last_raw != *raw {
            self.last_raw = raw.clone();
            self.parsed = raw.as_ref().and_then(|v| v.as_number());
        }
        self.parsed
    }
}

// ==========================================
// TickState - 上周期标量状态
// ==========================================
#[derive(Debug, Default)]
struct TickState {
    last_runtime_seconds: Option<f64>,
    last_runtime_change_at: Option<NaiveDateTime>,
    last_status: SystemStatus,
    // 变化抑制缓存: 上次格式化的秒数与字符串
    runtime_fmt_value: Option<f64>,
    runtime_fmt_text: String,
    downtime_fmt_value: Option<f64>,
    downtime_fmt_text: String,
}

// ==========================================
// CalculationEngine - 指标计算引擎
// ==========================================
pub struct CalculationEngine {
    /// 性能指标零分母口径
    performance_convention: ZeroDenominatorConvention,
    /// 可用率计划时长无效口径
    availability_convention: ZeroDenominatorConvention,
    ideal_cycle: ConstantSlot,
    planned_hours: ConstantSlot,
    state: TickState,
}

impl CalculationEngine {
    /// 构造函数 (使用缺省口径: 零分母取0)
    pub fn new() -> Self {
        Self::with_conventions(
            ZeroDenominatorConvention::default(),
            ZeroDenominatorConvention::default(),
        )
    }

    /// 按显式口径构造
    ///
    /// # 参数
    /// - performance_convention: 运行时长为0时性能口径
    /// - availability_convention: 计划时长无效时可用率口径
    pub fn with_conventions(
        performance_convention: ZeroDenominatorConvention,
        availability_convention: ZeroDenominatorConvention,
    ) -> Self {
        Self {
            performance_convention,
            availability_convention,
            ideal_cycle: ConstantSlot::default(),
            planned_hours: ConstantSlot::default(),
            state: TickState::default(),
        }
    }

    /// 执行单周期计算
    ///
    /// # 参数
    /// - inputs: 原始输入
    /// - config: 配置快照 (目标与阈值)
    /// - now: 本周期时间戳 (运行状态时效判定用)
    ///
    /// # 返回
    /// 填充了计数/比率/时长/状态/目标偏差字段的 MetricRecord;
    /// 班次与趋势字段由调用方补齐
    pub fn compute(
        &mut self,
        inputs: &CalcInputs,
        config: &ConfigSnapshot,
        now: NaiveDateTime,
    ) -> MetricRecord {
        let mut record = MetricRecord::default();

        // 1. 计数
        let total = inputs.good_count + inputs.bad_count;
        record.good_count = inputs.good_count;
        record.bad_count = inputs.bad_count;
        record.total_count = total;

        // 2. 派生常量 (原始值同一性缓存)
        let ideal_cycle = self
            .ideal_cycle
            .resolve(&inputs.ideal_cycle_raw)
            .filter(|v| *v > 0.0);
        let planned_seconds = self
            .planned_hours
            .resolve(&inputs.planned_hours_raw)
            .filter(|v| *v > 0.0)
            .map(|hours| hours * 3600.0);

        let runtime = inputs.runtime_seconds;
        let meaningful = runtime > 0.0 && ideal_cycle.is_some();

        // 3. 质量: 运行尚未开始或节拍无效时视为"尚无意义"
        record.quality_pct = if meaningful && total > 0 {
            inputs.good_count as f64 / total as f64 * 100.0
        } else {
            0.0
        };

        // 4. 性能 (钳制到 [0,100])
        record.performance_pct = match (runtime > 0.0, ideal_cycle) {
            (true, Some(cycle)) => (total as f64 * cycle / runtime * 100.0).clamp(0.0, 100.0),
            _ => match self.performance_convention {
                ZeroDenominatorConvention::TreatAsZero => 0.0,
                // "无表现不佳的机会"口径: 仅在完全未开工时取满
                ZeroDenominatorConvention::TreatAsFull => {
                    if runtime <= 0.0 && total == 0 {
                        100.0
                    } else {
                        0.0
                    }
                }
            },
        };

        // 5. 可用率 (钳制到 [0,100])
        record.availability_pct = match planned_seconds {
            Some(ps) => (runtime / ps * 100.0).clamp(0.0, 100.0),
            None => match self.availability_convention {
                ZeroDenominatorConvention::TreatAsZero => 0.0,
                ZeroDenominatorConvention::TreatAsFull => 100.0,
            },
        };

        // 6. OEE: 三个百分数之积重整为百分数,不独立钳制
        record.oee_pct =
            record.quality_pct * record.performance_pct * record.availability_pct / 10000.0;
        record.oee_rating = if record.oee_pct >= config.good_oee_threshold {
            OeeRating::Good
        } else if record.oee_pct >= config.poor_oee_threshold {
            OeeRating::Fair
        } else {
            OeeRating::Poor
        };

        // 7. 时长与速率
        record.runtime_seconds = runtime;
        record.avg_cycle_time_seconds = if total > 0 { runtime / total as f64 } else { 0.0 };
        record.parts_per_hour = if runtime > 0.0 {
            total as f64 / runtime * 3600.0
        } else {
            0.0
        };
        record.expected_part_count = match (planned_seconds, ideal_cycle) {
            (Some(ps), Some(cycle)) => ps / cycle,
            _ => 0.0,
        };
        record.downtime_seconds = planned_seconds
            .map(|ps| (ps - runtime).max(0.0))
            .unwrap_or(0.0);

        // 8. 格式化字符串 (变化不超过0.1s时复用上次结果)
        record.runtime_formatted = Self::format_cached(
            &mut self.state.runtime_fmt_value,
            &mut self.state.runtime_fmt_text,
            runtime,
        );
        record.downtime_formatted = Self::format_cached(
            &mut self.state.downtime_fmt_value,
            &mut self.state.downtime_fmt_text,
            record.downtime_seconds,
        );

        // 9. 运行状态 (运行计数器单调推进派生)
        record.system_status = self.derive_status(runtime, now);

        // 10. 目标偏差 (独立于趋势/统计)
        record.quality_target_delta = record.quality_pct - config.quality_target;
        record.performance_target_delta = record.performance_pct - config.performance_target;
        record.availability_target_delta = record.availability_pct - config.availability_target;
        record.oee_target_delta = record.oee_pct - config.oee_target;
        record.production_target_delta = total as f64 - config.production_target as f64;

        record
    }

    /// 带变化抑制的时长格式化
    fn format_cached(last_value: &mut Option<f64>, last_text: &mut String, seconds: f64) -> String {
        let needs_recompute = match last_value {
            Some(prev) => (seconds - *prev).abs() > FORMAT_RECOMPUTE_THRESHOLD_SECONDS,
            None => true,
        };
        if needs_recompute {
            *last_value = Some(seconds);
            *last_text = format_duration(seconds);
        }
        last_text.clone()
    }

    /// 运行状态派生
    ///
    /// 口径: 首次观测→Starting; 计数器增长→Running;
    /// 计数器回绕(减小)→Starting; 停滞超过时效窗口→Stopped
    fn derive_status(&mut self, runtime: f64, now: NaiveDateTime) -> SystemStatus {
        let status = match self.state.last_runtime_seconds {
            None => {
                self.state.last_runtime_change_at = Some(now);
                SystemStatus::Starting
            }
            Some(prev) if runtime > prev => {
                self.state.last_runtime_change_at = Some(now);
                SystemStatus::Running
            }
            Some(prev) if runtime < prev => {
                // 计数器回绕,视为新一轮启动
                self.state.last_runtime_change_at = Some(now);
                SystemStatus::Starting
            }
            Some(_) => {
                let stale = self
                    .state
                    .last_runtime_change_at
                    .map(|at| (now - at).num_seconds() > RUNTIME_STALE_WINDOW_SECONDS)
                    .unwrap_or(false);
                if stale {
                    SystemStatus::Stopped
                } else {
                    self.state.last_status
                }
            }
        };
        self.state.last_runtime_seconds = Some(runtime);
        self.state.last_status = status;
        status
    }
}

impl Default for CalculationEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// 时长格式化为 "Xh YYm ZZs"
pub fn format_duration(seconds: f64) -> String {
    let total = seconds.max(0.0).round() as i64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;
    format!("{}h {:02}m {:02}s", hours, minutes, secs)
}
