// ==========================================
// 设备综合效率监控系统 - 配置快照
// ==========================================
// 依据: OEE_Engine_Specs_v0.2.md - 6. 配置项全集
// ==========================================
// 职责: 经绑定层读取配置句柄并缓存为类型化字段
// 口径: 刷新节奏慢于指标计算,仅由刷新步骤变更
// ==========================================

use crate::binding::bindings::{names, VariableBindings};
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

// ==========================================
// 配置缺省值
// ==========================================
pub mod defaults {
    pub const UPDATE_RATE_MS: i64 = 1000;
    pub const SHIFT_COUNT: i64 = 3;
    pub const FIRST_SHIFT_START_HOUR: u32 = 6;
    pub const QUALITY_TARGET: f64 = 95.0;
    pub const PERFORMANCE_TARGET: f64 = 85.0;
    pub const AVAILABILITY_TARGET: f64 = 90.0;
    pub const OEE_TARGET: f64 = 72.7;
    pub const PRODUCTION_TARGET: i64 = 1000;
    pub const LOGGING_LEVEL: i64 = 1;
    pub const GOOD_OEE_THRESHOLD: f64 = 80.0;
    pub const POOR_OEE_THRESHOLD: f64 = 60.0;
}

// ==========================================
// ConfigSnapshot - 配置快照
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigSnapshot {
    /// 计算周期 (毫秒)
    pub update_rate_ms: i64,
    /// 班次数
    pub shift_count: i64,
    /// 第一班开始时刻
    pub first_shift_start: NaiveTime,
    /// 质量目标 (%)
    pub quality_target: f64,
    /// 性能目标 (%)
    pub performance_target: f64,
    /// 可用率目标 (%)
    pub availability_target: f64,
    /// OEE 目标 (%)
    pub oee_target: f64,
    /// 产量目标 (件)
    pub production_target: i64,
    /// 日志详尽度 (>=2 记录解析失败)
    pub logging_level: i64,
    /// OEE 好评阈值 (%)
    pub good_oee_threshold: f64,
    /// OEE 差评阈值 (%)
    pub poor_oee_threshold: f64,
}

impl Default for ConfigSnapshot {
    fn default() -> Self {
        Self {
            update_rate_ms: defaults::UPDATE_RATE_MS,
            shift_count: defaults::SHIFT_COUNT,
            first_shift_start: NaiveTime::from_hms_opt(defaults::FIRST_SHIFT_START_HOUR, 0, 0)
                .unwrap_or(NaiveTime::MIN),
            quality_target: defaults::QUALITY_TARGET,
            performance_target: defaults::PERFORMANCE_TARGET,
            availability_target: defaults::AVAILABILITY_TARGET,
            oee_target: defaults::OEE_TARGET,
            production_target: defaults::PRODUCTION_TARGET,
            logging_level: defaults::LOGGING_LEVEL,
            good_oee_threshold: defaults::GOOD_OEE_THRESHOLD,
            poor_oee_threshold: defaults::POOR_OEE_THRESHOLD,
        }
    }
}

impl ConfigSnapshot {
    /// 经绑定层刷新全部配置字段
    ///
    /// 每项读取均带缺省回退;缺席或不可解析的配置不影响其余字段
    pub fn refresh(&mut self, bindings: &VariableBindings) {
        let fallback_start = NaiveTime::from_hms_opt(defaults::FIRST_SHIFT_START_HOUR, 0, 0)
            .unwrap_or(NaiveTime::MIN);

        self.update_rate_ms = bindings
            .read_int(names::UPDATE_RATE_MS, defaults::UPDATE_RATE_MS)
            .max(1);
        self.shift_count = bindings.read_int(names::SHIFT_COUNT, defaults::SHIFT_COUNT);
        self.first_shift_start = bindings.read_time(names::FIRST_SHIFT_START, fallback_start);
        self.quality_target =
            bindings.read_number(names::QUALITY_TARGET, defaults::QUALITY_TARGET);
        self.performance_target =
            bindings.read_number(names::PERFORMANCE_TARGET, defaults::PERFORMANCE_TARGET);
        self.availability_target =
            bindings.read_number(names::AVAILABILITY_TARGET, defaults::AVAILABILITY_TARGET);
        self.oee_target = bindings.read_number(names::OEE_TARGET, defaults::OEE_TARGET);
        self.production_target =
            bindings.read_int(names::PRODUCTION_TARGET, defaults::PRODUCTION_TARGET);
        self.logging_level = bindings.read_int(names::LOGGING_LEVEL, defaults::LOGGING_LEVEL);
        self.good_oee_threshold =
            bindings.read_number(names::GOOD_OEE_THRESHOLD, defaults::GOOD_OEE_THRESHOLD);
        self.poor_oee_threshold =
            bindings.read_number(names::POOR_OEE_THRESHOLD, defaults::POOR_OEE_THRESHOLD);

        // 详尽日志开关下沉到绑定层
        bindings.set_verbose(self.logging_level >= 2);
    }
}

// ==========================================
// 单元测试
// ==========================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::store::MemoryStore;
    use crate::binding::value::TagValue;
    use std::sync::Arc;

    #[test]
    fn test_refresh_reads_present_and_falls_back() {
        let store = MemoryStore::new();
        store.insert_point("LineA/Inputs/GoodCount", TagValue::Int(1));
        store.insert_point("LineA/Config/ShiftCount", TagValue::Int(2));
        store.insert_point("LineA/Config/QualityTarget", TagValue::Text("90.5".into()));
        store.insert_point(
            "LineA/Config/FirstShiftStart",
            TagValue::Text("07:30".into()),
        );
        let bindings =
            VariableBindings::bind(Arc::new(store), "LineA", "产线A").unwrap();

        let mut snapshot = ConfigSnapshot::default();
        snapshot.refresh(&bindings);

        assert_eq!(snapshot.shift_count, 2);
        assert_eq!(snapshot.quality_target, 90.5);
        assert_eq!(
            snapshot.first_shift_start,
            NaiveTime::from_hms_opt(7, 30, 0).unwrap()
        );
        // 缺席配置保持缺省
        assert_eq!(snapshot.update_rate_ms, defaults::UPDATE_RATE_MS);
        assert_eq!(snapshot.oee_target, defaults::OEE_TARGET);
        assert_eq!(snapshot.production_target, defaults::PRODUCTION_TARGET);
    }

    #[test]
    fn test_refresh_clamps_update_rate() {
        let store = MemoryStore::new();
        store.insert_point("LineA/Inputs/GoodCount", TagValue::Int(1));
        store.insert_point("LineA/Config/UpdateRateMs", TagValue::Int(-50));
        let bindings =
            VariableBindings::bind(Arc::new(store), "LineA", "产线A").unwrap();

        let mut snapshot = ConfigSnapshot::default();
        snapshot.refresh(&bindings);
        assert_eq!(snapshot.update_rate_ms, 1);
    }
}
