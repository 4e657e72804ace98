// ==========================================
// 设备综合效率监控系统 - 实例变量绑定
// ==========================================
// 依据: OEE_Engine_Specs_v0.2.md - 4.1 变量绑定
// ==========================================
// 职责: 按固定逻辑名表一次性解析句柄,提供带回退的类型化读取
// 红线: 缺失句柄静默禁用对应字段,读取永不失败
// ==========================================

use crate::binding::store::{DataPointStore, HandleId, StoreWriteError};
use crate::binding::value::TagValue;
use crate::error::EngineError;
use chrono::NaiveTime;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

// ==========================================
// 逻辑名常量 (固定逻辑名 → 相对路径表)
// ==========================================
pub mod names {
    // ===== 输入 =====
    pub const GOOD_COUNT: &str = "GoodCount";
    pub const BAD_COUNT: &str = "BadCount";
    pub const RUNTIME_SECONDS: &str = "RuntimeSeconds";
    pub const IDEAL_CYCLE_TIME: &str = "IdealCycleTime";
    pub const PLANNED_PRODUCTION_HOURS: &str = "PlannedProductionHours";

    // ===== 配置 =====
    pub const UPDATE_RATE_MS: &str = "UpdateRateMs";
    pub const SHIFT_COUNT: &str = "ShiftCount";
    pub const FIRST_SHIFT_START: &str = "FirstShiftStart";
    pub const QUALITY_TARGET: &str = "QualityTarget";
    pub const PERFORMANCE_TARGET: &str = "PerformanceTarget";
    pub const AVAILABILITY_TARGET: &str = "AvailabilityTarget";
    pub const OEE_TARGET: &str = "OeeTarget";
    pub const PRODUCTION_TARGET: &str = "ProductionTarget";
    pub const LOGGING_LEVEL: &str = "LoggingLevel";
    pub const GOOD_OEE_THRESHOLD: &str = "GoodOeeThreshold";
    pub const POOR_OEE_THRESHOLD: &str = "PoorOeeThreshold";

    // ===== 输出: 计数与比率 =====
    pub const OUT_TOTAL_COUNT: &str = "TotalCount";
    pub const OUT_QUALITY: &str = "Quality";
    pub const OUT_PERFORMANCE: &str = "Performance";
    pub const OUT_AVAILABILITY: &str = "Availability";
    pub const OUT_OEE: &str = "Oee";
    pub const OUT_OEE_RATING: &str = "OeeRating";
    pub const OUT_AVG_CYCLE_TIME: &str = "AvgCycleTime";
    pub const OUT_PARTS_PER_HOUR: &str = "PartsPerHour";
    pub const OUT_EXPECTED_PART_COUNT: &str = "ExpectedPartCount";
    pub const OUT_DOWNTIME_SECONDS: &str = "DowntimeSeconds";
    pub const OUT_RUNTIME_FORMATTED: &str = "RuntimeFormatted";
    pub const OUT_DOWNTIME_FORMATTED: &str = "DowntimeFormatted";
    pub const OUT_SYSTEM_STATUS: &str = "SystemStatus";

    // ===== 输出: 班次 =====
    pub const OUT_CURRENT_SHIFT: &str = "CurrentShift";
    pub const OUT_SHIFT_START: &str = "ShiftStart";
    pub const OUT_SHIFT_END: &str = "ShiftEnd";
    pub const OUT_SHIFT_ELAPSED_SECONDS: &str = "ShiftElapsedSeconds";
    pub const OUT_SHIFT_REMAINING_SECONDS: &str = "ShiftRemainingSeconds";
    pub const OUT_SHIFT_CHANGE_OCCURRED: &str = "ShiftChangeOccurred";
    pub const OUT_SHIFT_CHANGE_IMMINENT: &str = "ShiftChangeImminent";

    // ===== 输出: 趋势 =====
    pub const OUT_QUALITY_TREND: &str = "QualityTrend";
    pub const OUT_PERFORMANCE_TREND: &str = "PerformanceTrend";
    pub const OUT_AVAILABILITY_TREND: &str = "AvailabilityTrend";
    pub const OUT_OEE_TREND: &str = "OeeTrend";

    // ===== 输出: 滚动统计 =====
    pub const OUT_QUALITY_MIN: &str = "QualityMin";
    pub const OUT_QUALITY_MAX: &str = "QualityMax";
    pub const OUT_QUALITY_AVG: &str = "QualityAvg";
    pub const OUT_PERFORMANCE_MIN: &str = "PerformanceMin";
    pub const OUT_PERFORMANCE_MAX: &str = "PerformanceMax";
    pub const OUT_PERFORMANCE_AVG: &str = "PerformanceAvg";
    pub const OUT_AVAILABILITY_MIN: &str = "AvailabilityMin";
    pub const OUT_AVAILABILITY_MAX: &str = "AvailabilityMax";
    pub const OUT_AVAILABILITY_AVG: &str = "AvailabilityAvg";
    pub const OUT_OEE_MIN: &str = "OeeMin";
    pub const OUT_OEE_MAX: &str = "OeeMax";
    pub const OUT_OEE_AVG: &str = "OeeAvg";

    // ===== 输出: 目标偏差 =====
    pub const OUT_QUALITY_TARGET_DELTA: &str = "QualityTargetDelta";
    pub const OUT_PERFORMANCE_TARGET_DELTA: &str = "PerformanceTargetDelta";
    pub const OUT_AVAILABILITY_TARGET_DELTA: &str = "AvailabilityTargetDelta";
    pub const OUT_OEE_TARGET_DELTA: &str = "OeeTargetDelta";
    pub const OUT_PRODUCTION_TARGET_DELTA: &str = "ProductionTargetDelta";
}

/// 固定逻辑名 → 实例相对路径映射表
///
/// 绑定时逐项解析一次,之后不再变更
pub fn logical_table() -> &'static [(&'static str, &'static str)] {
    use names::*;
    &[
        // 输入
        (GOOD_COUNT, "Inputs/GoodCount"),
        (BAD_COUNT, "Inputs/BadCount"),
        (RUNTIME_SECONDS, "Inputs/RuntimeSeconds"),
        (IDEAL_CYCLE_TIME, "Inputs/IdealCycleTime"),
        (PLANNED_PRODUCTION_HOURS, "Inputs/PlannedProductionHours"),
        // 配置
        (UPDATE_RATE_MS, "Config/UpdateRateMs"),
        (SHIFT_COUNT, "Config/ShiftCount"),
        (FIRST_SHIFT_START, "Config/FirstShiftStart"),
        (QUALITY_TARGET, "Config/QualityTarget"),
        (PERFORMANCE_TARGET, "Config/PerformanceTarget"),
        (AVAILABILITY_TARGET, "Config/AvailabilityTarget"),
        (OEE_TARGET, "Config/OeeTarget"),
        (PRODUCTION_TARGET, "Config/ProductionTarget"),
        (LOGGING_LEVEL, "Config/LoggingLevel"),
        (GOOD_OEE_THRESHOLD, "Config/GoodOeeThreshold"),
        (POOR_OEE_THRESHOLD, "Config/PoorOeeThreshold"),
        // 输出
        (OUT_TOTAL_COUNT, "Outputs/TotalCount"),
        (OUT_QUALITY, "Outputs/Quality"),
        (OUT_PERFORMANCE, "Outputs/Performance"),
        (OUT_AVAILABILITY, "Outputs/Availability"),
        (OUT_OEE, "Outputs/Oee"),
        (OUT_OEE_RATING, "Outputs/OeeRating"),
        (OUT_AVG_CYCLE_TIME, "Outputs/AvgCycleTime"),
        (OUT_PARTS_PER_HOUR, "Outputs/PartsPerHour"),
        (OUT_EXPECTED_PART_COUNT, "Outputs/ExpectedPartCount"),
        (OUT_DOWNTIME_SECONDS, "Outputs/DowntimeSeconds"),
        (OUT_RUNTIME_FORMATTED, "Outputs/RuntimeFormatted"),
        (OUT_DOWNTIME_FORMATTED, "Outputs/DowntimeFormatted"),
        (OUT_SYSTEM_STATUS, "Outputs/SystemStatus"),
        (OUT_CURRENT_SHIFT, "Outputs/CurrentShift"),
        (OUT_SHIFT_START, "Outputs/ShiftStart"),
        (OUT_SHIFT_END, "Outputs/ShiftEnd"),
        (OUT_SHIFT_ELAPSED_SECONDS, "Outputs/ShiftElapsedSeconds"),
        (OUT_SHIFT_REMAINING_SECONDS, "Outputs/ShiftRemainingSeconds"),
        (OUT_SHIFT_CHANGE_OCCURRED, "Outputs/ShiftChangeOccurred"),
        (OUT_SHIFT_CHANGE_IMMINENT, "Outputs/ShiftChangeImminent"),
        (OUT_QUALITY_TREND, "Outputs/QualityTrend"),
        (OUT_PERFORMANCE_TREND, "Outputs/PerformanceTrend"),
        (OUT_AVAILABILITY_TREND, "Outputs/AvailabilityTrend"),
        (OUT_OEE_TREND, "Outputs/OeeTrend"),
        (OUT_QUALITY_MIN, "Outputs/QualityMin"),
        (OUT_QUALITY_MAX, "Outputs/QualityMax"),
        (OUT_QUALITY_AVG, "Outputs/QualityAvg"),
        (OUT_PERFORMANCE_MIN, "Outputs/PerformanceMin"),
        (OUT_PERFORMANCE_MAX, "Outputs/PerformanceMax"),
        (OUT_PERFORMANCE_AVG, "Outputs/PerformanceAvg"),
        (OUT_AVAILABILITY_MIN, "Outputs/AvailabilityMin"),
        (OUT_AVAILABILITY_MAX, "Outputs/AvailabilityMax"),
        (OUT_AVAILABILITY_AVG, "Outputs/AvailabilityAvg"),
        (OUT_OEE_MIN, "Outputs/OeeMin"),
        (OUT_OEE_MAX, "Outputs/OeeMax"),
        (OUT_OEE_AVG, "Outputs/OeeAvg"),
        (OUT_QUALITY_TARGET_DELTA, "Outputs/QualityTargetDelta"),
        (OUT_PERFORMANCE_TARGET_DELTA, "Outputs/PerformanceTargetDelta"),
        (OUT_AVAILABILITY_TARGET_DELTA, "Outputs/AvailabilityTargetDelta"),
        (OUT_OEE_TARGET_DELTA, "Outputs/OeeTargetDelta"),
        (OUT_PRODUCTION_TARGET_DELTA, "Outputs/ProductionTargetDelta"),
    ]
}

// ==========================================
// VariableBindings - 实例变量绑定
// ==========================================
pub struct VariableBindings {
    store: Arc<dyn DataPointStore>,
    // 逻辑名 → 句柄 (缺失记录为 None, 永久缺席)
    handles: HashMap<&'static str, Option<HandleId>>,
    display_name: String,
    // 高详尽度时记录解析失败
    verbose: AtomicBool,
}

impl VariableBindings {
    /// 绑定一个实例: 按固定逻辑名表解析全部句柄
    ///
    /// # 参数
    /// - store: 数据点存储
    /// - instance_root: 实例根路径 (如 "LineA")
    /// - display_name: 实例显示名 (用于日志)
    ///
    /// # 返回
    /// - Ok(VariableBindings): 至少一个输入句柄解析成功
    /// - Err(EngineError::Startup): 无任何输入句柄,实例不可监控
    pub fn bind(
        store: Arc<dyn DataPointStore>,
        instance_root: &str,
        display_name: &str,
    ) -> Result<Self, EngineError> {
        let mut handles: HashMap<&'static str, Option<HandleId>> = HashMap::new();
        let mut missing = 0usize;

        for (logical, relative) in logical_table() {
            let path = format!("{}/{}", instance_root, relative);
            let handle = store.resolve(&path);
            if handle.is_none() {
                missing += 1;
            }
            handles.insert(logical, handle);
        }

        // 启动失败判定: 输入句柄一个都没有则无法计算
        let has_any_input = [
            names::GOOD_COUNT,
            names::BAD_COUNT,
            names::RUNTIME_SECONDS,
            names::IDEAL_CYCLE_TIME,
            names::PLANNED_PRODUCTION_HOURS,
        ]
        .iter()
        .any(|name| handles.get(name).copied().flatten().is_some());

        if !has_any_input {
            return Err(EngineError::Startup(format!(
                "实例 {} 无任何输入数据点 (root={})",
                display_name, instance_root
            )));
        }

        if missing > 0 {
            tracing::info!(
                instance = %display_name,
                missing,
                total = logical_table().len(),
                "部分数据点未解析,对应字段将被静默禁用"
            );
        }

        Ok(Self {
            store,
            handles,
            display_name: display_name.to_string(),
            verbose: AtomicBool::new(false),
        })
    }

    /// 实例显示名
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// 设置详尽日志开关 (由配置的日志详尽度驱动)
    pub fn set_verbose(&self, verbose: bool) {
        self.verbose.store(verbose, Ordering::Relaxed);
    }

    /// 查询逻辑名对应句柄
    ///
    /// # 返回
    /// - Some(HandleId): 已解析
    /// - None: 永久缺席
    pub fn handle(&self, logical: &str) -> Option<HandleId> {
        self.handles.get(logical).copied().flatten()
    }

    /// 读取原始值 (派生常量缓存按原始值同一性判断是否重解析)
    pub fn read_raw(&self, logical: &str) -> Option<TagValue> {
        let handle = self.handle(logical)?;
        self.store.read(handle)
    }

    /// 读取浮点数,解析失败或缺席时返回回退值
    pub fn read_number(&self, logical: &str, fallback: f64) -> f64 {
        match self.read_raw(logical) {
            Some(raw) => raw.as_number().unwrap_or_else(|| {
                self.log_parse_failure(logical, &raw, "number");
                fallback
            }),
            None => fallback,
        }
    }

    /// 读取整数,解析失败或缺席时返回回退值
    pub fn read_int(&self, logical: &str, fallback: i64) -> i64 {
        match self.read_raw(logical) {
            Some(raw) => raw.as_int().unwrap_or_else(|| {
                self.log_parse_failure(logical, &raw, "int");
                fallback
            }),
            None => fallback,
        }
    }

    /// 读取布尔,解析失败或缺席时返回回退值
    pub fn read_bool(&self, logical: &str, fallback: bool) -> bool {
        match self.read_raw(logical) {
            Some(raw) => raw.as_bool().unwrap_or_else(|| {
                self.log_parse_failure(logical, &raw, "bool");
                fallback
            }),
            None => fallback,
        }
    }

    /// 读取时刻,解析失败或缺席时返回回退值
    pub fn read_time(&self, logical: &str, fallback: NaiveTime) -> NaiveTime {
        match self.read_raw(logical) {
            Some(raw) => raw.as_time().unwrap_or_else(|| {
                self.log_parse_failure(logical, &raw, "time-of-day");
                fallback
            }),
            None => fallback,
        }
    }

    /// 向句柄写入值 (供回写器与播种器使用)
    pub fn write_to(&self, handle: HandleId, value: TagValue) -> Result<(), StoreWriteError> {
        self.store.write(handle, value)
    }

    /// 解析失败记录 (仅高详尽度)
    fn log_parse_failure(&self, logical: &str, raw: &TagValue, wanted: &str) {
        if self.verbose.load(Ordering::Relaxed) {
            tracing::debug!(
                instance = %self.display_name,
                name = logical,
                raw = %raw,
                wanted,
                "数据点值无法解析,使用回退值"
            );
        }
    }
}

// ==========================================
// 单元测试
// ==========================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::store::MemoryStore;

    /// 创建带基本输入的测试存储
    fn create_test_store() -> Arc<MemoryStore> {
        let store = MemoryStore::new();
        store.insert_point("LineA/Inputs/GoodCount", TagValue::Int(95));
        store.insert_point("LineA/Inputs/BadCount", TagValue::Int(5));
        store.insert_point("LineA/Inputs/RuntimeSeconds", TagValue::Number(3000.0));
        // 字符串表示的理想节拍
        store.insert_point("LineA/Inputs/IdealCycleTime", TagValue::Text("30".into()));
        store.insert_point("LineA/Outputs/Quality", TagValue::Number(0.0));
        Arc::new(store)
    }

    #[test]
    fn test_bind_resolves_present_and_records_absent() {
        let store = create_test_store();
        let bindings = VariableBindings::bind(store, "LineA", "产线A").unwrap();

        assert!(bindings.handle(names::GOOD_COUNT).is_some());
        assert!(bindings.handle(names::OUT_QUALITY).is_some());
        // 未注册的数据点记录为缺席
        assert!(bindings.handle(names::OUT_OEE).is_none());
        assert!(bindings.handle(names::SHIFT_COUNT).is_none());
    }

    #[test]
    fn test_bind_fails_without_any_input() {
        let store = Arc::new(MemoryStore::new());
        let result = VariableBindings::bind(store, "LineX", "产线X");
        assert!(matches!(result, Err(EngineError::Startup(_))));
    }

    #[test]
    fn test_typed_reads_with_fallback() {
        let store = create_test_store();
        let bindings = VariableBindings::bind(store.clone(), "LineA", "产线A").unwrap();

        assert_eq!(bindings.read_int(names::GOOD_COUNT, 0), 95);
        assert_eq!(bindings.read_number(names::RUNTIME_SECONDS, 0.0), 3000.0);
        // 字符串数值可解析
        assert_eq!(bindings.read_number(names::IDEAL_CYCLE_TIME, 0.0), 30.0);
        // 缺席句柄返回回退值
        assert_eq!(bindings.read_int(names::SHIFT_COUNT, 3), 3);
        // 不可解析值返回回退值
        store.set_value("LineA/Inputs/IdealCycleTime", TagValue::Text("n/a".into()));
        assert_eq!(bindings.read_number(names::IDEAL_CYCLE_TIME, -1.0), -1.0);
    }

    #[test]
    fn test_read_bool_coercion_and_fallback() {
        let store = create_test_store();
        store.insert_point(
            "LineA/Outputs/ShiftChangeOccurred",
            TagValue::Bool(true),
        );
        let bindings = VariableBindings::bind(store.clone(), "LineA", "产线A").unwrap();

        assert!(bindings.read_bool(names::OUT_SHIFT_CHANGE_OCCURRED, false));

        // 数值与字符串表示可解析
        store.set_value("LineA/Outputs/ShiftChangeOccurred", TagValue::Int(0));
        assert!(!bindings.read_bool(names::OUT_SHIFT_CHANGE_OCCURRED, true));
        store.set_value(
            "LineA/Outputs/ShiftChangeOccurred",
            TagValue::Text("true".into()),
        );
        assert!(bindings.read_bool(names::OUT_SHIFT_CHANGE_OCCURRED, false));

        // 不可解析值返回回退值
        store.set_value(
            "LineA/Outputs/ShiftChangeOccurred",
            TagValue::Text("maybe".into()),
        );
        assert!(bindings.read_bool(names::OUT_SHIFT_CHANGE_OCCURRED, true));

        // 缺席句柄返回回退值
        assert!(!bindings.read_bool(names::OUT_SHIFT_CHANGE_IMMINENT, false));
    }

    #[test]
    fn test_write_to_resolved_handle() {
        let store = create_test_store();
        let bindings = VariableBindings::bind(store.clone(), "LineA", "产线A").unwrap();

        let handle = bindings.handle(names::OUT_QUALITY).unwrap();
        bindings.write_to(handle, TagValue::Number(95.0)).unwrap();
        assert_eq!(
            store.get_value("LineA/Outputs/Quality"),
            Some(TagValue::Number(95.0))
        );
    }
}
