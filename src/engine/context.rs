// ==========================================
// 设备综合效率监控系统 - 实例上下文
// ==========================================
// 依据: OEE_Engine_Specs_v0.2.md - 2. 系统总览
// 用途: 单实例全部可变状态的唯一所有者,
//       按 计算→班次→趋势→回写 顺序执行单周期
// ==========================================

use crate::binding::bindings::{names, VariableBindings};
use crate::binding::seeder::DefaultSeeder;
use crate::binding::store::DataPointStore;
use crate::config::snapshot::ConfigSnapshot;
use crate::domain::metrics::MetricRecord;
use crate::engine::calculator::{CalcInputs, CalculationEngine};
use crate::engine::reconciler::{OutputReconciler, ReconcileStats};
use crate::engine::shift_scheduler::ShiftScheduler;
use crate::engine::trend::TrendTracker;
use crate::error::EngineError;
use chrono::{DateTime, NaiveDateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

/// 配置刷新节奏: 每隔多少个周期重读配置
pub const CONFIG_REFRESH_TICKS: u64 = 10;

// ==========================================
// TickReport - 单周期处理结果
// ==========================================
#[derive(Debug, Clone)]
pub struct TickReport {
    pub record: MetricRecord,
    pub reconcile: ReconcileStats,
}

// ==========================================
// InstanceContext - 实例上下文
// ==========================================
pub struct InstanceContext {
    instance_id: Uuid,
    bindings: VariableBindings,
    config: ConfigSnapshot,
    calculator: CalculationEngine,
    shift_scheduler: ShiftScheduler,
    trends: TrendTracker,
    reconciler: OutputReconciler,
    tick_no: u64,
}

impl InstanceContext {
    /// 绑定一个实例并完成首次初始化
    ///
    /// 初始化顺序: 解析绑定 → 播种缺省值 → 读取配置快照
    ///
    /// # 参数
    /// - store: 数据点存储
    /// - instance_root: 实例根路径
    /// - display_name: 实例显示名
    ///
    /// # 返回
    /// - Ok(InstanceContext): 就绪的实例上下文
    /// - Err(EngineError::Startup): 绑定失败,实例不可监控
    pub fn bind(
        store: Arc<dyn DataPointStore>,
        instance_root: &str,
        display_name: &str,
    ) -> Result<Self, EngineError> {
        let bindings = VariableBindings::bind(store, instance_root, display_name)?;

        // 首次绑定后播种缺省值 (每实例生命周期一次)
        let mut seeder = DefaultSeeder::new();
        seeder.seed(&bindings);

        let mut config = ConfigSnapshot::default();
        config.refresh(&bindings);

        let instance_id = Uuid::new_v4();
        tracing::info!(
            instance = %display_name,
            %instance_id,
            update_rate_ms = config.update_rate_ms,
            shift_count = config.shift_count,
            "实例上下文初始化完成"
        );

        Ok(Self {
            instance_id,
            bindings,
            config,
            calculator: CalculationEngine::new(),
            shift_scheduler: ShiftScheduler::new(),
            trends: TrendTracker::new(),
            reconciler: OutputReconciler::new(),
            tick_no: 0,
        })
    }

    /// 实例显示名
    pub fn display_name(&self) -> &str {
        self.bindings.display_name()
    }

    /// 实例标识
    pub fn instance_id(&self) -> Uuid {
        self.instance_id
    }

    /// 当前配置快照
    pub fn config(&self) -> &ConfigSnapshot {
        &self.config
    }

    /// 执行一个计算周期
    ///
    /// 顺序: 配置刷新(按节奏) → 读输入 → 计算 → 班次 → 趋势/统计 → 回写
    ///
    /// # 参数
    /// - now_utc: UTC时间 (写冷却判定)
    /// - now_local: 本地时间 (班次与运行状态判定)
    pub fn process_tick(
        &mut self,
        now_utc: DateTime<Utc>,
        now_local: NaiveDateTime,
    ) -> Result<TickReport, EngineError> {
        self.tick_no += 1;

        // 1. 配置刷新 (慢于指标计算的节奏)
        if self.tick_no % CONFIG_REFRESH_TICKS == 1 {
            self.config.refresh(&self.bindings);
        }

        // 2. 读取原始输入 (带回退,永不失败)
        let inputs = self.read_inputs();

        // 3. 指标计算
        let mut record = self.calculator.compute(&inputs, &self.config, now_local);

        // 4. 班次调度
        let shift = self.shift_scheduler.compute(now_local, &self.config);
        record.current_shift = shift.shift_number;
        record.shift_start = shift.start_time;
        record.shift_end = shift.end_time;
        record.shift_elapsed_seconds = shift.elapsed_seconds;
        record.shift_remaining_seconds = shift.remaining_seconds;
        record.shift_change_occurred = shift.change_occurred;
        record.shift_change_imminent = shift.change_imminent;

        if shift.change_occurred {
            tracing::info!(
                instance = %self.display_name(),
                shift = shift.shift_number,
                "换班"
            );
        }

        // 5. 趋势与统计 (仅生产活跃时入队)
        if inputs.has_activity() {
            self.trends.record(&record);
        }
        self.trends.apply(&mut record);

        // 诊断: 高详尽度时输出整条记录
        if self.config.logging_level >= 3 {
            if let Ok(json) = serde_json::to_string(&record) {
                tracing::debug!(instance = %self.display_name(), record = %json, "周期指标");
            }
        }

        // 6. 差异回写
        let reconcile = self
            .reconciler
            .reconcile(&self.bindings, record.output_fields(), now_utc);

        Ok(TickReport { record, reconcile })
    }

    /// 读取本周期原始输入
    fn read_inputs(&self) -> CalcInputs {
        CalcInputs {
            good_count: self.bindings.read_int(names::GOOD_COUNT, 0),
            bad_count: self.bindings.read_int(names::BAD_COUNT, 0),
            runtime_seconds: self.bindings.read_number(names::RUNTIME_SECONDS, 0.0),
            ideal_cycle_raw: self.bindings.read_raw(names::IDEAL_CYCLE_TIME),
            planned_hours_raw: self.bindings.read_raw(names::PLANNED_PRODUCTION_HOURS),
        }
    }
}
