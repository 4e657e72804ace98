// ==========================================
// 设备综合效率监控系统 - 引擎层
// ==========================================
// 依据: OEE_Engine_Specs_v0.2.md - 4. 组件设计
// ==========================================
// 职责: 指标计算、班次调度、趋势跟踪、差异回写与运行循环
// 红线: 引擎经绑定层访问数据点,不感知底层存储
// ==========================================

pub mod calculator;
pub mod context;
pub mod reconciler;
pub mod runtime;
pub mod shift_scheduler;
pub mod trend;

// 重导出核心引擎
pub use calculator::{CalcInputs, CalculationEngine, RUNTIME_STALE_WINDOW_SECONDS};
pub use context::{InstanceContext, TickReport, CONFIG_REFRESH_TICKS};
pub use reconciler::{
    OutputReconciler, ReconcileStats, WRITE_RETRY_COOLDOWN_SECONDS, WRITE_TOLERANCE,
};
pub use runtime::{
    MonitorRuntime, RunningMonitor, DEFAULT_TICK_INTERVAL_MS, STOP_JOIN_TIMEOUT_MS,
};
pub use shift_scheduler::{ShiftScheduler, DEFAULT_IMMINENT_WINDOW_SECONDS};
pub use trend::{MetricHistory, TrendTracker, HISTORY_CAPACITY};
