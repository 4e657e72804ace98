// ==========================================
// 设备综合效率监控系统 - 核心库
// ==========================================
// 依据: OEE_Engine_Specs_v0.2.md - 系统总览
// 技术栈: Rust + Tokio
// 系统定位: 产线OEE指标引擎 (只读派生指标)
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 变量绑定层 - 数据点访问
pub mod binding;

// 配置层 - 配置快照
pub mod config;

// 引擎层 - 指标计算与回写
pub mod engine;

// 日志系统
pub mod logging;

// 错误类型
pub mod error;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{
    OeeRating, ShiftCountPolicy, SystemStatus, TrendLabel, ZeroDenominatorConvention,
};

// 领域实体
pub use domain::{MetricRecord, ShiftInfo};

// 变量绑定
pub use binding::{
    DataPointStore, DefaultSeeder, HandleId, MemoryStore, StoreWriteError, TagValue,
    VariableBindings,
};

// 配置
pub use config::ConfigSnapshot;

// 引擎
pub use engine::{
    CalculationEngine, InstanceContext, MonitorRuntime, OutputReconciler, ReconcileStats,
    RunningMonitor, ShiftScheduler, TickReport, TrendTracker,
};

// 错误
pub use error::EngineError;

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "设备综合效率监控系统";

// ==========================================
// 预编译检查
// ==========================================
