// ==========================================
// 设备综合效率监控系统 - 领域层
// ==========================================
// 职责: 领域类型与指标记录定义
// 红线: 领域层不依赖引擎层
// ==========================================

pub mod metrics;
pub mod shift;
pub mod types;

// 重导出核心实体
pub use metrics::MetricRecord;
pub use shift::ShiftInfo;
pub use types::{
    OeeRating, ShiftCountPolicy, SystemStatus, TrendLabel, ZeroDenominatorConvention,
};
