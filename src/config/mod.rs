// ==========================================
// 设备综合效率监控系统 - 配置层
// ==========================================
// 职责: 配置快照的读取与缓存
// ==========================================

pub mod snapshot;

pub use snapshot::ConfigSnapshot;
