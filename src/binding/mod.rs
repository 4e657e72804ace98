// ==========================================
// 设备综合效率监控系统 - 变量绑定层
// ==========================================
// 依据: OEE_Engine_Specs_v0.2.md - 4.1 变量绑定
// ==========================================
// 职责: 逻辑名到数据点句柄的解析与类型容错读写
// 红线: 绑定缺失不是错误,读取永不抛错
// ==========================================

pub mod bindings;
pub mod seeder;
pub mod store;
pub mod value;

// 重导出核心类型
pub use bindings::{names, VariableBindings};
pub use seeder::DefaultSeeder;
pub use store::{DataPointStore, HandleId, MemoryStore, StoreWriteError};
pub use value::TagValue;
