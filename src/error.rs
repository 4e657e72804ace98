// ==========================================
// 设备综合效率监控系统 - 错误类型
// ==========================================
// 依据: OEE_Engine_Specs_v0.2.md - 7. 错误分级
// 职责: 定义引擎统一错误类型
// 红线: 任何错误不得导致宿主进程崩溃
// ==========================================

use thiserror::Error;

/// 引擎错误类型
///
/// 分级说明:
/// - 绑定缺失不是错误（静默禁用对应字段）
/// - 读取/解析失败通过回退值吸收，不进入此类型
/// - 写失败以 StoreWriteError 在回写器边界被捕获记录，不上抛
#[derive(Error, Debug)]
pub enum EngineError {
    // ==========================================
    // 启动错误
    // ==========================================
    /// 实例初始化失败，引擎保持未启动状态
    #[error("启动失败: {0}")]
    Startup(String),

    // ==========================================
    // 运行时错误
    // ==========================================
    #[error("停止超时: 等待{timeout_ms}ms后放弃汇合")]
    StopTimeout { timeout_ms: u64 },

    #[error("运行任务汇合失败: {0}")]
    Join(String),
}
