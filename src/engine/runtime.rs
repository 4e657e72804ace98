// ==========================================
// 设备综合效率监控系统 - 运行循环
// ==========================================
// 依据: OEE_Engine_Specs_v0.2.md - 5. 并发模型
// ==========================================
// 职责: 周期驱动全部实例,睡眠为唯一挂起点且可取消
// 红线: 单实例失败必须被捕获记录,不得中断同周期其余实例
// ==========================================

use crate::engine::context::InstanceContext;
use crate::error::EngineError;
use chrono::{Local, Utc};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// 缺省计算周期 (毫秒)
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 1000;

/// 停止时等待在途周期完成的上限 (毫秒)
pub const STOP_JOIN_TIMEOUT_MS: u64 = 500;

// ==========================================
// MonitorRuntime - 监控运行时 (未启动)
// ==========================================
pub struct MonitorRuntime {
    interval: Duration,
    instances: Vec<InstanceContext>,
}

impl MonitorRuntime {
    /// 构造函数
    ///
    /// # 参数
    /// - interval_ms: 计算周期 (毫秒, 最小1)
    pub fn new(interval_ms: u64) -> Self {
        Self {
            interval: Duration::from_millis(interval_ms.max(1)),
            instances: Vec::new(),
        }
    }

    /// 注册一个实例
    pub fn register(&mut self, instance: InstanceContext) {
        tracing::info!(
            instance = %instance.display_name(),
            instance_id = %instance.instance_id(),
            "实例已注册"
        );
        self.instances.push(instance);
    }

    /// 已注册实例数
    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    /// 启动运行循环
    ///
    /// 实例所有权转移至循环任务: 单任务顺序处理全部实例,
    /// 从结构上保证每实例同时至多一个在途周期。
    ///
    /// # 返回
    /// - Ok(RunningMonitor): 循环已启动
    /// - Err(EngineError::Startup): 无已注册实例,引擎保持未启动
    pub fn start(self) -> Result<RunningMonitor, EngineError> {
        if self.instances.is_empty() {
            return Err(EngineError::Startup(
                "无已注册实例,运行循环不启动".to_string(),
            ));
        }

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let instance_count = self.instances.len();
        let handle = tokio::spawn(run_loop(self.instances, self.interval, shutdown_rx));

        tracing::info!(
            instances = instance_count,
            interval_ms = self.interval.as_millis() as u64,
            "运行循环已启动"
        );

        Ok(RunningMonitor {
            shutdown: shutdown_tx,
            handle,
        })
    }
}

// ==========================================
// RunningMonitor - 运行中的监控句柄
// ==========================================
pub struct RunningMonitor {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<u64>,
}

impl RunningMonitor {
    /// 停止运行循环
    ///
    /// 取消挂起的睡眠,等待在途周期完成;
    /// 等待有界 (500ms),避免停止无限阻塞。
    ///
    /// # 返回
    /// - Ok(u64): 循环累计执行的周期数
    /// - Err(EngineError::StopTimeout): 在途周期未在时限内完成
    pub async fn stop(self) -> Result<u64, EngineError> {
        // 发送停止信号即打断挂起的睡眠
        let _ = self.shutdown.send(true);

        match tokio::time::timeout(Duration::from_millis(STOP_JOIN_TIMEOUT_MS), self.handle).await
        {
            Ok(Ok(ticks)) => {
                tracing::info!(ticks, "运行循环已停止");
                Ok(ticks)
            }
            Ok(Err(join_error)) => Err(EngineError::Join(join_error.to_string())),
            Err(_) => Err(EngineError::StopTimeout {
                timeout_ms: STOP_JOIN_TIMEOUT_MS,
            }),
        }
    }
}

/// 循环主体: 睡眠 → 逐实例处理 → 重复
///
/// 睡眠是唯一挂起点;实例间无顺序承诺,
/// 单实例异常被捕获记录后继续处理其余实例。
async fn run_loop(
    mut instances: Vec<InstanceContext>,
    interval: Duration,
    mut shutdown_rx: watch::Receiver<bool>,
) -> u64 {
    let mut ticks = 0u64;

    loop {
        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            _ = shutdown_rx.changed() => {
                if *shutdown_rx.borrow() {
                    break;
                }
            }
        }

        let now_utc = Utc::now();
        let now_local = Local::now().naive_local();
        ticks += 1;

        for instance in instances.iter_mut() {
            // 错误隔离: 单实例失败不影响同周期其余实例,
            // 下一周期继续处理该实例
            if let Err(e) = instance.process_tick(now_utc, now_local) {
                tracing::error!(
                    instance = %instance.display_name(),
                    instance_id = %instance.instance_id(),
                    error = %e,
                    "实例周期处理失败,跳过本周期"
                );
            }
        }
    }

    ticks
}
