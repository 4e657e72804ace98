// ==========================================
// 运行循环集成测试
// ==========================================
// 测试目标: 验证周期驱动、有界停止与多实例错误隔离
// 覆盖范围: 启动/停止生命周期 / 输出随周期推进 / 单实例故障不影响批次
// ==========================================

use oee_monitor::{EngineError, InstanceContext, MemoryStore, MonitorRuntime, TagValue};
use std::sync::Arc;
use std::time::Duration;

// ==========================================
// 测试辅助函数
// ==========================================

/// 注册一条带基本输入与少量输出的产线
fn register_test_line(store: &MemoryStore, root: &str) {
    store.insert_point(&format!("{}/Inputs/GoodCount", root), TagValue::Int(95));
    store.insert_point(&format!("{}/Inputs/BadCount", root), TagValue::Int(5));
    store.insert_point(
        &format!("{}/Inputs/RuntimeSeconds", root),
        TagValue::Number(3000.0),
    );
    store.insert_point(
        &format!("{}/Inputs/IdealCycleTime", root),
        TagValue::Number(30.0),
    );
    store.insert_point(
        &format!("{}/Inputs/PlannedProductionHours", root),
        TagValue::Number(1.0),
    );
    store.insert_point(&format!("{}/Outputs/Quality", root), TagValue::Empty);
    store.insert_point(&format!("{}/Outputs/Oee", root), TagValue::Empty);
    store.insert_point(&format!("{}/Outputs/TotalCount", root), TagValue::Empty);
}

// ==========================================
// 生命周期
// ==========================================

#[tokio::test]
async fn test_runtime_ticks_and_writes_outputs() {
    let store = Arc::new(MemoryStore::new());
    register_test_line(&store, "LineA");

    let mut runtime = MonitorRuntime::new(20);
    runtime.register(InstanceContext::bind(store.clone(), "LineA", "产线A").unwrap());
    assert_eq!(runtime.instance_count(), 1);

    let running = runtime.start().unwrap();
    tokio::time::sleep(Duration::from_millis(300)).await;
    let ticks = running.stop().await.unwrap();

    assert!(ticks > 0, "循环应至少执行一个周期");
    assert_eq!(
        store.get_value("LineA/Outputs/Quality"),
        Some(TagValue::Number(95.0))
    );
    assert_eq!(
        store.get_value("LineA/Outputs/TotalCount"),
        Some(TagValue::Int(100))
    );
    // 输入不变: 变化抑制生效, 每个输出只写一次
    assert_eq!(store.write_attempts("LineA/Outputs/Quality"), 1);
}

#[tokio::test]
async fn test_start_requires_registered_instances() {
    let runtime = MonitorRuntime::new(20);
    assert!(matches!(runtime.start(), Err(EngineError::Startup(_))));
}

#[tokio::test]
async fn test_stop_is_prompt_even_mid_sleep() {
    let store = Arc::new(MemoryStore::new());
    register_test_line(&store, "LineA");

    // 周期远大于等待时间: 停止必须打断挂起的睡眠
    let mut runtime = MonitorRuntime::new(60_000);
    runtime.register(InstanceContext::bind(store.clone(), "LineA", "产线A").unwrap());
    let running = runtime.start().unwrap();

    tokio::time::sleep(Duration::from_millis(50)).await;
    let started = std::time::Instant::now();
    let ticks = running.stop().await.unwrap();
    assert!(started.elapsed() < Duration::from_millis(500));
    assert_eq!(ticks, 0);
}

// ==========================================
// 多实例错误隔离
// ==========================================

#[tokio::test]
async fn test_faulty_instance_does_not_block_batch() {
    let store = Arc::new(MemoryStore::new());
    register_test_line(&store, "LineA");
    register_test_line(&store, "LineB");
    // LineB 全部输出拒绝写入 (模拟下游离线)
    for relative in ["Quality", "Oee", "TotalCount"] {
        store.set_write_rejected(&format!("LineB/Outputs/{}", relative), Some("下游离线"));
    }

    let mut runtime = MonitorRuntime::new(20);
    runtime.register(InstanceContext::bind(store.clone(), "LineA", "产线A").unwrap());
    runtime.register(InstanceContext::bind(store.clone(), "LineB", "产线B").unwrap());

    let running = runtime.start().unwrap();
    tokio::time::sleep(Duration::from_millis(300)).await;
    let ticks = running.stop().await.unwrap();
    assert!(ticks > 0);

    // 健康实例照常落盘
    assert_eq!(
        store.get_value("LineA/Outputs/Quality"),
        Some(TagValue::Number(95.0))
    );
    // 故障实例有过写尝试但未落值, 且冷却抑制了同值重试
    assert_eq!(store.write_attempts("LineB/Outputs/Quality"), 1);
    assert_eq!(store.get_value("LineB/Outputs/Quality"), Some(TagValue::Empty));
}
