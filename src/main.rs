// ==========================================
// 设备综合效率监控系统 - 主入口
// ==========================================
// 依据: OEE_Engine_Specs_v0.2.md
// 用途: 以进程内存储模拟两条产线,演示完整监控回路
// ==========================================

use anyhow::Context;
use oee_monitor::engine::DEFAULT_TICK_INTERVAL_MS;
use oee_monitor::{InstanceContext, MemoryStore, MonitorRuntime, TagValue};
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 初始化日志系统
    oee_monitor::logging::init();

    tracing::info!("==================================================");
    tracing::info!("{}", oee_monitor::APP_NAME);
    tracing::info!("系统版本: {}", oee_monitor::VERSION);
    tracing::info!("==================================================");

    // 进程内数据点存储 (演示模式)
    let store = Arc::new(MemoryStore::new());
    seed_demo_line(&store, "LineA", 30.0);
    seed_demo_line(&store, "LineB", 45.0);

    // 注册实例
    let mut runtime = MonitorRuntime::new(DEFAULT_TICK_INTERVAL_MS);
    for (root, name) in [("LineA", "演示产线A"), ("LineB", "演示产线B")] {
        match InstanceContext::bind(store.clone(), root, name) {
            Ok(instance) => runtime.register(instance),
            Err(e) => tracing::error!(root, error = %e, "实例绑定失败,跳过"),
        }
    }

    // 启动运行循环与产线模拟
    let running = runtime.start().context("启动运行循环失败")?;
    let simulation = tokio::spawn(simulate_production(store.clone()));

    tracing::info!("监控已启动, Ctrl-C 退出");
    tokio::signal::ctrl_c()
        .await
        .context("等待退出信号失败")?;

    // 先停模拟,再有界停止运行循环
    simulation.abort();
    let ticks = running.stop().await.context("停止运行循环失败")?;
    tracing::info!(ticks, "监控已退出");

    Ok(())
}

/// 注册一条演示产线的数据点
fn seed_demo_line(store: &MemoryStore, root: &str, ideal_cycle_seconds: f64) {
    // 输入
    store.insert_point(&format!("{}/Inputs/GoodCount", root), TagValue::Int(0));
    store.insert_point(&format!("{}/Inputs/BadCount", root), TagValue::Int(0));
    store.insert_point(
        &format!("{}/Inputs/RuntimeSeconds", root),
        TagValue::Number(0.0),
    );
    store.insert_point(
        &format!("{}/Inputs/IdealCycleTime", root),
        TagValue::Number(ideal_cycle_seconds),
    );
    store.insert_point(
        &format!("{}/Inputs/PlannedProductionHours", root),
        TagValue::Number(8.0),
    );

    // 配置留空, 由缺省播种器填充
    store.insert_point(&format!("{}/Config/ShiftCount", root), TagValue::Empty);
    store.insert_point(&format!("{}/Config/FirstShiftStart", root), TagValue::Empty);
    store.insert_point(&format!("{}/Config/QualityTarget", root), TagValue::Empty);
    store.insert_point(&format!("{}/Config/OeeTarget", root), TagValue::Empty);

    // 输出全量绑定
    for relative in [
        "TotalCount",
        "Quality",
        "Performance",
        "Availability",
        "Oee",
        "OeeRating",
        "AvgCycleTime",
        "PartsPerHour",
        "ExpectedPartCount",
        "DowntimeSeconds",
        "RuntimeFormatted",
        "DowntimeFormatted",
        "SystemStatus",
        "CurrentShift",
        "ShiftStart",
        "ShiftEnd",
        "ShiftElapsedSeconds",
        "ShiftRemainingSeconds",
        "ShiftChangeOccurred",
        "ShiftChangeImminent",
        "QualityTrend",
        "PerformanceTrend",
        "AvailabilityTrend",
        "OeeTrend",
        "QualityMin",
        "QualityMax",
        "QualityAvg",
        "PerformanceMin",
        "PerformanceMax",
        "PerformanceAvg",
        "AvailabilityMin",
        "AvailabilityMax",
        "AvailabilityAvg",
        "OeeMin",
        "OeeMax",
        "OeeAvg",
        "QualityTargetDelta",
        "PerformanceTargetDelta",
        "AvailabilityTargetDelta",
        "OeeTargetDelta",
        "ProductionTargetDelta",
    ] {
        store.insert_point(&format!("{}/Outputs/{}", root, relative), TagValue::Empty);
    }
}

/// 产线模拟: 周期性推进计数与运行时长
async fn simulate_production(store: Arc<MemoryStore>) {
    let mut elapsed = 0.0f64;
    let mut good = [0i64; 2];
    let mut bad = [0i64; 2];

    loop {
        tokio::time::sleep(Duration::from_secs(1)).await;
        elapsed += 1.0;

        for (index, root) in ["LineA", "LineB"].iter().enumerate() {
            // 约每30秒产出一件, 5%为坏件
            if elapsed as i64 % 30 == 0 {
                if (elapsed as i64 / 30 + index as i64) % 20 == 0 {
                    bad[index] += 1;
                } else {
                    good[index] += 1;
                }
            }
            store.set_value(
                &format!("{}/Inputs/GoodCount", root),
                TagValue::Int(good[index]),
            );
            store.set_value(
                &format!("{}/Inputs/BadCount", root),
                TagValue::Int(bad[index]),
            );
            store.set_value(
                &format!("{}/Inputs/RuntimeSeconds", root),
                TagValue::Number(elapsed),
            );
        }
    }
}
