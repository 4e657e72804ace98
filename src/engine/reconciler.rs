// ==========================================
// 设备综合效率监控系统 - 输出回写器
// ==========================================
// 依据: OEE_Engine_Specs_v0.2.md - 4.6 输出回写
// ==========================================
// 职责: 新值与上次成功写入值比对,仅回写差异;
//       写失败后对同值重试施加冷却
// 口径: 浮点字段容差0.001, 其余精确相等; 冷却30秒
// ==========================================

use crate::binding::bindings::VariableBindings;
use crate::binding::store::HandleId;
use crate::binding::value::TagValue;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// 浮点字段写抑制容差
pub const WRITE_TOLERANCE: f64 = 0.001;

/// 写失败后同值重试冷却 (秒)
pub const WRITE_RETRY_COOLDOWN_SECONDS: i64 = 30;

// ==========================================
// ReconcileStats - 单周期回写统计
// ==========================================
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileStats {
    /// 成功写入数
    pub written: usize,
    /// 值未变化而跳过数
    pub unchanged: usize,
    /// 冷却期内跳过数
    pub cooldown_skipped: usize,
    /// 句柄缺席跳过数
    pub absent: usize,
    /// 写入失败数
    pub failed: usize,
}

// ==========================================
// WriteState - 单句柄写状态
// ==========================================
#[derive(Debug, Default)]
struct WriteState {
    /// 上次成功写入的值 (变化抑制基准)
    last_written: Option<TagValue>,
    /// 上次失败的时间戳与失败值 (仅同值重试受冷却约束)
    failure: Option<(DateTime<Utc>, TagValue)>,
}

// ==========================================
// OutputReconciler - 输出回写器
// ==========================================
pub struct OutputReconciler {
    // 按句柄惰性建立的写状态表
    states: HashMap<HandleId, WriteState>,
}

impl OutputReconciler {
    pub fn new() -> Self {
        Self {
            states: HashMap::new(),
        }
    }

    /// 回写一个周期的全部输出字段
    ///
    /// # 参数
    /// - bindings: 实例变量绑定
    /// - fields: (逻辑名, 新值) 列表
    /// - now: 当前UTC时间 (冷却判定)
    ///
    /// # 返回
    /// 本周期回写统计
    pub fn reconcile(
        &mut self,
        bindings: &VariableBindings,
        fields: Vec<(&'static str, TagValue)>,
        now: DateTime<Utc>,
    ) -> ReconcileStats {
        let mut stats = ReconcileStats::default();

        for (name, value) in fields {
            // 缺席句柄: 字段静默禁用
            let handle = match bindings.handle(name) {
                Some(h) => h,
                None => {
                    stats.absent += 1;
                    continue;
                }
            };

            let state = self.states.entry(handle).or_default();

            // 与上次成功写入值一致: 跳过
            if let Some(last) = &state.last_written {
                if last.approx_eq(&value, WRITE_TOLERANCE) {
                    stats.unchanged += 1;
                    continue;
                }
            }

            // 冷却门控: 仅抑制同一失败值的重试,不同的新值立即尝试
            if let Some((failed_at, failed_value)) = &state.failure {
                let in_cooldown =
                    (now - *failed_at).num_seconds() < WRITE_RETRY_COOLDOWN_SECONDS;
                if in_cooldown && failed_value.approx_eq(&value, WRITE_TOLERANCE) {
                    stats.cooldown_skipped += 1;
                    continue;
                }
            }

            match bindings.write_to(handle, value.clone()) {
                Ok(()) => {
                    state.last_written = Some(value);
                    state.failure = None;
                    stats.written += 1;
                }
                Err(e) => {
                    // 保留 last_written 不变: 下一个不同值仍会及时尝试
                    state.failure = Some((now, value));
                    stats.failed += 1;
                    tracing::error!(
                        instance = %bindings.display_name(),
                        name,
                        error = %e,
                        "输出写入失败,进入冷却"
                    );
                }
            }
        }

        stats
    }
}

impl Default for OutputReconciler {
    fn default() -> Self {
        Self::new()
    }
}

// ==========================================
// 单元测试
// ==========================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::bindings::{names, VariableBindings};
    use crate::binding::store::MemoryStore;
    use chrono::Duration;
    use std::sync::Arc;

    /// 创建带两个输出点的测试环境
    fn create_test_env() -> (Arc<MemoryStore>, VariableBindings) {
        let store = MemoryStore::new();
        store.insert_point("LineA/Inputs/GoodCount", TagValue::Int(1));
        store.insert_point("LineA/Outputs/Quality", TagValue::Empty);
        store.insert_point("LineA/Outputs/TotalCount", TagValue::Empty);
        let store = Arc::new(store);
        let bindings = VariableBindings::bind(store.clone(), "LineA", "产线A").unwrap();
        (store, bindings)
    }

    #[test]
    fn test_writes_only_diffs() {
        let (store, bindings) = create_test_env();
        let mut reconciler = OutputReconciler::new();
        let now = Utc::now();

        let fields = vec![
            (names::OUT_QUALITY, TagValue::Number(95.0)),
            (names::OUT_TOTAL_COUNT, TagValue::Int(100)),
            (names::OUT_OEE, TagValue::Number(79.2)), // 未绑定
        ];
        let stats = reconciler.reconcile(&bindings, fields.clone(), now);
        assert_eq!(stats.written, 2);
        assert_eq!(stats.absent, 1);

        // 同值重放: 全部抑制,不产生新的写尝试
        let stats = reconciler.reconcile(&bindings, fields.clone(), now + Duration::seconds(1));
        assert_eq!(stats.written, 0);
        assert_eq!(stats.unchanged, 2);
        assert_eq!(store.write_attempts("LineA/Outputs/Quality"), 1);

        // 容差内的浮动视为未变化
        let fields = vec![(names::OUT_QUALITY, TagValue::Number(95.0005))];
        let stats = reconciler.reconcile(&bindings, fields, now + Duration::seconds(2));
        assert_eq!(stats.unchanged, 1);

        // 超出容差: 回写
        let fields = vec![(names::OUT_QUALITY, TagValue::Number(95.1))];
        let stats = reconciler.reconcile(&bindings, fields, now + Duration::seconds(3));
        assert_eq!(stats.written, 1);
        assert_eq!(store.get_value("LineA/Outputs/Quality"), Some(TagValue::Number(95.1)));
    }

    #[test]
    fn test_failure_cooldown_suppresses_same_value_retry() {
        let (store, bindings) = create_test_env();
        let mut reconciler = OutputReconciler::new();
        let now = Utc::now();

        store.set_write_rejected("LineA/Outputs/Quality", Some("下游离线"));
        let fields = vec![(names::OUT_QUALITY, TagValue::Number(95.0))];
        let stats = reconciler.reconcile(&bindings, fields.clone(), now);
        assert_eq!(stats.failed, 1);

        // 冷却期内同值: 不得再次尝试写入
        for offset in [1, 10, 29] {
            let stats =
                reconciler.reconcile(&bindings, fields.clone(), now + Duration::seconds(offset));
            assert_eq!(stats.cooldown_skipped, 1, "offset={}", offset);
        }
        assert_eq!(store.write_attempts("LineA/Outputs/Quality"), 1);

        // 冷却期满: 恢复重试
        store.set_write_rejected("LineA/Outputs/Quality", None);
        let stats = reconciler.reconcile(&bindings, fields, now + Duration::seconds(30));
        assert_eq!(stats.written, 1);
        assert_eq!(store.write_attempts("LineA/Outputs/Quality"), 2);
    }

    #[test]
    fn test_differing_value_attempted_promptly_after_failure() {
        let (store, bindings) = create_test_env();
        let mut reconciler = OutputReconciler::new();
        let now = Utc::now();

        store.set_write_rejected("LineA/Outputs/Quality", Some("下游离线"));
        let stats = reconciler.reconcile(
            &bindings,
            vec![(names::OUT_QUALITY, TagValue::Number(95.0))],
            now,
        );
        assert_eq!(stats.failed, 1);

        // 冷却只约束同值: 新值立即尝试 (此时下游已恢复)
        store.set_write_rejected("LineA/Outputs/Quality", None);
        let stats = reconciler.reconcile(
            &bindings,
            vec![(names::OUT_QUALITY, TagValue::Number(96.0))],
            now + Duration::seconds(2),
        );
        assert_eq!(stats.written, 1);
        assert_eq!(
            store.get_value("LineA/Outputs/Quality"),
            Some(TagValue::Number(96.0))
        );
    }

    #[test]
    fn test_success_clears_failure_state() {
        let (store, bindings) = create_test_env();
        let mut reconciler = OutputReconciler::new();
        let now = Utc::now();

        store.set_write_rejected("LineA/Outputs/Quality", Some("抖动"));
        let _ = reconciler.reconcile(
            &bindings,
            vec![(names::OUT_QUALITY, TagValue::Number(95.0))],
            now,
        );
        store.set_write_rejected("LineA/Outputs/Quality", None);

        // 新值写入成功后清除失败状态
        let _ = reconciler.reconcile(
            &bindings,
            vec![(names::OUT_QUALITY, TagValue::Number(96.0))],
            now + Duration::seconds(1),
        );
        // 原失败值96→95回退也应立即可写 (无冷却残留)
        let stats = reconciler.reconcile(
            &bindings,
            vec![(names::OUT_QUALITY, TagValue::Number(95.0))],
            now + Duration::seconds(2),
        );
        assert_eq!(stats.written, 1);
    }
}
