// ==========================================
// 设备综合效率监控系统 - 缺省值播种器
// ==========================================
// 依据: OEE_Engine_Specs_v0.2.md - 4.2 缺省播种
// ==========================================
// 职责: 首次绑定后对空置输入写入合理缺省值
// 口径: 每实例生命周期仅执行一次,写失败记录后跳过 (尽力而为)
// ==========================================

use crate::binding::bindings::{names, VariableBindings};
use crate::binding::value::TagValue;
use chrono::NaiveTime;

// ==========================================
// DefaultSeeder - 缺省值播种器
// ==========================================
pub struct DefaultSeeder {
    // 每实例"已播种"守卫,防止重复触发
    seeded: bool,
}

/// 声明式缺省值表: (逻辑名, 缺省值)
///
/// "空置"判定见 TagValue::is_unset (空值/数值0/空白串/零值时刻)
fn default_table() -> Vec<(&'static str, TagValue)> {
    vec![
        (names::UPDATE_RATE_MS, TagValue::Int(1000)),
        (names::SHIFT_COUNT, TagValue::Int(3)),
        (
            names::FIRST_SHIFT_START,
            TagValue::Time(NaiveTime::from_hms_opt(6, 0, 0).unwrap_or(NaiveTime::MIN)),
        ),
        (names::QUALITY_TARGET, TagValue::Number(95.0)),
        (names::PERFORMANCE_TARGET, TagValue::Number(85.0)),
        (names::AVAILABILITY_TARGET, TagValue::Number(90.0)),
        (names::OEE_TARGET, TagValue::Number(72.7)),
        (names::PRODUCTION_TARGET, TagValue::Int(1000)),
        (names::LOGGING_LEVEL, TagValue::Int(1)),
        (names::GOOD_OEE_THRESHOLD, TagValue::Number(80.0)),
        (names::POOR_OEE_THRESHOLD, TagValue::Number(60.0)),
        (names::IDEAL_CYCLE_TIME, TagValue::Number(30.0)),
        (names::PLANNED_PRODUCTION_HOURS, TagValue::Number(8.0)),
    ]
}

impl DefaultSeeder {
    pub fn new() -> Self {
        Self { seeded: false }
    }

    /// 是否已完成播种
    pub fn is_seeded(&self) -> bool {
        self.seeded
    }

    /// 对空置输入写入缺省值
    ///
    /// # 参数
    /// - bindings: 实例变量绑定
    ///
    /// # 返回
    /// 实际写入的缺省值个数
    pub fn seed(&mut self, bindings: &VariableBindings) -> usize {
        if self.seeded {
            return 0;
        }
        self.seeded = true;

        let mut written = 0usize;
        for (logical, default) in default_table() {
            let handle = match bindings.handle(logical) {
                Some(h) => h,
                None => continue, // 缺席句柄跳过
            };

            // 仅当前值空置时播种
            let current = bindings.read_raw(logical);
            let needs_seed = match &current {
                Some(v) => v.is_unset(),
                None => true,
            };
            if !needs_seed {
                continue;
            }

            match bindings.write_to(handle, default.clone()) {
                Ok(()) => {
                    written += 1;
                    tracing::debug!(
                        instance = %bindings.display_name(),
                        name = logical,
                        value = %default,
                        "已播种缺省值"
                    );
                }
                Err(e) => {
                    // 尽力而为: 记录后继续
                    tracing::warn!(
                        instance = %bindings.display_name(),
                        name = logical,
                        error = %e,
                        "缺省值播种失败,跳过"
                    );
                }
            }
        }

        if written > 0 {
            tracing::info!(
                instance = %bindings.display_name(),
                written,
                "缺省值播种完成"
            );
        }
        written
    }
}

impl Default for DefaultSeeder {
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
    use crate::binding::store::MemoryStore;
    use std::sync::Arc;

    /// 创建配置数据点为空置状态的测试存储
    fn create_unseeded_store() -> Arc<MemoryStore> {
        let store = MemoryStore::new();
        store.insert_point("LineA/Inputs/GoodCount", TagValue::Int(0));
        store.insert_point("LineA/Inputs/IdealCycleTime", TagValue::Number(0.0));
        store.insert_point("LineA/Config/ShiftCount", TagValue::Int(0));
        store.insert_point("LineA/Config/QualityTarget", TagValue::Empty);
        store.insert_point("LineA/Config/FirstShiftStart", TagValue::Time(NaiveTime::MIN));
        // 已有取值的配置不应被覆盖
        store.insert_point("LineA/Config/OeeTarget", TagValue::Number(65.0));
        Arc::new(store)
    }

    #[test]
    fn test_seed_fills_unset_and_preserves_set() {
        let store = create_unseeded_store();
        let bindings = VariableBindings::bind(store.clone(), "LineA", "产线A").unwrap();
        let mut seeder = DefaultSeeder::new();

        let written = seeder.seed(&bindings);
        assert!(written >= 4);

        assert_eq!(
            store.get_value("LineA/Config/ShiftCount"),
            Some(TagValue::Int(3))
        );
        assert_eq!(
            store.get_value("LineA/Config/QualityTarget"),
            Some(TagValue::Number(95.0))
        );
        assert_eq!(
            store.get_value("LineA/Config/FirstShiftStart"),
            Some(TagValue::Time(NaiveTime::from_hms_opt(6, 0, 0).unwrap()))
        );
        // 已设置的配置保持原值
        assert_eq!(
            store.get_value("LineA/Config/OeeTarget"),
            Some(TagValue::Number(65.0))
        );
    }

    #[test]
    fn test_seed_fires_only_once() {
        let store = create_unseeded_store();
        let bindings = VariableBindings::bind(store.clone(), "LineA", "产线A").unwrap();
        let mut seeder = DefaultSeeder::new();

        let first = seeder.seed(&bindings);
        assert!(first > 0);
        assert!(seeder.is_seeded());

        // 清空后再次调用不得重新播种
        store.set_value("LineA/Config/ShiftCount", TagValue::Int(0));
        let second = seeder.seed(&bindings);
        assert_eq!(second, 0);
        assert_eq!(
            store.get_value("LineA/Config/ShiftCount"),
            Some(TagValue::Int(0))
        );
    }

    #[test]
    fn test_seed_survives_write_rejection() {
        let store = create_unseeded_store();
        store.set_write_rejected("LineA/Config/ShiftCount", Some("只读数据点"));
        let bindings = VariableBindings::bind(store.clone(), "LineA", "产线A").unwrap();
        let mut seeder = DefaultSeeder::new();

        // 单点写失败不阻断其余播种
        let written = seeder.seed(&bindings);
        assert!(written >= 3);
        assert_eq!(
            store.get_value("LineA/Config/QualityTarget"),
            Some(TagValue::Number(95.0))
        );
    }
}
