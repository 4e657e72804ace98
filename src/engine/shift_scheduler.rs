// ==========================================
// 设备综合效率监控系统 - 班次调度器
// ==========================================
// 依据: OEE_Engine_Specs_v0.2.md - 4.4 班次调度
// ==========================================
// 职责: (当前时间, 班次配置) → 班次描述 + 换班/临近标志
// 口径: 一天86400秒均分为N班,支持跨午夜回绕
// ==========================================

use crate::config::snapshot::ConfigSnapshot;
use crate::domain::shift::ShiftInfo;
use crate::domain::types::ShiftCountPolicy;
use chrono::{Duration, NaiveDateTime, Timelike};

/// 换班临近预警窗口缺省值 (秒); 轻量变体使用0.5s窗口,
/// 故作为构造参数保留
pub const DEFAULT_IMMINENT_WINDOW_SECONDS: i64 = 300;

// 内部节流: 最小重算间隔,高频调用时复用缓存结果
const MIN_RECOMPUTE_INTERVAL_SECONDS: i64 = 1;

const SECONDS_PER_DAY: i64 = 86400;

// ==========================================
// ShiftScheduler - 班次调度器
// ==========================================
pub struct ShiftScheduler {
    policy: ShiftCountPolicy,
    imminent_window_seconds: i64,
    last_computed_at: Option<NaiveDateTime>,
    last_shift_number: Option<u32>,
    cached: Option<ShiftInfo>,
}

impl ShiftScheduler {
    /// 构造函数 (缺省口径: 班次数不设上限, 5分钟预警窗口)
    pub fn new() -> Self {
        Self::with_options(ShiftCountPolicy::default(), DEFAULT_IMMINENT_WINDOW_SECONDS)
    }

    /// 按显式口径构造
    ///
    /// # 参数
    /// - policy: 班次数钳制口径
    /// - imminent_window_seconds: 换班临近预警窗口 (秒)
    pub fn with_options(policy: ShiftCountPolicy, imminent_window_seconds: i64) -> Self {
        Self {
            policy,
            imminent_window_seconds: imminent_window_seconds.max(0),
            last_computed_at: None,
            last_shift_number: None,
            cached: None,
        }
    }

    /// 计算当前班次描述
    ///
    /// 内部节流: 距上次计算不足1秒时返回缓存结果,
    /// 缓存的换班沿标志在首次返回后即被消费 (恰好为真一次)。
    ///
    /// # 参数
    /// - now: 当前本地时间
    /// - config: 配置快照 (班次数与第一班开始时刻)
    pub fn compute(&mut self, now: NaiveDateTime, config: &ConfigSnapshot) -> ShiftInfo {
        if let (Some(at), Some(cached)) = (self.last_computed_at, self.cached.as_ref()) {
            let since_last = (now - at).num_seconds();
            if (0..MIN_RECOMPUTE_INTERVAL_SECONDS).contains(&since_last) {
                return cached.clone();
            }
        }

        let info = self.compute_fresh(now, config);
        self.last_computed_at = Some(now);
        // 缓存中的沿触发标志置假: 同一次换班只报告一次
        let mut cached = info.clone();
        cached.change_occurred = false;
        self.cached = Some(cached);
        info
    }

    /// 无节流的完整重算
    fn compute_fresh(&mut self, now: NaiveDateTime, config: &ConfigSnapshot) -> ShiftInfo {
        let shift_count = self.policy.normalize(config.shift_count);
        // 班次数极大时时长向下取整,至少1秒防止除零
        let duration_seconds = (SECONDS_PER_DAY / shift_count as i64).max(1);

        // 1. 自第一班开始以来的秒数 (mod 86400, 跨午夜回绕)
        let first_start_seconds = config.first_shift_start.num_seconds_from_midnight() as i64;
        let now_seconds = now.time().num_seconds_from_midnight() as i64;
        let since_first = (now_seconds - first_start_seconds).rem_euclid(SECONDS_PER_DAY);

        // 2. 班次序号 (86400不整除班次数时取模兜底)
        let shift_index = ((since_first / duration_seconds) as u32) % shift_count;
        let shift_number = shift_index + 1;

        // 3. 班次起止绝对时间; 落在未来则回退一天
        let mut shift_start = now.date().and_time(config.first_shift_start)
            + Duration::seconds(shift_index as i64 * duration_seconds);
        if shift_start > now {
            shift_start -= Duration::days(1);
        }
        let shift_end = shift_start + Duration::seconds(duration_seconds);

        // 4. 已过/剩余时长
        let elapsed_seconds = (now - shift_start).num_seconds();
        let remaining_seconds = (duration_seconds - elapsed_seconds).max(0);

        // 5. 换班沿标志: 与上次记录的班次号比较,逐周期重新推导
        let change_occurred = self
            .last_shift_number
            .map(|previous| previous != shift_number)
            .unwrap_or(false);
        self.last_shift_number = Some(shift_number);

        ShiftInfo {
            shift_number,
            shift_start,
            shift_end,
            start_time: shift_start.time(),
            end_time: shift_end.time(),
            elapsed_seconds,
            remaining_seconds,
            change_occurred,
            change_imminent: remaining_seconds <= self.imminent_window_seconds,
        }
    }
}

impl Default for ShiftScheduler {
    fn default() -> Self {
        Self::new()
    }
}
