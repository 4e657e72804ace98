// ==========================================
// 设备综合效率监控系统 - 班次描述
// ==========================================
// 依据: OEE_Engine_Specs_v0.2.md - 4.4 班次调度
// ==========================================

use chrono::{NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

// ==========================================
// ShiftInfo - 当前班次描述
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShiftInfo {
    /// 班次号 (>=1)
    pub shift_number: u32,
    /// 班次开始 (绝对时间,跨午夜时可能落在前一天)
    pub shift_start: NaiveDateTime,
    /// 班次结束 (绝对时间)
    pub shift_end: NaiveDateTime,
    /// 班次开始时刻 (time-of-day)
    pub start_time: NaiveTime,
    /// 班次结束时刻 (time-of-day)
    pub end_time: NaiveTime,
    /// 本班已过秒数
    pub elapsed_seconds: i64,
    /// 本班剩余秒数 (钳制 >=0)
    pub remaining_seconds: i64,
    /// 换班沿触发标志: 班次号变化后恰好为真一次
    pub change_occurred: bool,
    /// 换班临近标志: 剩余时间落入预警窗口
    pub change_imminent: bool,
}
