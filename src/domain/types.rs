// ==========================================
// 设备综合效率监控系统 - 领域类型定义
// ==========================================
// 依据: OEE_Engine_Specs_v0.2.md - 2. 指标口径
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 趋势标签 (Trend Label)
// ==========================================
// 由滚动历史分类得出,固定枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrendLabel {
    InsufficientData, // 样本不足 (<2)
    RisingStrongly,   // 强上升 (>= +2)
    Rising,           // 上升 (>= +0.5)
    Stable,           // 平稳
    Falling,          // 下降 (<= -0.5)
    FallingStrongly,  // 强下降 (<= -2)
}

impl fmt::Display for TrendLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrendLabel::InsufficientData => write!(f, "Insufficient Data"),
            TrendLabel::RisingStrongly => write!(f, "Rising Strongly"),
            TrendLabel::Rising => write!(f, "Rising"),
            TrendLabel::Stable => write!(f, "Stable"),
            TrendLabel::Falling => write!(f, "Falling"),
            TrendLabel::FallingStrongly => write!(f, "Falling Strongly"),
        }
    }
}

// ==========================================
// 运行状态 (System Status)
// ==========================================
// 由运行时长计数器的单调推进派生
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SystemStatus {
    Starting, // 首次观测
    Running,  // 计数器推进中
    Stopped,  // 计数器停滞超过时效窗口
}

impl Default for SystemStatus {
    fn default() -> Self {
        SystemStatus::Starting
    }
}

impl fmt::Display for SystemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SystemStatus::Starting => write!(f, "Starting"),
            SystemStatus::Running => write!(f, "Running"),
            SystemStatus::Stopped => write!(f, "Stopped"),
        }
    }
}

// ==========================================
// OEE 评级 (OEE Rating)
// ==========================================
// 按好/差阈值对 OEE 分级 (默认 80/60)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OeeRating {
    Good, // OEE >= 好阈值
    Fair, // 差阈值 <= OEE < 好阈值
    Poor, // OEE < 差阈值
}

impl fmt::Display for OeeRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OeeRating::Good => write!(f, "Good"),
            OeeRating::Fair => write!(f, "Fair"),
            OeeRating::Poor => write!(f, "Poor"),
        }
    }
}

// ==========================================
// 零分母口径 (Zero Denominator Convention)
// ==========================================
// 现场存在两种口径: 运行时长为0时性能取0还是取100,
// 计划时长无效时可用率取0还是取100。
// 作为显式配置项保留,待产品方确认统一口径。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ZeroDenominatorConvention {
    TreatAsZero, // 视为"尚无意义",取0
    TreatAsFull, // 视为"无表现不佳的机会",取100
}

impl Default for ZeroDenominatorConvention {
    fn default() -> Self {
        ZeroDenominatorConvention::TreatAsZero
    }
}

// ==========================================
// 班次数口径 (Shift Count Policy)
// ==========================================
// 现场存在两种口径: 班次数钳制在[1,3]或不设上限。
// 下限恒为1。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShiftCountPolicy {
    Unbounded,    // 不设上限
    ClampToThree, // 钳制在[1,3]
}

impl Default for ShiftCountPolicy {
    fn default() -> Self {
        ShiftCountPolicy::Unbounded
    }
}

impl ShiftCountPolicy {
    /// 按口径规整配置的班次数
    ///
    /// 取值先钳制到 [1, 86400] (每班至少1秒) 再套上限口径,
    /// 超界配置不得引发截断或除零
    pub fn normalize(&self, configured: i64) -> u32 {
        let n = configured.clamp(1, 86400) as u32;
        match self {
            ShiftCountPolicy::Unbounded => n,
            ShiftCountPolicy::ClampToThree => n.min(3),
        }
    }
}
