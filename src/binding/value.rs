// ==========================================
// 设备综合效率监控系统 - 数据点值类型
// ==========================================
// 依据: OEE_Engine_Specs_v0.2.md - 4.1 变量绑定
// ==========================================
// 职责: 异构底层表示的统一值类型与容错转换
// 口径: 可解析字符串视同原生数值,解析失败返回 None
// ==========================================

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// TagValue - 数据点值
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TagValue {
    Empty,
    Bool(bool),
    Int(i64),
    Number(f64),
    Text(String),
    Time(NaiveTime),
}

impl TagValue {
    /// 容错转换为浮点数
    ///
    /// # 返回
    /// - Some(f64): 原生数值、布尔(1/0)或可解析字符串
    /// - None: 无法转换
    pub fn as_number(&self) -> Option<f64> {
        match self {
            TagValue::Number(v) if v.is_finite() => Some(*v),
            TagValue::Int(v) => Some(*v as f64),
            TagValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            TagValue::Text(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
            _ => None,
        }
    }

    /// 容错转换为整数
    pub fn as_int(&self) -> Option<i64> {
        match self {
            TagValue::Int(v) => Some(*v),
            TagValue::Number(v) if v.is_finite() => Some(v.round() as i64),
            TagValue::Bool(b) => Some(if *b { 1 } else { 0 }),
            TagValue::Text(s) => {
                let trimmed = s.trim();
                trimmed
                    .parse::<i64>()
                    .ok()
                    .or_else(|| trimmed.parse::<f64>().ok().map(|v| v.round() as i64))
            }
            _ => None,
        }
    }

    /// 容错转换为布尔
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            TagValue::Bool(b) => Some(*b),
            TagValue::Int(v) => Some(*v != 0),
            TagValue::Number(v) => Some(*v != 0.0),
            TagValue::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "1" => Some(true),
                "false" | "0" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    /// 容错转换为时刻 (time-of-day)
    ///
    /// 字符串支持 "HH:MM:SS" 与 "HH:MM" 两种格式
    pub fn as_time(&self) -> Option<NaiveTime> {
        match self {
            TagValue::Time(t) => Some(*t),
            TagValue::Text(s) => {
                let trimmed = s.trim();
                NaiveTime::parse_from_str(trimmed, "%H:%M:%S")
                    .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M"))
                    .ok()
            }
            _ => None,
        }
    }

    /// 判定"未设置": 缺省播种的触发条件
    ///
    /// 口径: 空值、数值0、空白字符串、零值时刻。
    /// 布尔值任何取值都视为已设置。
    pub fn is_unset(&self) -> bool {
        match self {
            TagValue::Empty => true,
            TagValue::Number(v) => *v == 0.0,
            TagValue::Int(v) => *v == 0,
            TagValue::Text(s) => s.trim().is_empty(),
            TagValue::Time(t) => *t == NaiveTime::MIN,
            TagValue::Bool(_) => false,
        }
    }

    /// 容差比较: 浮点字段使用容差,其余精确相等
    ///
    /// # 参数
    /// - other: 对比值
    /// - tolerance: 浮点容差
    pub fn approx_eq(&self, other: &TagValue, tolerance: f64) -> bool {
        match (self, other) {
            (TagValue::Number(a), TagValue::Number(b)) => (a - b).abs() <= tolerance,
            (a, b) => a == b,
        }
    }
}

impl fmt::Display for TagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagValue::Empty => write!(f, ""),
            TagValue::Bool(b) => write!(f, "{}", b),
            TagValue::Int(v) => write!(f, "{}", v),
            TagValue::Number(v) => write!(f, "{}", v),
            TagValue::Text(s) => write!(f, "{}", s),
            TagValue::Time(t) => write!(f, "{}", t.format("%H:%M:%S")),
        }
    }
}
