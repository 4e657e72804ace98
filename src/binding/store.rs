// ==========================================
// 设备综合效率监控系统 - 数据点存储边界
// ==========================================
// 依据: OEE_Engine_Specs_v0.2.md - 6. 外部接口
// ==========================================
// 职责: 定义引擎对底层数据点存储的唯一依赖面
// 红线: 引擎不感知句柄到底层存储的映射方式
// ==========================================

use crate::binding::value::TagValue;
use std::collections::HashMap;
use std::sync::Mutex;
use thiserror::Error;

// ==========================================
// HandleId - 数据点句柄
// ==========================================
// 不透明整数令牌,作为写状态表与历史表的稳定键
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandleId(pub u32);

// ==========================================
// StoreWriteError - 写入失败
// ==========================================
#[derive(Error, Debug, Clone)]
#[error("数据点写入被拒绝: {reason}")]
pub struct StoreWriteError {
    pub reason: String,
}

// ==========================================
// DataPointStore - 存储边界 trait
// ==========================================

/// 数据点存储访问接口
///
/// 实现方负责句柄发现与底层存取;引擎侧假定调用为
/// 进程内同步快速操作 (无外部 I/O 阻塞)。
pub trait DataPointStore: Send + Sync {
    /// 解析路径为句柄
    ///
    /// # 返回
    /// - Some(HandleId): 数据点存在
    /// - None: 数据点不存在 (非错误)
    fn resolve(&self, path: &str) -> Option<HandleId>;

    /// 读取句柄当前值
    fn read(&self, handle: HandleId) -> Option<TagValue>;

    /// 写入句柄
    fn write(&self, handle: HandleId, value: TagValue) -> Result<(), StoreWriteError>;
}

// ==========================================
// MemoryStore - 进程内存储实现
// ==========================================
// 用途: 演示程序与测试;支持注入写拒绝以验证退避逻辑

#[derive(Default)]
struct MemoryStoreInner {
    paths: HashMap<String, HandleId>,
    values: HashMap<HandleId, TagValue>,
    rejected: HashMap<HandleId, String>,
    write_attempts: HashMap<HandleId, usize>,
    next_id: u32,
}

pub struct MemoryStore {
    inner: Mutex<MemoryStoreInner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(MemoryStoreInner::default()),
        }
    }

    /// 获取内部锁;锁中毒时继续使用内部数据 (读写永不抛错)
    fn lock_inner(&self) -> std::sync::MutexGuard<'_, MemoryStoreInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// 注册一个数据点并设置初始值
    ///
    /// # 参数
    /// - path: 数据点路径
    /// - initial: 初始值
    ///
    /// # 返回
    /// 分配的句柄
    pub fn insert_point(&self, path: &str, initial: TagValue) -> HandleId {
        let mut inner = self.lock_inner();
        if let Some(handle) = inner.paths.get(path).copied() {
            inner.values.insert(handle, initial);
            return handle;
        }
        let handle = HandleId(inner.next_id);
        inner.next_id += 1;
        inner.paths.insert(path.to_string(), handle);
        inner.values.insert(handle, initial);
        handle
    }

    /// 直接设置数据点值 (模拟现场输入变化)
    pub fn set_value(&self, path: &str, value: TagValue) {
        let mut inner = self.lock_inner();
        if let Some(handle) = inner.paths.get(path).copied() {
            inner.values.insert(handle, value);
        }
    }

    /// 读取数据点当前值
    pub fn get_value(&self, path: &str) -> Option<TagValue> {
        let inner = self.lock_inner();
        let handle = inner.paths.get(path)?;
        inner.values.get(handle).cloned()
    }

    /// 注入写拒绝 (测试退避逻辑用)
    ///
    /// # 参数
    /// - path: 数据点路径
    /// - reason: Some(原因)开启拒绝, None 恢复正常
    pub fn set_write_rejected(&self, path: &str, reason: Option<&str>) {
        let mut inner = self.lock_inner();
        if let Some(handle) = inner.paths.get(path).copied() {
            match reason {
                Some(r) => {
                    inner.rejected.insert(handle, r.to_string());
                }
                None => {
                    inner.rejected.remove(&handle);
                }
            }
        }
    }

    /// 查询某数据点累计写尝试次数 (含被拒绝的尝试)
    pub fn write_attempts(&self, path: &str) -> usize {
        let inner = self.lock_inner();
        inner
            .paths
            .get(path)
            .and_then(|h| inner.write_attempts.get(h))
            .copied()
            .unwrap_or(0)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DataPointStore for MemoryStore {
    fn resolve(&self, path: &str) -> Option<HandleId> {
        let inner = self.lock_inner();
        inner.paths.get(path).copied()
    }

    fn read(&self, handle: HandleId) -> Option<TagValue> {
        let inner = self.lock_inner();
        inner.values.get(&handle).cloned()
    }

    fn write(&self, handle: HandleId, value: TagValue) -> Result<(), StoreWriteError> {
        let mut inner = self.lock_inner();
        *inner.write_attempts.entry(handle).or_insert(0) += 1;
        if let Some(reason) = inner.rejected.get(&handle) {
            return Err(StoreWriteError {
                reason: reason.clone(),
            });
        }
        inner.values.insert(handle, value);
        Ok(())
    }
}

// ==========================================
// 单元测试
// ==========================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_and_read() {
        let store = MemoryStore::new();
        let handle = store.insert_point("LineA/Inputs/GoodCount", TagValue::Int(10));

        assert_eq!(store.resolve("LineA/Inputs/GoodCount"), Some(handle));
        assert_eq!(store.resolve("LineA/Inputs/Missing"), None);
        assert_eq!(store.read(handle), Some(TagValue::Int(10)));
    }

    #[test]
    fn test_write_rejection_and_attempt_count() {
        let store = MemoryStore::new();
        let handle = store.insert_point("LineA/Outputs/Quality", TagValue::Number(0.0));

        store.set_write_rejected("LineA/Outputs/Quality", Some("下游离线"));
        assert!(store.write(handle, TagValue::Number(95.0)).is_err());
        // 拒绝的尝试也计数
        assert_eq!(store.write_attempts("LineA/Outputs/Quality"), 1);
        // 原值未被覆盖
        assert_eq!(store.read(handle), Some(TagValue::Number(0.0)));

        store.set_write_rejected("LineA/Outputs/Quality", None);
        assert!(store.write(handle, TagValue::Number(95.0)).is_ok());
        assert_eq!(store.read(handle), Some(TagValue::Number(95.0)));
        assert_eq!(store.write_attempts("LineA/Outputs/Quality"), 2);
    }

    #[test]
    fn test_insert_point_is_idempotent_on_handle() {
        let store = MemoryStore::new();
        let h1 = store.insert_point("LineA/X", TagValue::Int(1));
        let h2 = store.insert_point("LineA/X", TagValue::Int(2));
        assert_eq!(h1, h2);
        assert_eq!(store.read(h1), Some(TagValue::Int(2)));
    }
}
