//! 粗粒度取消标志
//!
//! 外部中断（Ctrl-C）设置标志，运动学层在每条执行器命令之前检查。
//! 中断后整个序列作废，不支持断点续做；重新开始前需要回到 Home。

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// 可跨线程共享的取消标志
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    inner: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// 请求取消
    pub fn cancel(&self) {
        self.inner.store(true, Ordering::Release);
    }

    /// 是否已请求取消
    pub fn is_cancelled(&self) -> bool {
        self.inner.load(Ordering::Acquire)
    }

    /// 清除标志（重新从 Home 开始前调用）
    pub fn reset(&self) {
        self.inner.store(false, Ordering::Release);
    }
}
