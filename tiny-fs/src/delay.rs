//! 时延注入层
//!
//! 在触及“持久”状态的路径上插入一小段忙等，
//! 模拟 inode、位图与数据块真的躺在二级存储上。
//! 对正确性是 no-op，但定时敏感的测试依赖它。

use core::sync::atomic::{compiler_fence, Ordering};

/// 每次模拟磁盘访问的忙等轮数
const DELAY: usize = 5000;

/// 编译器屏障使空循环不会被优化掉
#[inline(never)]
pub(crate) fn insert_delay() {
    for _ in 0..DELAY {
        compiler_fence(Ordering::SeqCst);
    }
}
