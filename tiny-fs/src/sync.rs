//! 实体双锁
//!
//! 每个可锁实体同时带有一把读写锁和一把互斥锁：数据躺在读写锁下，
//! 互斥锁不直接护着数据，用来把同一实体上的整段操作串行化。
//! 两把锁互不相干，同一线程可以同时持有。

use spin::{Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

pub(crate) struct LockCell<T> {
    serial: Mutex<()>,
    data: RwLock<T>,
}

impl<T> LockCell<T> {
    pub const fn new(data: T) -> Self {
        Self {
            serial: Mutex::new(()),
            data: RwLock::new(data),
        }
    }

    /// 互斥侧：守卫存活期间，同一实体上的其它整段操作不得进入
    pub fn mutex(&self) -> MutexGuard<'_, ()> {
        self.serial.lock()
    }

    pub fn read(&self) -> RwLockReadGuard<'_, T> {
        self.data.read()
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, T> {
        self.data.write()
    }
}
