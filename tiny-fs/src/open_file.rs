//! 打开文件表
//!
//! 易失状态：句柄就是表内下标。位图扫描不注入存储时延。

use core::fmt;

use array_macro::array;

use crate::error::{FsError, FsResult};
use crate::layout::{Bitmap, Inumber};
use crate::sync::LockCell;
use crate::MAX_OPEN_FILES;

/// 文件句柄，由 `open` 发放
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Fd(usize);

impl Fd {
    pub(crate) const fn new(index: usize) -> Self {
        Self(index)
    }

    pub(crate) const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for Fd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// 打开文件表项：指向的 inode 与当前字节偏移
#[derive(Debug, Clone, Copy)]
pub(crate) struct OpenFile {
    pub inumber: Inumber,
    pub offset: usize,
}

pub(crate) struct OpenFileTable {
    map: LockCell<Bitmap<MAX_OPEN_FILES>>,
    cells: [LockCell<OpenFile>; MAX_OPEN_FILES],
}

impl OpenFileTable {
    pub fn new() -> Self {
        Self {
            map: LockCell::new(Bitmap::new()),
            cells: array![_ => LockCell::new(OpenFile { inumber: Inumber::ROOT, offset: 0 }); MAX_OPEN_FILES],
        }
    }

    /// 发放一个句柄。位图的互斥锁在表内统一持有。
    pub fn add(&self, inumber: Inumber, offset: usize) -> FsResult<Fd> {
        let _serial = self.map.mutex();
        let mut map = self.map.write();
        let index = map.alloc_volatile().ok_or(FsError::Exhausted)?;
        *self.cells[index].write() = OpenFile { inumber, offset };
        Ok(Fd::new(index))
    }

    pub fn remove(&self, fd: Fd) -> FsResult<()> {
        let _serial = self.map.mutex();
        let mut map = self.map.write();
        if fd.index() >= MAX_OPEN_FILES || !map.is_taken(fd.index()) {
            return Err(FsError::InvalidInput);
        }
        map.free(fd.index());
        Ok(())
    }

    /// 句柄到表项。表项字段的访问由调用者对单元加锁。
    pub fn get(&self, fd: Fd) -> FsResult<&LockCell<OpenFile>> {
        let map = self.map.read();
        if fd.index() >= MAX_OPEN_FILES || !map.is_taken(fd.index()) {
            return Err(FsError::InvalidInput);
        }
        drop(map);
        Ok(&self.cells[fd.index()])
    }
}
