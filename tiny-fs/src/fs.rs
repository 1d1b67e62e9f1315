//! 文件系统状态的装配与生命周期
//!
//! 没有全局单例：整套状态是一个普通的值，用 `&self` 操作，
//! 可以随意放进 `Arc` 或借给多条线程。

use log::debug;

use crate::error::FsResult;
use crate::inode_table::InodeTable;
use crate::layout::{InodeKind, Inumber};
use crate::open_file::OpenFileTable;
use crate::pool::BlockPool;

/// 进程内的扁平文件系统
pub struct TinyFileSystem {
    pub(crate) inodes: InodeTable,
    pub(crate) pool: BlockPool,
    pub(crate) open_files: OpenFileTable,
}

impl TinyFileSystem {
    /// 建立全零状态并创建根目录 inode，根必得 0 号
    pub fn new() -> FsResult<Self> {
        let fs = Self {
            inodes: InodeTable::new(),
            pool: BlockPool::new(),
            open_files: OpenFileTable::new(),
        };

        let root = fs.inodes.create(InodeKind::Directory, &fs.pool)?;
        assert_eq!(root, Inumber::ROOT);

        debug!("file system: setup done");
        Ok(fs)
    }

    /// 拆除整套状态。纯内存实现下只是消费掉自身。
    pub fn destroy(self) {}
}
