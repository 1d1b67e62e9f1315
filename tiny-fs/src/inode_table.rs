//! 索引节点表
//!
//! 定长的 inode 单元数组：分配位图住在自己的双锁单元里供扫描，
//! 每个 inode 单元又自带一对读写锁与互斥锁。
//! 获取顺序固定为 位图 → inode 单元 → 数据块位图。

use array_macro::array;

use crate::delay;
use crate::error::{FsError, FsResult};
use crate::layout::{Bitmap, DirEntry, Inode, InodeKind, Inumber};
use crate::pool::BlockPool;
use crate::sync::LockCell;
use crate::{BLOCK_SIZE, INODE_TABLE_SIZE, MAX_DIR_ENTRIES};

pub(crate) struct InodeTable {
    map: LockCell<Bitmap<INODE_TABLE_SIZE>>,
    cells: [LockCell<Inode>; INODE_TABLE_SIZE],
}

impl InodeTable {
    pub fn new() -> Self {
        Self {
            map: LockCell::new(Bitmap::new()),
            cells: array![_ => LockCell::new(Inode::new(InodeKind::File)); INODE_TABLE_SIZE],
        }
    }

    /// 创建一个 inode。目录顺手分配一个数据块并铺满空目录项；
    /// 块池枯竭时把位图槽还回去。
    pub fn create(&self, kind: InodeKind, pool: &BlockPool) -> FsResult<Inumber> {
        // 位图锁只罩住扫描本身
        let index = {
            let _serial = self.map.mutex();
            let mut map = self.map.write();
            map.alloc().ok_or(FsError::Exhausted)?
        };

        delay::insert_delay();
        let mut inode = self.cells[index].write();
        *inode = Inode::new(kind);

        if kind == InodeKind::Directory {
            let block_id = match pool.alloc() {
                Ok(block_id) => block_id,
                Err(err) => {
                    drop(inode);
                    let _serial = self.map.mutex();
                    self.map.write().free(index);
                    return Err(err);
                }
            };

            let mut data = pool.get(block_id)?.write();
            data.fill(0);
            let empty = DirEntry::empty();
            for slot in 0..MAX_DIR_ENTRIES {
                data[slot * DirEntry::SIZE..][..DirEntry::SIZE].copy_from_slice(empty.as_bytes());
            }
            drop(data);

            inode.size = BLOCK_SIZE;
            inode.working = Some(block_id);
            inode.blocks[0] = Some(block_id);
        }

        Ok(Inumber::new(index))
    }

    /// 删除一个 inode，引用的数据块全部交还块池
    pub fn delete(&self, inumber: Inumber, pool: &BlockPool) -> FsResult<()> {
        delay::insert_delay();
        delay::insert_delay();

        let _serial = self.map.mutex();
        let mut map = self.map.write();
        let index = inumber.index();
        if index >= INODE_TABLE_SIZE || !map.is_taken(index) {
            return Err(FsError::NotFound);
        }

        let mut inode = self.cells[index].write();
        for block_id in inode.clear(pool)? {
            pool.free(block_id)?;
        }
        map.free(index);
        Ok(())
    }

    /// 编号到 inode 单元。单元字段的访问由调用者自行加锁。
    pub fn get(&self, inumber: Inumber) -> FsResult<&LockCell<Inode>> {
        let map = self.map.read();
        let index = inumber.index();
        if index >= INODE_TABLE_SIZE || !map.is_taken(index) {
            return Err(FsError::NotFound);
        }
        delay::insert_delay();
        Ok(&self.cells[index])
    }
}
