//! 数据块池
//!
//! 定长的块数组加一张 Free/Taken 位图。位图躲在池的互斥锁后面；
//! 块内容各自持一把读写锁，由持有相应 inode 或目录锁的调用者取用。

use spin::{Mutex, RwLock};

use crate::delay;
use crate::error::{FsError, FsResult};
use crate::layout::Bitmap;
use crate::{DataBlock, BLOCK_SIZE, DATA_BLOCKS};

/// 数据块编号
pub(crate) type BlockId = usize;

pub(crate) struct BlockPool {
    map: Mutex<Bitmap<DATA_BLOCKS>>,
    blocks: Box<[RwLock<DataBlock>]>,
}

impl BlockPool {
    pub fn new() -> Self {
        Self {
            map: Mutex::new(Bitmap::new()),
            blocks: (0..DATA_BLOCKS).map(|_| RwLock::new([0; BLOCK_SIZE])).collect(),
        }
    }

    /// 首次适应分配一个数据块
    pub fn alloc(&self) -> FsResult<BlockId> {
        self.map.lock().alloc().ok_or(FsError::Exhausted)
    }

    pub fn free(&self, block_id: BlockId) -> FsResult<()> {
        if block_id >= DATA_BLOCKS {
            return Err(FsError::InvalidInput);
        }
        delay::insert_delay();
        self.map.lock().free(block_id);
        Ok(())
    }

    /// 取出某块的内容锁；合法编号下永不失败
    pub fn get(&self, block_id: BlockId) -> FsResult<&RwLock<DataBlock>> {
        if block_id >= DATA_BLOCKS {
            return Err(FsError::InvalidInput);
        }
        delay::insert_delay();
        Ok(&self.blocks[block_id])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_free_realloc() {
        let pool = BlockPool::new();
        let first = pool.alloc().unwrap();
        let second = pool.alloc().unwrap();
        assert_ne!(first, second);

        pool.free(first).unwrap();
        assert_eq!(pool.alloc().unwrap(), first);
    }

    #[test]
    fn out_of_range_is_rejected() {
        let pool = BlockPool::new();
        assert_eq!(pool.free(DATA_BLOCKS), Err(FsError::InvalidInput));
        assert!(pool.get(DATA_BLOCKS).is_err());
        assert!(pool.get(0).is_ok());
    }
}
