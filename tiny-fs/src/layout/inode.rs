//! 索引节点与两级文件布局
//!
//! 前 10 个块引用是直接块；第 11 个引用指向一个间接块，
//! 其内容是密排的 4 字节小端块引用。
//! 字节偏移 `B` 落在直接区当且仅当 `B < MAX_BYTES_DIRECT`，
//! 此时它在第 `B / BLOCK_SIZE` 个直接槽；
//! 否则它经由间接块的第 `(B - MAX_BYTES_DIRECT) / BLOCK_SIZE` 个引用寻址。

use core::fmt;
use core::mem;

use crate::error::FsResult;
use crate::pool::{BlockId, BlockPool};
use crate::{DataBlock, BLOCK_SIZE, INDIRECT_REFS, I_BLOCK_SLOTS, MAX_BYTES_DIRECT, MAX_DIRECT_BLOCKS};

/// 索引节点编号
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Inumber(u32);

impl Inumber {
    /// 根目录恒为 0 号
    pub const ROOT: Self = Self(0);

    pub(crate) const fn new(index: usize) -> Self {
        Self(index as u32)
    }

    pub(crate) const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for Inumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<Inumber> for usize {
    fn from(inumber: Inumber) -> Self {
        inumber.index()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InodeKind {
    File,
    Directory,
}

/// 索引节点
#[derive(Debug, Clone)]
pub(crate) struct Inode {
    pub kind: InodeKind,
    /// 文件大小（字节）
    pub size: usize,
    /// 工作块：最近分配的数据块，追加路径不必重走布局
    pub working: Option<BlockId>,
    /// 10 个直接槽加 1 个间接槽
    pub blocks: [Option<BlockId>; I_BLOCK_SLOTS],
}

impl Inode {
    pub fn new(kind: InodeKind) -> Self {
        Self {
            kind,
            size: 0,
            working: None,
            blocks: [None; I_BLOCK_SLOTS],
        }
    }

    /// 直接区：字节偏移所在的直接槽
    pub fn direct_slot(offset: usize) -> usize {
        debug_assert!(offset < MAX_BYTES_DIRECT);
        offset / BLOCK_SIZE
    }

    /// 间接区：字节偏移在间接块中的引用下标
    pub fn indirect_index(offset: usize) -> usize {
        debug_assert!(offset >= MAX_BYTES_DIRECT);
        (offset - MAX_BYTES_DIRECT) / BLOCK_SIZE
    }

    /// 摘下该 inode 引用的全部数据块：直接槽、间接块里的活引用、
    /// 以及间接块本身。块号列表交给调用者还给块池。
    pub fn clear(&mut self, pool: &BlockPool) -> FsResult<Vec<BlockId>> {
        let mut freed: Vec<BlockId> = self.blocks[..MAX_DIRECT_BLOCKS]
            .iter_mut()
            .filter_map(Option::take)
            .collect();

        if let Some(indirect) = self.blocks[MAX_DIRECT_BLOCKS].take() {
            let refs = pool.get(indirect)?.read();
            freed.extend((0..INDIRECT_REFS).filter_map(|slot| read_ref(&refs, slot)));
            drop(refs);
            freed.push(indirect);
        }

        self.size = 0;
        self.working = None;
        Ok(freed)
    }
}

// 间接块中的空引用哨兵，对应“盘上”的 -1
const EMPTY_REF: u32 = u32::MAX;

/// 读出间接块第 `slot` 个块引用
pub(crate) fn read_ref(refs: &DataBlock, slot: usize) -> Option<BlockId> {
    let base = slot * mem::size_of::<u32>();
    let raw = u32::from_le_bytes(refs[base..base + 4].try_into().unwrap());
    (raw != EMPTY_REF).then_some(raw as usize)
}

/// 写入间接块第 `slot` 个块引用
pub(crate) fn write_ref(refs: &mut DataBlock, slot: usize, block_id: BlockId) {
    let base = slot * mem::size_of::<u32>();
    refs[base..base + 4].copy_from_slice(&(block_id as u32).to_le_bytes());
}

/// 把整个间接块填成空引用
pub(crate) fn fill_empty_refs(refs: &mut DataBlock) {
    refs.fill(0xFF);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MAX_BYTES;

    #[test]
    fn direct_and_indirect_addressing() {
        assert_eq!(Inode::direct_slot(0), 0);
        assert_eq!(Inode::direct_slot(BLOCK_SIZE - 1), 0);
        assert_eq!(Inode::direct_slot(BLOCK_SIZE), 1);
        assert_eq!(Inode::direct_slot(MAX_BYTES_DIRECT - 1), MAX_DIRECT_BLOCKS - 1);
        assert_eq!(Inode::indirect_index(MAX_BYTES_DIRECT), 0);
        assert_eq!(Inode::indirect_index(MAX_BYTES - 1), INDIRECT_REFS - 1);
    }

    #[test]
    fn indirect_refs_round_trip() {
        let mut refs = [0u8; BLOCK_SIZE];
        fill_empty_refs(&mut refs);
        assert_eq!(read_ref(&refs, 0), None);
        assert_eq!(read_ref(&refs, INDIRECT_REFS - 1), None);

        write_ref(&mut refs, 7, 513);
        assert_eq!(read_ref(&refs, 7), Some(513));
        assert_eq!(read_ref(&refs, 6), None);
    }
}
