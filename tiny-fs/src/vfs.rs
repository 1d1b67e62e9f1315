//! 操作层
//!
//! 路径解析、根目录操作与并发读写引擎。
//!
//! 锁的获取顺序固定：
//! 打开文件位图 → 打开文件表项 → inode 位图 → inode → 数据块位图 → 块内容。
//! 读写两路同序、互不重入，不会成环。
//! 写路径取 inode 的写锁；读路径取读锁，同一文件的多个读者
//! 可以在各自块上并行拷贝。同一句柄上的整段操作由表项的互斥锁串行化。

use enumflags2::{bitflags, BitFlags};
use log::{debug, warn};
use spin::RwLock;

use crate::error::{FsError, FsResult};
use crate::fs::TinyFileSystem;
use crate::layout::{self, DirEntry, Inode, InodeKind, Inumber};
use crate::open_file::Fd;
use crate::pool::BlockId;
use crate::{DataBlock, BLOCK_SIZE, MAX_BYTES, MAX_BYTES_DIRECT, MAX_DIRECT_BLOCKS, MAX_DIR_ENTRIES};

/// `open` 的标志位，可任意组合
#[rustfmt::skip]
#[allow(clippy::upper_case_acronyms)]
#[bitflags]
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenFlag {
    /// 追加写：初始偏移置于文件末尾
    APPEND = 0b0000_0001,
    /// 打开时清空文件
    TRUNC  = 0b0000_0010,
    /// 不存在则创建
    CREATE = 0b0100_0000,
}

/// 合法路径形如 `/name`：以 `/` 开头，后随非空的单段名字
fn file_name(path: &str) -> FsResult<&str> {
    match path.strip_prefix('/') {
        Some(name) if !name.is_empty() => Ok(name),
        _ => Err(FsError::InvalidInput),
    }
}

impl TinyFileSystem {
    /// 路径到 inumber
    pub fn lookup(&self, path: &str) -> FsResult<Inumber> {
        self.find_in_root(file_name(path)?)
    }

    /// 打开（必要时创建）一个文件，返回句柄。
    /// 创建后目录项挂不上时，补偿动作是删掉刚建的 inode。
    pub fn open(&self, path: &str, flags: impl Into<BitFlags<OpenFlag>>) -> FsResult<Fd> {
        let flags = flags.into();
        let name = file_name(path)?;

        let (inumber, offset) = match self.find_in_root(name) {
            Ok(inumber) => {
                let cell = self.inodes.get(inumber)?;
                let _serial = cell.mutex();
                let mut inode = cell.write();

                if flags.contains(OpenFlag::TRUNC) && inode.size > 0 {
                    for block_id in inode.clear(&self.pool)? {
                        self.pool.free(block_id)?;
                    }
                }

                let offset = if flags.contains(OpenFlag::APPEND) {
                    inode.size
                } else {
                    0
                };
                (inumber, offset)
            }
            Err(FsError::NotFound) if flags.contains(OpenFlag::CREATE) => {
                let inumber = self.inodes.create(InodeKind::File, &self.pool)?;
                if let Err(err) = self.add_to_root(inumber, name) {
                    if let Err(undo) = self.inodes.delete(inumber, &self.pool) {
                        warn!("open {path}: dropping fresh inode {inumber} failed: {undo}");
                    }
                    return Err(err);
                }
                (inumber, 0)
            }
            Err(err) => return Err(err),
        };

        let fd = self.open_files.add(inumber, offset)?;
        debug!("open {path}: fd {fd}");
        Ok(fd)
    }

    /// 归还句柄
    pub fn close(&self, fd: Fd) -> FsResult<()> {
        self.open_files.remove(fd)
    }

    /// 从当前偏移读入 `buf`，返回实际读到的字节数。
    /// 超出文件末尾的部分被截掉，读到 0 字节不是错误。
    pub fn read(&self, fd: Fd, buf: &mut [u8]) -> FsResult<usize> {
        if buf.is_empty() {
            warn!("read: nothing to read");
            return Err(FsError::InvalidInput);
        }

        let entry_cell = self.open_files.get(fd)?;
        let _serial = entry_cell.mutex();
        let mut entry = entry_cell.write();

        let inode_cell = self.inodes.get(entry.inumber)?;
        let inode = inode_cell.read();

        let to_read = inode.size.saturating_sub(entry.offset).min(buf.len());
        if to_read == 0 {
            return Ok(0);
        }

        let total = if entry.offset + to_read <= MAX_BYTES_DIRECT {
            self.read_direct(&inode, &mut entry.offset, &mut buf[..to_read])?
        } else if entry.offset >= MAX_BYTES_DIRECT {
            self.read_indirect(&inode, &mut entry.offset, &mut buf[..to_read])?
        } else {
            // 跨直接区边界：拆成两段
            let direct_len = MAX_BYTES_DIRECT - entry.offset;
            let direct = self.read_direct(&inode, &mut entry.offset, &mut buf[..direct_len])?;
            direct + self.read_indirect(&inode, &mut entry.offset, &mut buf[direct..to_read])?
        };

        Ok(total)
    }

    /// 在当前偏移写入 `buf`，返回实际写入的字节数。
    /// 文件容量到顶时返回的计数小于请求，写入 0 字节不是错误。
    pub fn write(&self, fd: Fd, buf: &[u8]) -> FsResult<usize> {
        if buf.is_empty() {
            warn!("write: nothing to write");
            return Err(FsError::InvalidInput);
        }

        let entry_cell = self.open_files.get(fd)?;
        let _serial = entry_cell.mutex();
        let mut entry = entry_cell.write();

        let inode_cell = self.inodes.get(entry.inumber)?;
        let mut inode = inode_cell.write();

        let total = if inode.size + buf.len() <= MAX_BYTES_DIRECT {
            self.write_direct(&mut inode, &mut entry.offset, buf)?
        } else if inode.size >= MAX_BYTES_DIRECT {
            self.ensure_indirect(&mut inode)?;
            self.write_indirect(&mut inode, &mut entry.offset, buf)?
        } else {
            // 跨直接区边界：先填满直接区，再进间接区
            let direct_len = MAX_BYTES_DIRECT - inode.size;
            let direct = self.write_direct(&mut inode, &mut entry.offset, &buf[..direct_len])?;
            self.ensure_indirect(&mut inode)?;
            direct + self.write_indirect(&mut inode, &mut entry.offset, &buf[direct..])?
        };

        Ok(total)
    }

    /// 根目录下的全部名字
    pub fn ls(&self) -> FsResult<Vec<String>> {
        let block = self.root_block()?;
        let data = block.read();

        let mut entry = DirEntry::empty();
        let mut names = Vec::new();
        for slot in 0..MAX_DIR_ENTRIES {
            entry
                .as_bytes_mut()
                .copy_from_slice(&data[slot * DirEntry::SIZE..][..DirEntry::SIZE]);
            if entry.inumber().is_some() {
                names.push(entry.name().to_owned());
            }
        }
        Ok(names)
    }
}

// 根目录
impl TinyFileSystem {
    /// 持 inode 位图的读侧取出根的目录块
    fn root_block(&self) -> FsResult<&RwLock<DataBlock>> {
        let cell = self.inodes.get(Inumber::ROOT)?;
        let root = cell.read();
        if root.kind != InodeKind::Directory {
            return Err(FsError::InvalidInput);
        }
        let block_id = root.blocks[0].ok_or(FsError::NotFound)?;
        self.pool.get(block_id)
    }

    /// 在根目录里按名字查找。比较有界在 `MAX_FILE_NAME` 字节之内。
    fn find_in_root(&self, name: &str) -> FsResult<Inumber> {
        let block = self.root_block()?;
        let data = block.read();

        let mut entry = DirEntry::empty();
        for slot in 0..MAX_DIR_ENTRIES {
            entry
                .as_bytes_mut()
                .copy_from_slice(&data[slot * DirEntry::SIZE..][..DirEntry::SIZE]);
            if let Some(inumber) = entry.inumber() {
                if entry.matches(name) {
                    return Ok(inumber);
                }
            }
        }
        Err(FsError::NotFound)
    }

    /// 把 `sub` 以截断后的名字挂进第一个空目录项
    fn add_to_root(&self, sub: Inumber, name: &str) -> FsResult<()> {
        if name.is_empty() {
            return Err(FsError::InvalidInput);
        }

        let block = self.root_block()?;
        let mut data = block.write();

        let mut entry = DirEntry::empty();
        for slot in 0..MAX_DIR_ENTRIES {
            entry
                .as_bytes_mut()
                .copy_from_slice(&data[slot * DirEntry::SIZE..][..DirEntry::SIZE]);
            if entry.inumber().is_none() {
                let fresh = DirEntry::new(name, sub);
                data[slot * DirEntry::SIZE..][..DirEntry::SIZE].copy_from_slice(fresh.as_bytes());
                return Ok(());
            }
        }

        warn!("root directory is full");
        Err(FsError::Exhausted)
    }
}

// 读写引擎
impl TinyFileSystem {
    /// 直接区读取：沿直接槽逐块拷贝
    fn read_direct(&self, inode: &Inode, offset: &mut usize, buf: &mut [u8]) -> FsResult<usize> {
        let mut total = 0;
        while total < buf.len() {
            let block_id = inode.blocks[Inode::direct_slot(*offset)].ok_or(FsError::NotFound)?;
            let block = self.pool.get(block_id)?;
            let data = block.read();

            let intra = *offset % BLOCK_SIZE;
            let count = (buf.len() - total).min(BLOCK_SIZE - intra);
            buf[total..total + count].copy_from_slice(&data[intra..intra + count]);

            *offset += count;
            total += count;
        }
        Ok(total)
    }

    /// 间接区读取：每块经由间接块里的引用寻址
    fn read_indirect(&self, inode: &Inode, offset: &mut usize, buf: &mut [u8]) -> FsResult<usize> {
        let indirect = inode.blocks[MAX_DIRECT_BLOCKS].ok_or(FsError::NotFound)?;

        let mut total = 0;
        while total < buf.len() {
            let block_id = {
                let refs = self.pool.get(indirect)?.read();
                layout::read_ref(&refs, Inode::indirect_index(*offset))
            }
            .ok_or(FsError::NotFound)?;
            let block = self.pool.get(block_id)?;
            let data = block.read();

            let intra = *offset % BLOCK_SIZE;
            let count = (buf.len() - total).min(BLOCK_SIZE - intra);
            buf[total..total + count].copy_from_slice(&data[intra..intra + count]);

            *offset += count;
            total += count;
        }
        Ok(total)
    }

    /// 直接区写入。块边界上就地分配新块并登记进下一个直接槽，
    /// 拷贝一律落在工作块上。
    fn write_direct(&self, inode: &mut Inode, offset: &mut usize, buf: &[u8]) -> FsResult<usize> {
        let mut total = 0;
        while total < buf.len() {
            if inode.size % BLOCK_SIZE == 0 {
                let fresh = self.alloc_zeroed()?;
                inode.blocks[Inode::direct_slot(inode.size)] = Some(fresh);
                inode.working = Some(fresh);
            }

            let block_id = inode.working.ok_or(FsError::NotFound)?;
            let block = self.pool.get(block_id)?;
            let mut data = block.write();

            let intra = *offset % BLOCK_SIZE;
            let count = (buf.len() - total).min(BLOCK_SIZE - intra);
            data[intra..intra + count].copy_from_slice(&buf[total..total + count]);

            *offset += count;
            inode.size += count;
            total += count;
        }
        Ok(total)
    }

    /// 间接区写入。进入时按文件容量截断，新块登记进间接块的引用槽。
    fn write_indirect(&self, inode: &mut Inode, offset: &mut usize, buf: &[u8]) -> FsResult<usize> {
        let indirect = inode.blocks[MAX_DIRECT_BLOCKS].ok_or(FsError::NotFound)?;
        let len = buf.len().min(MAX_BYTES - inode.size);

        let mut total = 0;
        while total < len {
            if inode.size % BLOCK_SIZE == 0 {
                let fresh = self.alloc_zeroed()?;
                let mut refs = self.pool.get(indirect)?.write();
                layout::write_ref(&mut refs, Inode::indirect_index(inode.size), fresh);
                drop(refs);
                inode.working = Some(fresh);
            }

            let block_id = inode.working.ok_or(FsError::NotFound)?;
            let block = self.pool.get(block_id)?;
            let mut data = block.write();

            let intra = *offset % BLOCK_SIZE;
            let count = (len - total).min(BLOCK_SIZE - intra);
            data[intra..intra + count].copy_from_slice(&buf[total..total + count]);

            *offset += count;
            inode.size += count;
            total += count;
        }
        Ok(total)
    }

    /// 间接块缺席时分配之，引用槽全部置空
    fn ensure_indirect(&self, inode: &mut Inode) -> FsResult<()> {
        if inode.blocks[MAX_DIRECT_BLOCKS].is_none() {
            let block_id = self.pool.alloc()?;
            let mut refs = self.pool.get(block_id)?.write();
            layout::fill_empty_refs(&mut refs);
            drop(refs);

            inode.blocks[MAX_DIRECT_BLOCKS] = Some(block_id);
            inode.working = Some(block_id);
        }
        Ok(())
    }

    /// 分配并清零一个数据块
    fn alloc_zeroed(&self) -> FsResult<BlockId> {
        let block_id = self.pool.alloc()?;
        self.pool.get(block_id)?.write().fill(0);
        Ok(block_id)
    }
}
