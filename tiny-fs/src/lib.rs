/* tiny-fs 的整体架构，自上而下 */

// 操作层：路径解析、目录操作与并发读写引擎
mod vfs;
pub use vfs::OpenFlag;

// 文件系统状态层：三张表的装配与生命周期
mod fs;
pub use fs::TinyFileSystem;

// 打开文件表层：易失状态，句柄即表内下标
mod open_file;
pub use open_file::Fd;

// 索引节点表层
mod inode_table;

// 数据块池层
mod pool;

// “磁盘”数据结构层：分配位图、索引节点与目录项
mod layout;
pub use layout::{DirEntry, Inumber};

// 实体双锁：读写锁与互斥锁并立
mod sync;

// 时延注入层：模拟二级存储的访问时延
mod delay;

mod error;
pub use error::{FsError, FsResult};

/// 块大小（字节）
pub const BLOCK_SIZE: usize = 1024;
/// 数据块池中的块数
pub const DATA_BLOCKS: usize = 1024;
/// 索引节点表容量
pub const INODE_TABLE_SIZE: usize = 50;
/// 打开文件表容量
pub const MAX_OPEN_FILES: usize = 20;
/// 文件名上限（含结尾 `\0`）
pub const MAX_FILE_NAME: usize = 40;
/// 直接块数量
pub const MAX_DIRECT_BLOCKS: usize = 10;
/// inode 中的块引用槽位：10 个直接槽加 1 个间接槽
pub const I_BLOCK_SLOTS: usize = MAX_DIRECT_BLOCKS + 1;
/// 直接区容量（字节）
pub const MAX_BYTES_DIRECT: usize = MAX_DIRECT_BLOCKS * BLOCK_SIZE;
/// 一个间接块可容纳的块引用数
pub const INDIRECT_REFS: usize = BLOCK_SIZE / core::mem::size_of::<u32>();
/// 单个文件的容量上限（字节）
pub const MAX_BYTES: usize = MAX_BYTES_DIRECT + INDIRECT_REFS * BLOCK_SIZE;
/// 根目录块可容纳的目录项数
pub const MAX_DIR_ENTRIES: usize = BLOCK_SIZE / DirEntry::SIZE;

pub(crate) type DataBlock = [u8; BLOCK_SIZE];
