//! “磁盘”数据结构层
//!
//! 虽然没有真正的后备存储，这一层的结构仍按在盘上的样子定义：
//! 定长的分配位图、带 11 个块引用的索引节点、定长的目录项。

mod bitmap;
pub(crate) use bitmap::Bitmap;

mod dir_entry;
pub use dir_entry::DirEntry;

mod inode;
pub use inode::Inumber;
pub(crate) use inode::{fill_empty_refs, read_ref, write_ref, Inode, InodeKind};
