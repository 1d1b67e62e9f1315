//! 错误类型。短读短写是部分成功而非错误，以 `Ok(n)` 返回。

use core::fmt;

/// 文件系统操作的失败种类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsError {
    /// 参数不合法：空计数、畸形路径、越界或空闲的句柄、对非目录做目录操作
    InvalidInput,
    /// 路径解析无果，或槽位本就空闲
    NotFound,
    /// 某张分配位图已满，或根目录、文件容量到顶
    Exhausted,
}

pub type FsResult<T> = Result<T, FsError>;

impl fmt::Display for FsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            Self::InvalidInput => "invalid input",
            Self::NotFound => "not found",
            Self::Exhausted => "out of space",
        };
        f.write_str(message)
    }
}

impl std::error::Error for FsError {}
