//! 宿主侧工具：把 tiny-fs 里的文件整份拷出到宿主文件系统。

#[cfg(test)]
mod tests;

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use enumflags2::BitFlags;
use log::debug;
use tiny_fs::{FsError, TinyFileSystem, BLOCK_SIZE};

/// 把 `source`（形如 `/name`）的内容写进宿主文件 `dest`，
/// 字节序列与从偏移 0 连续 `read` 到文件大小所得完全一致。
pub fn copy_to_host(fs: &TinyFileSystem, source: &str, dest: &Path) -> io::Result<()> {
    fs.lookup(source).map_err(into_io)?;

    let fd = fs.open(source, BitFlags::empty()).map_err(into_io)?;
    let mut host = File::create(dest)?;

    let mut buffer = [0u8; BLOCK_SIZE];
    let mut copied = 0usize;
    loop {
        let count = fs.read(fd, &mut buffer).map_err(into_io)?;
        if count == 0 {
            break;
        }
        host.write_all(&buffer[..count])?;
        copied += count;
    }

    fs.close(fd).map_err(into_io)?;
    host.flush()?;
    debug!("copied {copied} bytes from {source} to {}", dest.display());
    Ok(())
}

fn into_io(err: FsError) -> io::Error {
    let kind = match err {
        FsError::InvalidInput => io::ErrorKind::InvalidInput,
        FsError::NotFound => io::ErrorKind::NotFound,
        FsError::Exhausted => io::ErrorKind::StorageFull,
    };
    io::Error::new(kind, err)
}
