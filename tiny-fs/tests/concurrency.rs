use std::thread;

use enumflags2::BitFlags;
use tiny_fs::{OpenFlag, TinyFileSystem, BLOCK_SIZE, MAX_OPEN_FILES};

const N_THREADS: usize = 8;

// 同一文件上并发 open，发出的句柄必须两两不同
#[test]
fn racing_opens_yield_distinct_handles() {
    let fs = TinyFileSystem::new().unwrap();
    let fd = fs.open("/f1", OpenFlag::CREATE).unwrap();
    fs.close(fd).unwrap();

    let fs = &fs;
    let handles: Vec<_> = thread::scope(|scope| {
        let workers: Vec<_> = (0..N_THREADS)
            .map(|_| scope.spawn(move || fs.open("/f1", BitFlags::empty()).unwrap()))
            .collect();
        workers.into_iter().map(|w| w.join().unwrap()).collect()
    });

    for (i, a) in handles.iter().enumerate() {
        for b in &handles[i + 1..] {
            assert_ne!(a, b);
        }
    }
}

// 每条线程建各自的文件、写各自的内容，最后单线程逐个读回校验
#[test]
fn concurrent_distinct_files_round_trip() {
    let fs = TinyFileSystem::new().unwrap();

    {
        let fs = &fs;
        thread::scope(|scope| {
            for i in 0..N_THREADS {
                scope.spawn(move || {
                    let path = format!("/f{i}");
                    let payload = vec![b'a' + i as u8; 300 + i];
                    let fd = fs.open(&path, OpenFlag::CREATE).unwrap();
                    assert_eq!(fs.write(fd, &payload).unwrap(), payload.len());
                    fs.close(fd).unwrap();
                });
            }
        });
    }

    for i in 0..N_THREADS {
        let path = format!("/f{i}");
        let expected = vec![b'a' + i as u8; 300 + i];
        let fd = fs.open(&path, BitFlags::empty()).unwrap();
        let mut buffer = vec![0u8; 512];
        assert_eq!(fs.read(fd, &mut buffer).unwrap(), expected.len());
        assert_eq!(&buffer[..expected.len()], &expected[..]);
        fs.close(fd).unwrap();
    }
}

// 20 个句柄对同一个新文件并发写整块：最终大小是成功写入之和，
// 且每个块都是某一次写入的完整内容
#[test]
fn concurrent_block_writes_serialise() {
    let fs = TinyFileSystem::new().unwrap();

    let fds: Vec<_> = (0..MAX_OPEN_FILES)
        .map(|_| fs.open("/f5", OpenFlag::CREATE).unwrap())
        .collect();

    {
        let fs = &fs;
        thread::scope(|scope| {
            for (i, &fd) in fds.iter().enumerate() {
                scope.spawn(move || {
                    let payload = [b'A' + (i % 26) as u8; BLOCK_SIZE];
                    assert_eq!(fs.write(fd, &payload).unwrap(), BLOCK_SIZE);
                });
            }
        });
    }
    for fd in fds {
        fs.close(fd).unwrap();
    }

    let fd = fs.open("/f5", BitFlags::empty()).unwrap();
    let mut full = vec![0u8; MAX_OPEN_FILES * BLOCK_SIZE];
    assert_eq!(fs.read(fd, &mut full).unwrap(), full.len());
    for chunk in full.chunks(BLOCK_SIZE) {
        assert!(chunk.iter().all(|&b| b == chunk[0]));
        assert!(chunk[0].is_ascii_uppercase());
    }
    fs.close(fd).unwrap();
}

// 两个读者共享一个句柄：各自读到的字节数之和恰是文件大小
#[test]
fn shared_handle_readers_split_the_file() {
    const TOTAL: usize = 100_000;

    let fs = TinyFileSystem::new().unwrap();
    let fd = fs.open("/f6", OpenFlag::CREATE).unwrap();
    assert_eq!(fs.write(fd, &vec![b'V'; TOTAL]).unwrap(), TOTAL);
    fs.close(fd).unwrap();

    let fd = fs.open("/f6", BitFlags::empty()).unwrap();
    let fs = &fs;
    let counts: Vec<usize> = thread::scope(|scope| {
        let readers: Vec<_> = (0..2)
            .map(|_| {
                scope.spawn(move || {
                    let mut buffer = vec![0u8; TOTAL];
                    let count = fs.read(fd, &mut buffer).unwrap();
                    assert!(buffer[..count].iter().all(|&b| b == b'V'));
                    count
                })
            })
            .collect();
        readers.into_iter().map(|r| r.join().unwrap()).collect()
    });

    assert_eq!(counts.iter().sum::<usize>(), TOTAL);
    fs.close(fd).unwrap();
}

// 并发创建不同名字：inumber 与句柄都不冲突
#[test]
fn racing_creates_get_distinct_inodes() {
    let fs = TinyFileSystem::new().unwrap();

    let fs = &fs;
    let inumbers: Vec<_> = thread::scope(|scope| {
        let workers: Vec<_> = (0..N_THREADS)
            .map(|i| {
                scope.spawn(move || {
                    let path = format!("/c{i}");
                    let fd = fs.open(&path, OpenFlag::CREATE).unwrap();
                    fs.close(fd).unwrap();
                    fs.lookup(&path).unwrap()
                })
            })
            .collect();
        workers.into_iter().map(|w| w.join().unwrap()).collect()
    });

    for (i, a) in inumbers.iter().enumerate() {
        for b in &inumbers[i + 1..] {
            assert_ne!(a, b);
        }
    }
}
