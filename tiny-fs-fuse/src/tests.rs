use std::env;
use std::fs;
use std::io;

use tiny_fs::{OpenFlag, TinyFileSystem};

use crate::copy_to_host;

#[test]
fn copied_file_matches_source_bytes() {
    let fs = TinyFileSystem::new().unwrap();

    let fd = fs.open("/report", OpenFlag::CREATE).unwrap();
    let payload: Vec<u8> = (0..3000u32).map(|i| (i % 251) as u8).collect();
    assert_eq!(fs.write(fd, &payload).unwrap(), payload.len());
    fs.close(fd).unwrap();

    let dest = env::temp_dir().join("tiny-fs-copy-out.bin");
    copy_to_host(&fs, "/report", &dest).unwrap();
    let copied = fs::read(&dest).unwrap();
    fs::remove_file(&dest).ok();

    assert_eq!(copied, payload);
}

#[test]
fn missing_source_reports_not_found() {
    let fs = TinyFileSystem::new().unwrap();

    let dest = env::temp_dir().join("tiny-fs-copy-missing.bin");
    let err = copy_to_host(&fs, "/ghost", &dest).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::NotFound);
}
