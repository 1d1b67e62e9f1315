mod cli;

use std::error::Error;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::Path;

use clap::Parser;
use cli::Cli;
use enumflags2::BitFlags;
use tiny_fs::{FsResult, OpenFlag, TinyFileSystem, BLOCK_SIZE};
use tiny_fs_fuse::copy_to_host;

fn main() -> io::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let fs = TinyFileSystem::new().expect("file system setup failed");

    match cli.script {
        Some(path) => {
            for line in fs::read_to_string(&path)?.lines() {
                run_line(&fs, line);
            }
        }
        None => {
            print!("tfs> ");
            io::stdout().flush()?;
            for line in io::stdin().lock().lines() {
                let line = line?;
                if matches!(line.trim(), "quit" | "exit") {
                    break;
                }
                run_line(&fs, &line);
                print!("tfs> ");
                io::stdout().flush()?;
            }
        }
    }

    Ok(())
}

fn run_line(fs: &TinyFileSystem, line: &str) {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let outcome: Result<(), Box<dyn Error>> = match tokens.as_slice() {
        [] => Ok(()),
        [comment, ..] if comment.starts_with('#') => Ok(()),
        ["create", path] => fs
            .open(path, OpenFlag::CREATE)
            .and_then(|fd| fs.close(fd))
            .map_err(Into::into),
        ["write", path, text @ ..] => write_text(fs, path, &text.join(" ")).map_err(Into::into),
        ["cat", path] => cat(fs, path).map_err(Into::into),
        ["ls"] => ls(fs).map_err(Into::into),
        ["copyout", path, dest] => copy_to_host(fs, path, Path::new(dest)).map_err(Into::into),
        _ => Err("usage: create|write|cat|ls|copyout|quit".into()),
    };

    if let Err(err) = outcome {
        eprintln!("error: {err}");
    }
}

fn write_text(fs: &TinyFileSystem, path: &str, text: &str) -> FsResult<()> {
    let fd = fs.open(path, OpenFlag::CREATE | OpenFlag::APPEND)?;
    fs.write(fd, text.as_bytes())?;
    fs.close(fd)
}

fn cat(fs: &TinyFileSystem, path: &str) -> FsResult<()> {
    let fd = fs.open(path, BitFlags::empty())?;
    let mut buffer = [0u8; BLOCK_SIZE];
    loop {
        let count = fs.read(fd, &mut buffer)?;
        if count == 0 {
            break;
        }
        print!("{}", String::from_utf8_lossy(&buffer[..count]));
    }
    println!();
    fs.close(fd)
}

fn ls(fs: &TinyFileSystem) -> FsResult<()> {
    for name in fs.ls()? {
        println!("{name}");
    }
    Ok(())
}
