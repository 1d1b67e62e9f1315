use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
pub struct Cli {
    /// Command script; reads stdin when omitted
    #[arg(long, short)]
    pub script: Option<PathBuf>,
}
