use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use mirror_engine::SourceMode;

/// Mirror a catalog of articles into a static-site content tree.
#[derive(Debug, Parser)]
#[command(name = "article-mirror", version, about)]
pub struct Cli {
    /// RON configuration file; defaults apply when it does not exist.
    #[arg(long, default_value = "mirror.ron")]
    pub config: PathBuf,

    /// RON catalog listing the articles to mirror, in order.
    #[arg(long)]
    pub catalog: PathBuf,

    /// Output root; overrides `output_dir` from the config.
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Source mode; overrides `source_mode` from the config.
    #[arg(long, value_enum)]
    pub mode: Option<ModeArg>,

    #[arg(long, value_enum, default_value_t = LogArg::Terminal)]
    pub log: LogArg,

    /// Log at debug level.
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    Api,
    Page,
}

impl From<ModeArg> for SourceMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Api => SourceMode::Api,
            ModeArg::Page => SourceMode::Page,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogArg {
    Terminal,
    File,
    Both,
}
