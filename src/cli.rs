use clap::Parser;
use std::path::PathBuf;

use crate::logging::LogConfig;
use crate::zip::ExtractOptions;

#[derive(Parser, Debug)]
#[command(name = "unbundle")]
#[command(version)]
#[command(about = "Unpack a bundled ZIP archive into a directory", long_about = None)]
#[command(after_help = "Examples:\n  \
  setup -d /opt/app                 install the payload appended to this binary\n  \
  unbundle payload.zip -d out       extract a local archive into out\n  \
  unbundle -l https://example.com/payload.zip   list a remote archive")]
pub struct Cli {
    /// ZIP file path or HTTP URL (default: payload appended to this executable)
    #[arg(value_name = "SOURCE")]
    pub source: Option<String>,

    /// Extract files into exdir
    #[arg(short = 'd', value_name = "DIR", default_value = ".")]
    pub extract_dir: PathBuf,

    /// List files (short format)
    #[arg(short = 'l')]
    pub list: bool,

    /// List verbosely
    #[arg(short = 'v')]
    pub verbose: bool,

    /// Quiet mode, no console log output
    #[arg(short = 'q')]
    pub quiet: bool,

    /// Append log output to this file
    #[arg(long = "log-file", value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Refuse entries whose path would escape the destination
    #[arg(long = "strict-paths")]
    pub strict_paths: bool,
}

impl Cli {
    pub fn is_list_mode(&self) -> bool {
        self.list || self.verbose
    }

    pub fn log_config(&self) -> LogConfig {
        LogConfig {
            destination_file: self.log_file.clone(),
            enable_console: !self.quiet,
        }
    }

    pub fn extract_options(&self) -> ExtractOptions {
        ExtractOptions {
            reject_unsafe_paths: self.strict_paths,
            ..ExtractOptions::default()
        }
    }
}
