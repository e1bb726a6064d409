use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use pagetoc::config::TocConfigFile;

/// Main CLI parser structure
#[derive(Parser, Debug)]
#[command(name = "pagetoc")]
#[command(about = "Generate a table of contents list for rendered HTML documents", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file, may be repeated (defaults to _toc.yml, _toc.yaml, _toc.toml, _toc.json)
    #[arg(short, long, value_name = "CONFIG_FILE", global = true)]
    pub config: Option<Vec<PathBuf>>,

    /// Show the full backtrace when an error occurs
    #[arg(short, long, default_value_t = false, global = true)]
    pub trace: bool,

    /// Enable verbose debugging
    #[arg(short = 'g', long, default_value_t = false, global = true)]
    pub debug: bool,

    /// Only print errors
    #[arg(short, long, default_value_t = false, global = true)]
    pub quiet: bool,
}

/// Settings that override the configuration files
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct TocOverrides {
    /// Selector of the element the list is appended to
    #[arg(long, value_name = "SELECTOR")]
    pub toc_element: Option<String>,

    /// Heading selector; repeat once per level, first is level 1
    #[arg(long = "title-element", value_name = "SELECTOR")]
    pub title_elements: Vec<String>,

    /// id of the generated list
    #[arg(long, value_name = "ID")]
    pub list_id: Option<String>,

    /// Replace a previously generated list instead of adding another one
    #[arg(long, default_value_t = false)]
    pub replace: bool,
}

impl TocOverrides {
    pub fn to_config_file(&self) -> TocConfigFile {
        TocConfigFile {
            toc_element: self.toc_element.clone(),
            title_elements: if self.title_elements.is_empty() {
                None
            } else {
                Some(self.title_elements.clone())
            },
            list_id: self.list_id.clone(),
            replace_existing: if self.replace { Some(true) } else { None },
        }
    }
}

/// Output format of the outline command
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutlineFormat {
    Text,
    Json,
}

/// Subcommands for the CLI
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Insert the table of contents into an HTML file or every HTML file of a directory
    #[command(alias = "b")]
    Build {
        /// HTML file or directory
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Output file (defaults to stdout) or output directory (required for a directory input)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,

        #[command(flatten)]
        toc: TocOverrides,
    },

    /// Print the entries that would be generated for an HTML file
    #[command(alias = "o")]
    Outline {
        /// HTML file
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutlineFormat::Text)]
        format: OutlineFormat,

        #[command(flatten)]
        toc: TocOverrides,
    },

    /// Load and validate the configuration, then print it
    CheckConfig {
        #[command(flatten)]
        toc: TocOverrides,
    },
}
