use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use crate::discover::{discover, DiscoverParams, FileSet, DEFAULT_INCLUDE_PATTERN};
use crate::runtime::Config;
use crate::utils::expand_and_resolve_path;

///////////////////////////////
/// Which files to pick up below the input root
#[derive(Args, Clone, Debug)]
pub struct DiscoverArgs {
    // Input root, walked recursively
    #[arg(short = 'i', long = "input", value_parser = clap::value_parser!(PathBuf))]
    pub path_in: PathBuf,

    /// Regex searched in each file name
    #[arg(long, default_value = DEFAULT_INCLUDE_PATTERN)]
    pub pattern: String,

    /// Second regex the file name must also match, e.g. '\.fq\.gz$'
    #[arg(long = "ext")]
    pub extension: Option<String>,

    /// Regex searched in the full path; matching files are skipped. Repeatable
    #[arg(long)]
    pub exclude: Vec<String>,

    /// Skip inputs whose stem already appears below this directory (comma separated, repeatable)
    #[arg(long = "exclude-dir")]
    pub exclude_dirs: Vec<String>,
}

impl DiscoverArgs {
    pub fn to_params(&self) -> Result<DiscoverParams> {
        let exclude_dirs = self
            .exclude_dirs
            .iter()
            .flat_map(|d| d.split(','))
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(|d| expand_and_resolve_path(d).map(|p| p.to_string_lossy().into_owned()))
            .collect::<Result<Vec<_>>>()?;
        Ok(DiscoverParams {
            root: expand_and_resolve_path(&self.path_in)?,
            include: self.pattern.clone(),
            extension: self.extension.clone(),
            exclude: self.exclude.clone(),
            exclude_dirs,
        })
    }

    pub fn try_discover(&self) -> Result<FileSet> {
        let params = self.to_params()?;
        discover(&params).with_context(|| format!("Could not collect input files from {:?}", self.path_in))
    }
}

#[derive(Args)]
pub struct DiscoverCMD {
    #[command(flatten)]
    pub discover: DiscoverArgs,
}

impl DiscoverCMD {
    pub fn try_execute(&mut self, _config: &Config) -> Result<()> {
        let files = self.discover.try_discover()?;
        for path in &files {
            println!("{}", path.display());
        }
        Ok(())
    }
}
