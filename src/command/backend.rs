use anyhow::Result;
use clap::Args;

use crate::runtime::Config;

#[derive(Args)]
pub struct BackendCMD {}

impl BackendCMD {
    pub fn try_execute(&mut self, config: &Config) -> Result<()> {
        let backend = config.backend()?;
        println!("{}", backend);
        Ok(())
    }
}
