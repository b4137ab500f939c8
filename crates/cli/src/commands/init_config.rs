use std::fs;

use eyre::Context as _;

use crate::config::Config;

/// Initialize config file.
#[derive(Debug, clap::Args)]
pub struct InitConfig {
    /// Overwrite an existing file.
    #[arg(long, short)]
    force: bool,
}

impl super::Command for InitConfig {
    async fn execute(&self, ctx: super::Context<'_>) -> eyre::Result<()> {
        let path = ctx.config_path();
        if path.exists() && !self.force {
            eyre::bail!(
                "config file `{}` already exists, use `--force` to overwrite",
                path.display()
            );
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .wrap_err_with(|| format!("failed to create `{}`", parent.display()))?;
        }
        fs::write(path, ctx.config().to_toml()?)
            .wrap_err_with(|| format!("failed to write `{}`", path.display()))?;
        tracing::info!(path = %path.display(), "config file written");
        Ok(())
    }
}
