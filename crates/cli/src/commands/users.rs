use super::utils::{paginator_at, render_users};

/// List users.
#[derive(Debug, clap::Args)]
pub struct Users {
    /// Page to show.
    #[arg(long, short, default_value_t = 1)]
    page: usize,
}

impl super::Command for Users {
    fn is_client_required(&self) -> bool {
        true
    }

    async fn execute(&self, ctx: super::Context<'_>) -> eyre::Result<()> {
        let client = ctx.client()?;
        client.roster().refresh().await?;
        let mut paginator = paginator_at(
            ctx.config().page_size().users,
            client.roster().len(),
            self.page,
        );
        let output = render_users(client, &mut paginator, ctx.config().output())?;
        println!("{output}");
        Ok(())
    }
}
