use super::utils::{paginator_at, render_history};

/// Show the claim history, most recent first.
#[derive(Debug, clap::Args)]
pub struct History {
    /// Page to show.
    #[arg(long, short, default_value_t = 1)]
    page: usize,
}

impl super::Command for History {
    fn is_client_required(&self) -> bool {
        true
    }

    async fn execute(&self, ctx: super::Context<'_>) -> eyre::Result<()> {
        let client = ctx.client()?;
        client.ledger().refresh().await?;
        let mut paginator = paginator_at(
            ctx.config().page_size().history,
            client.ledger().snapshot().len(),
            self.page,
        );
        let output = render_history(
            client,
            &mut paginator,
            ctx.config().output(),
            ctx.local_offset(),
        )?;
        println!("{output}");
        Ok(())
    }
}
