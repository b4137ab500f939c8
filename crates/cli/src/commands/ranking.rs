use super::utils::{paginator_at, render_ranking};

/// Show the podium and the rest of the ranking.
#[derive(Debug, clap::Args)]
pub struct Ranking {
    /// Page of the ranking below the podium.
    #[arg(long, short, default_value_t = 1)]
    page: usize,
}

impl super::Command for Ranking {
    fn is_client_required(&self) -> bool {
        true
    }

    async fn execute(&self, ctx: super::Context<'_>) -> eyre::Result<()> {
        let client = ctx.client()?;
        client.roster().refresh().await?;
        let overflow = client.ranking().overflow.len();
        let mut paginator = paginator_at(ctx.config().page_size().ranking, overflow, self.page);
        let output = render_ranking(client, &mut paginator, ctx.config().output())?;
        println!("{output}");
        Ok(())
    }
}
