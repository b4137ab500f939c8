use leaderboard_sdk::{Award, UserId};

use crate::config::OutputFormat;

/// Claim points for a user.
#[derive(Debug, clap::Args)]
pub struct Claim {
    /// ID of the user.
    user: UserId,
}

impl super::Command for Claim {
    fn is_client_required(&self) -> bool {
        true
    }

    async fn execute(&self, ctx: super::Context<'_>) -> eyre::Result<()> {
        let client = ctx.client()?;
        client.roster().refresh().await?;
        client.claims().select(&self.user)?;
        let Some(award) = client.claims().claim().await? else {
            eyre::bail!("no user selected");
        };
        let output = ctx.config().output();
        match output {
            OutputFormat::Table => println!("{}", award_message(&award)),
            OutputFormat::Json => println!(
                "{}",
                output.display_value_with_label(
                    "award",
                    serde_json::json!({
                        "user_id": award.user.id,
                        "user": award.user.name,
                        "points": award.points,
                    })
                )?
            ),
        }
        Ok(())
    }
}

pub(crate) fn award_message(award: &Award) -> String {
    format!("+{} points! ({})", award.points, award.user.name)
}
