/// Shown once a user is created.
pub(crate) const USER_ADDED: &str = "User has been added!";

/// Add a user.
#[derive(Debug, clap::Args)]
pub struct AddUser {
    /// Name of the user.
    name: String,
}

impl super::Command for AddUser {
    fn is_client_required(&self) -> bool {
        true
    }

    async fn execute(&self, ctx: super::Context<'_>) -> eyre::Result<()> {
        ctx.client()?.add_user(&self.name).await?;
        println!("{USER_ADDED}");
        Ok(())
    }
}
