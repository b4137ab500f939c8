use std::path::Path;

use add_user::AddUser;
use claim::Claim;
use enum_dispatch::enum_dispatch;
use eyre::OptionExt;
use history::History;
use init_config::InitConfig;
use leaderboard_sdk::{HttpService, Leaderboard};
use ranking::Ranking;
use shell::Shell;
use time::UtcOffset;
use users::Users;

use crate::config::Config;

mod add_user;
mod claim;
mod history;
mod init_config;
mod ranking;
mod shell;
mod users;

/// Utils for command implementations.
pub mod utils;

/// Commands.
#[enum_dispatch(Command)]
#[derive(Debug, clap::Subcommand)]
pub enum Commands {
    /// Initialize config file.
    InitConfig(InitConfig),
    /// List users.
    Users(Users),
    /// Show the podium and the rest of the ranking.
    Ranking(Ranking),
    /// Show the claim history, most recent first.
    History(History),
    /// Add a user.
    AddUser(AddUser),
    /// Claim points for a user.
    Claim(Claim),
    /// Interactive session.
    Shell(Shell),
}

#[enum_dispatch]
pub(crate) trait Command {
    fn is_client_required(&self) -> bool {
        false
    }

    async fn execute(&self, ctx: Context<'_>) -> eyre::Result<()>;
}

/// Leaderboard talking to the configured service.
pub(crate) type CommandClient = Leaderboard<HttpService>;

pub(crate) struct Context<'a> {
    config_path: &'a Path,
    config: &'a Config,
    client: Option<&'a CommandClient>,
    local_offset: UtcOffset,
}

impl<'a> Context<'a> {
    pub(super) fn new(
        config_path: &'a Path,
        config: &'a Config,
        client: Option<&'a CommandClient>,
        local_offset: UtcOffset,
    ) -> Self {
        Self {
            config_path,
            config,
            client,
            local_offset,
        }
    }

    pub(crate) fn config(&self) -> &Config {
        self.config
    }

    pub(crate) fn config_path(&self) -> &Path {
        self.config_path
    }

    /// Offset used to show timestamps, read before the runtime started.
    pub(crate) fn local_offset(&self) -> UtcOffset {
        self.local_offset
    }

    pub(crate) fn client(&self) -> eyre::Result<&CommandClient> {
        self.client.ok_or_eyre("client is not provided")
    }
}

/// Create a client for the configured service.
pub(crate) fn connect(config: &Config) -> eyre::Result<CommandClient> {
    let api_url = config.api_url()?;
    tracing::debug!(%api_url, "connecting");
    Ok(Leaderboard::connect(api_url.as_str(), &config.options())?)
}
