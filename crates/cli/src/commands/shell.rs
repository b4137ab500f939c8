use std::io::Write;

use leaderboard_sdk::{ClaimState, Leaderboard, LeaderboardService, Paginator, UserId};
use time::UtcOffset;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::config::{OutputFormat, PageSizes};

use super::{
    add_user::USER_ADDED,
    claim::award_message,
    utils::{render_history, render_ranking, render_users},
};

const HELP: &str = "\
users | ranking | history       show a view
next <view> | prev <view>       page through a view
select <id>                     select a user, again to deselect
deselect                        clear the selection
claim                           claim points for the selected user
add <name>                      add a user
refresh                         reload users and history
state                           show the claim state
help                            show this message
quit                            leave";

/// Interactive session.
#[derive(Debug, clap::Args)]
pub struct Shell {}

impl super::Command for Shell {
    fn is_client_required(&self) -> bool {
        true
    }

    async fn execute(&self, ctx: super::Context<'_>) -> eyre::Result<()> {
        let client = ctx.client()?;
        let mut session = Session::new(client, ctx.config().output(), ctx.config().page_size())
            .with_local_offset(ctx.local_offset());
        if let Err(err) = client.load().await {
            eprintln!("error: {err}");
        }

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            print!("{} ", session.prompt());
            std::io::stdout().flush()?;
            let Some(line) = lines.next_line().await? else {
                break;
            };
            match session.handle(&line).await {
                Ok(Reply::Quit) => break,
                Ok(Reply::Text(text)) => {
                    if !text.is_empty() {
                        println!("{text}");
                    }
                }
                Err(err) => eprintln!("error: {err}"),
            }
        }
        Ok(())
    }
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Reply {
    Text(String),
    Quit,
}

#[derive(Debug, Clone, Copy)]
enum View {
    Users,
    Ranking,
    History,
}

impl View {
    fn parse(name: &str) -> eyre::Result<Self> {
        match name {
            "users" => Ok(Self::Users),
            "ranking" => Ok(Self::Ranking),
            "history" => Ok(Self::History),
            other => eyre::bail!("unknown view `{other}`"),
        }
    }
}

pub(crate) struct Session<'a, S> {
    leaderboard: &'a Leaderboard<S>,
    output: OutputFormat,
    users: Paginator,
    ranking: Paginator,
    history: Paginator,
    local_offset: UtcOffset,
}

impl<'a, S: LeaderboardService> Session<'a, S> {
    pub(crate) fn new(
        leaderboard: &'a Leaderboard<S>,
        output: OutputFormat,
        page_size: PageSizes,
    ) -> Self {
        Self {
            leaderboard,
            output,
            users: Paginator::new(page_size.users),
            ranking: Paginator::new(page_size.ranking),
            history: Paginator::new(page_size.history),
            local_offset: UtcOffset::UTC,
        }
    }

    pub(crate) fn with_local_offset(mut self, offset: UtcOffset) -> Self {
        self.local_offset = offset;
        self
    }

    pub(crate) fn prompt(&self) -> String {
        match self.leaderboard.claims().state() {
            ClaimState::Idle => "[idle]>".to_string(),
            ClaimState::Selected(user) => format!("[selected: {}]>", user.name),
            ClaimState::Claiming(user) => format!("[claiming: {}]>", user.name),
            ClaimState::Awarded { points, user } => format!("[+{points} points! {}]>", user.name),
        }
    }

    pub(crate) async fn handle(&mut self, line: &str) -> eyre::Result<Reply> {
        let line = line.trim();
        let (command, arg) = match line.split_once(char::is_whitespace) {
            Some((command, arg)) => (command, arg.trim()),
            None => (line, ""),
        };
        let text = match command {
            "" => String::new(),
            "help" => HELP.to_string(),
            "quit" | "exit" => return Ok(Reply::Quit),
            "users" | "ranking" | "history" => self.render(View::parse(command)?)?,
            "next" | "prev" => {
                let view = View::parse(arg)?;
                let len = self.len(view);
                let paginator = self.paginator(view);
                paginator.configure(len, paginator.page_size());
                if command == "next" {
                    paginator.next();
                } else {
                    paginator.previous();
                }
                self.render(view)?
            }
            "select" => {
                if arg.is_empty() {
                    eyre::bail!("usage: select <id>");
                }
                match self.leaderboard.claims().select(&UserId::from(arg))? {
                    Some(user) => format!("Selected {}.", user.name),
                    None => "Selection cleared.".to_string(),
                }
            }
            "deselect" => {
                self.leaderboard.claims().deselect();
                "Selection cleared.".to_string()
            }
            "claim" => match self.leaderboard.claims().claim().await? {
                Some(award) => {
                    self.reset_pages();
                    award_message(&award)
                }
                None => "Select a user first.".to_string(),
            },
            "add" => {
                self.leaderboard.add_user(arg).await?;
                self.users.reset();
                self.ranking.reset();
                USER_ADDED.to_string()
            }
            "refresh" => {
                self.leaderboard.load().await?;
                String::new()
            }
            "state" => format!("{:?}", self.leaderboard.claims().state()),
            other => eyre::bail!("unknown command `{other}`, try `help`"),
        };
        Ok(Reply::Text(text))
    }

    fn len(&self, view: View) -> usize {
        match view {
            View::Users => self.leaderboard.roster().len(),
            View::Ranking => self.leaderboard.ranking().overflow.len(),
            View::History => self.leaderboard.ledger().snapshot().len(),
        }
    }

    fn paginator(&mut self, view: View) -> &mut Paginator {
        match view {
            View::Users => &mut self.users,
            View::Ranking => &mut self.ranking,
            View::History => &mut self.history,
        }
    }

    fn render(&mut self, view: View) -> eyre::Result<String> {
        let leaderboard = self.leaderboard;
        let output = self.output;
        match view {
            View::Users => render_users(leaderboard, &mut self.users, output),
            View::Ranking => render_ranking(leaderboard, &mut self.ranking, output),
            View::History => {
                render_history(leaderboard, &mut self.history, output, self.local_offset)
            }
        }
    }

    fn reset_pages(&mut self) {
        self.users.reset();
        self.ranking.reset();
        self.history.reset();
    }
}
