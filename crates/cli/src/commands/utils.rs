use std::num::NonZeroUsize;

use leaderboard_sdk::{
    avatar::avatar_url, ranking::PODIUM_SIZE, ClaimRecord, Leaderboard, Paginator, User, UserId,
    Window,
};
use serde::Serialize;
use time::{format_description::BorrowedFormatItem, macros::format_description, UtcOffset};

use crate::config::{DisplayOptions, OutputFormat};

/// Shown when the ledger is empty.
pub const EMPTY_HISTORY: &str = "No claim history yet.";

/// Shown when the roster is empty.
pub const EMPTY_ROSTER: &str = "No users yet.";

const TIME_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

/// Create a paginator showing `page` of `len` items, clamped.
pub fn paginator_at(page_size: NonZeroUsize, len: usize, page: usize) -> Paginator {
    let mut paginator = Paginator::new(page_size);
    paginator.configure(len, page_size);
    paginator.go_to(page);
    paginator
}

/// Label of the current page.
pub fn page_label<T>(window: &Window<'_, T>) -> String {
    format!("Page {} of {}", window.current_page, window.total_pages)
}

fn with_page_label<T>(mut output: String, window: &Window<'_, T>, format: OutputFormat) -> String {
    if format == OutputFormat::Table && window.has_navigation() {
        if !output.ends_with('\n') {
            output.push('\n');
        }
        output.push_str(&page_label(window));
    }
    output
}

#[derive(Serialize)]
struct UserRow<'a> {
    selected: &'static str,
    id: &'a UserId,
    name: &'a str,
    points: u64,
    avatar: String,
}

/// Render the current page of the user list.
pub fn render_users<S>(
    leaderboard: &Leaderboard<S>,
    paginator: &mut Paginator,
    format: OutputFormat,
) -> eyre::Result<String> {
    let users = leaderboard.roster().snapshot();
    let selected = leaderboard.claims().selected().map(|user| user.id);
    let window = paginator.window(&users);
    let rows = window.items.iter().map(|user| UserRow {
        selected: if selected.as_ref() == Some(&user.id) {
            "*"
        } else {
            ""
        },
        id: &user.id,
        name: &user.name,
        points: user.points,
        avatar: avatar_url(user),
    });
    let output = format.display_many(
        rows,
        DisplayOptions::table_projection([
            ("selected", ""),
            ("id", "ID"),
            ("name", "Name"),
            ("points", "Points"),
            ("avatar", "Avatar"),
        ])
        .set_empty_message(EMPTY_ROSTER),
    )?;
    Ok(with_page_label(output, &window, format))
}

#[derive(Serialize)]
struct RankRow<'a> {
    rank: usize,
    name: Option<&'a str>,
    points: Option<u64>,
    avatar: Option<String>,
}

impl<'a> RankRow<'a> {
    fn new(rank: usize, user: Option<&'a User>) -> Self {
        Self {
            rank,
            name: user.map(|user| user.name.as_str()),
            points: user.map(|user| user.points),
            avatar: user.map(avatar_url),
        }
    }
}

/// Render the podium and the current page of the overflow ranking.
pub fn render_ranking<S>(
    leaderboard: &Leaderboard<S>,
    paginator: &mut Paginator,
    format: OutputFormat,
) -> eyre::Result<String> {
    let ranking = leaderboard.ranking();
    let window = paginator.window(&ranking.overflow);
    let podium = ranking
        .podium_slots()
        .map(|slot| RankRow::new(slot.place, slot.user))
        .collect::<Vec<_>>();
    let overflow = window
        .numbered(PODIUM_SIZE)
        .map(|(rank, user)| RankRow::new(rank, Some(user)))
        .collect::<Vec<_>>();

    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&serde_json::json!({
            "podium": podium,
            "overflow": overflow,
            "page": window.current_page,
            "total_pages": window.total_pages,
        }))?),
        OutputFormat::Table => {
            let projection = [("rank", "#"), ("name", "Name"), ("points", "Points")];
            let mut output = format.display_many(
                podium,
                DisplayOptions::table_projection(projection),
            )?;
            if !overflow.is_empty() {
                output.push('\n');
                output.push_str(
                    &format.display_many(overflow, DisplayOptions::table_projection(projection))?,
                );
            }
            Ok(with_page_label(output, &window, format))
        }
    }
}

#[derive(Serialize)]
struct HistoryRow<'a> {
    time: String,
    user: &'a str,
    user_id: &'a UserId,
    points: String,
}

/// Render the current page of the claim history, most recent first, with
/// times shown at `offset`.
pub fn render_history<S>(
    leaderboard: &Leaderboard<S>,
    paginator: &mut Paginator,
    format: OutputFormat,
    offset: UtcOffset,
) -> eyre::Result<String> {
    let history = leaderboard.history();
    let window = paginator.window(&history);
    let rows = window
        .items
        .iter()
        .map(|record| history_row(record, offset))
        .collect::<eyre::Result<Vec<_>>>()?;
    let output = format.display_many(
        rows,
        DisplayOptions::table_projection([
            ("time", "Time"),
            ("user", "User"),
            ("points", "Points"),
        ])
        .set_empty_message(EMPTY_HISTORY),
    )?;
    Ok(with_page_label(output, &window, format))
}

fn history_row(record: &ClaimRecord, offset: UtcOffset) -> eyre::Result<HistoryRow<'_>> {
    Ok(HistoryRow {
        time: record.timestamp.to_offset(offset).format(TIME_FORMAT)?,
        user: &record.user_name,
        user_id: &record.user_id,
        points: format!("+{}", record.points),
    })
}
