//! Chat text helpers: mention encoding and the bot's canned replies.

use super::types::Lore;

/// Reply to the `help` command.
pub const USAGE: &str = "Usage: @lorebot <help | recent | user <username> | search <query>>";

/// Extracts the bare user identifier from a Slack mention token (`<@U123>` or `<@U123|alice>`).
///
/// Tokens that are not mentions are returned with at most one `<`, `>` and `@` removed.
pub fn parse_user_id(token: &str) -> String {
    let id = token.replacen('<', "", 1).replacen('>', "", 1).replacen('@', "", 1);

    match id.split_once('|') {
        Some((id, _label)) => id.to_string(),
        None => id,
    }
}

/// Encodes a user identifier as a Slack mention.
pub fn mention(user_id: &str) -> String {
    format!("<@{user_id}>")
}

/// Formats a single lore as `<@author>: content`.
pub fn format_lore(lore: &Lore) -> String {
    format!("{}: {}", mention(&lore.author), lore.content)
}

/// Formats a list of lore, one per line.
pub fn format_listing(lores: &[Lore]) -> String {
    lores.iter().map(format_lore).collect::<Vec<_>>().join("\n")
}

pub fn lore_added(lore: &Lore) -> String {
    format!("Lore added: {}", format_lore(lore))
}

pub fn lore_upvoted(lore: &Lore) -> String {
    format!("Lore upvoted: {}", format_lore(lore))
}

// Tests.
