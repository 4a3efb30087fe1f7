//! Slack `mrkdwn` helpers.

/// Wrap lines into a code block.
#[must_use]
pub fn code_block<S: AsRef<str>>(lines: &[S]) -> String {
    let body = lines
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join("\n");
    format!("```\n{body}\n```")
}

/// Wrap text into inline code.
#[must_use]
pub fn inline_code(text: &str) -> String {
    format!("`{text}`")
}

/// Mention a user by ID.
#[must_use]
pub fn user_link(user_id: &str) -> String {
    format!("<@{user_id}>")
}

/// Mention a user group by ID.
#[must_use]
pub fn group_link(group_id: &str) -> String {
    format!("<!subteam^{group_id}>")
}

/// Strip Slack's automatic `<mailto:a@b|a@b>` wrapping from an address.
#[must_use]
pub fn strip_mailto(text: &str) -> &str {
    text.strip_prefix("<mailto:")
        .and_then(|rest| rest.split(['|', '>']).next())
        .unwrap_or(text)
}
