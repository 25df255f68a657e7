//! Roster codec.
//!
//! The roster line is `*Committed:* None yet` when empty and
//! `*Committed:* <@U1> <@U2> (2)` otherwise. Reading is lenient: older
//! messages may lack the count, put the mentions on the following line, or
//! use `<@ID|name>` mentions. Writing always produces the current form.

use std::sync::LazyLock;

use regex::Regex;

use rollcall_types::ids::UserId;

use crate::deny_list::DenyList;

pub const ROSTER_LABEL: &str = "*Committed:*";
pub const EMPTY_SENTINEL: &str = "None yet";

static MENTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<@([^>|\s]+)(?:\|[^>]*)?>").expect("mention pattern is valid")
});

static COUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\(\d+\)$").expect("count pattern is valid"));

/// Ordered set of committed users.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    members: Vec<UserId>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, user: &UserId) -> bool {
        self.members.contains(user)
    }

    /// Appends `user`. Returns false if already present.
    pub fn insert(&mut self, user: UserId) -> bool {
        if self.contains(&user) {
            return false;
        }
        self.members.push(user);
        true
    }

    /// Returns false if `user` was not present.
    pub fn remove(&mut self, user: &UserId) -> bool {
        let before = self.members.len();
        self.members.retain(|m| m != user);
        self.members.len() != before
    }

    /// Drops every denied user. Returns how many were removed.
    pub fn retain_allowed(&mut self, deny_list: &DenyList) -> usize {
        let before = self.members.len();
        self.members.retain(|m| !deny_list.contains(m));
        before - self.members.len()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &UserId> {
        self.members.iter()
    }

    pub fn members(&self) -> &[UserId] {
        &self.members
    }

    /// Reads the roster out of a message's display text. A missing label
    /// means an empty roster.
    pub fn decode(text: &str) -> Self {
        let lines: Vec<&str> = text.split('\n').collect();
        let Some(segment) = find_segment(&lines) else {
            return Self::new();
        };

        std::iter::once(segment.tail)
            .chain(lines[segment.start + 1..segment.end].iter().copied())
            .flat_map(|line| MENTION.captures_iter(line))
            .map(|caps| UserId::new(&caps[1]))
            .collect()
    }

    /// Renders the roster line.
    pub fn encode(&self) -> String {
        if self.members.is_empty() {
            return format!("{ROSTER_LABEL} {EMPTY_SENTINEL}");
        }

        let mentions: Vec<String> = self.members.iter().map(UserId::mention).collect();
        format!("{ROSTER_LABEL} {} ({})", mentions.join(" "), self.members.len())
    }

    /// Replaces the roster segment of `text` with [`Roster::encode`], leaving
    /// every other line untouched. Text without a roster line gets one
    /// appended.
    pub fn rewrite(&self, text: &str) -> String {
        let encoded = self.encode();
        let lines: Vec<&str> = text.split('\n').collect();

        let Some(segment) = find_segment(&lines) else {
            if text.is_empty() {
                return encoded;
            }
            return format!("{text}\n{encoded}");
        };

        let mut out = String::with_capacity(text.len() + encoded.len());
        for line in &lines[..segment.start] {
            out.push_str(line);
            out.push('\n');
        }
        out.push_str(segment.prefix);
        out.push_str(&encoded);
        for line in &lines[segment.end..] {
            out.push('\n');
            out.push_str(line);
        }
        out
    }
}

impl FromIterator<UserId> for Roster {
    fn from_iter<I: IntoIterator<Item = UserId>>(iter: I) -> Self {
        let mut roster = Self::new();
        for user in iter {
            roster.insert(user);
        }
        roster
    }
}

/// Lines `start..end` hold the roster. `prefix` is whatever precedes the label
/// on the first line, `tail` whatever follows it.
struct Segment<'a> {
    start: usize,
    end: usize,
    prefix: &'a str,
    tail: &'a str,
}

fn find_segment<'a>(lines: &[&'a str]) -> Option<Segment<'a>> {
    let start = lines.iter().position(|l| l.contains(ROSTER_LABEL))?;
    let line = lines[start];
    let label_at = line.find(ROSTER_LABEL)?;

    let tail = &line[label_at + ROSTER_LABEL.len()..];

    // Only a bare label line can have the legacy mentions below it.
    let mut end = start + 1;
    if tail.trim().is_empty() {
        while end < lines.len() && is_continuation(lines[end]) {
            end += 1;
        }
    }

    Some(Segment {
        start,
        end,
        prefix: &line[..label_at],
        tail,
    })
}

/// A line written by the legacy encoding that put mentions below the label.
fn is_continuation(line: &str) -> bool {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return false;
    }
    if trimmed == EMPTY_SENTINEL {
        return true;
    }
    trimmed
        .split_whitespace()
        .all(|token| is_mention_token(token) || COUNT.is_match(token))
}

fn is_mention_token(token: &str) -> bool {
    MENTION
        .find(token)
        .is_some_and(|m| m.start() == 0 && m.end() == token.len())
}
