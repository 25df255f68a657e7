use serde_json::json;

use rollcall_roster::Roster;
use rollcall_types::models::{CalendarLinks, Workout};
use rollcall_types::slack::{Block, Button, COMMIT_ACTION_ID, COMMITS_BLOCK_ID};

pub const HEADER_TEXT: &str = "*Tomorrow's Schedule:*";

/// Blocks of one Event Message. Closed workouts get no roster or button.
pub fn workout_card(workout: &Workout) -> Vec<Block> {
    if workout.is_closed {
        return vec![Block::section(format!("{} [❌] - CLOSED", workout.ao))];
    }

    let mut headline = format!("*{}*: {} ", workout.start, workout.ao);
    if !workout.types.is_empty() {
        headline.push_str(&format!("[{}] ", workout.types));
    }
    headline.push_str(&format!("- {}", workout.q));
    if let Some(location) = workout.location.as_deref().filter(|l| !l.is_empty()) {
        headline.push_str(&format!(" - {location}"));
    }

    let details = json!({
        "ao": workout.ao,
        "time": workout.start,
        "q": workout.q,
        "location": workout.location,
        "types": workout.types,
    });

    let button = Button::new("HC", COMMIT_ACTION_ID)
        .with_style("primary")
        .with_value(details.to_string());

    vec![
        Block::section(format!("{headline}\n{}", Roster::new().encode()))
            .with_block_id(COMMITS_BLOCK_ID)
            .with_accessory(button),
    ]
}

/// Plain-text fallback shown in notifications.
pub fn workout_text(workout: &Workout) -> String {
    format!("{}: {} - {}", workout.start, workout.ao, workout.q)
}

pub fn header_blocks() -> Vec<Block> {
    vec![Block::section(HEADER_TEXT)]
}

/// Footer linking the calendar feeds, or `None` when no link is configured.
pub fn footer_blocks(links: &CalendarLinks) -> Option<Vec<Block>> {
    let mut parts = Vec::new();
    if let Some(google) = &links.google {
        parts.push(format!("<{google}|Google>"));
    }
    if let Some(ical) = &links.ical {
        parts.push(format!("<{ical}|iCal>"));
    }
    if parts.is_empty() {
        return None;
    }

    Some(vec![Block::context(format!(
        "Subscribe to the calendar: {}",
        parts.join(" | ")
    ))])
}
