use chrono::{DateTime, Utc};

use crate::types::{Outcome, Rank};

pub fn outcome_label(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Pending => "Not drawn yet".to_string(),
        Outcome::RoundDeleted => "Round removed".to_string(),
        Outcome::Drawn { rank: Rank::None } => "No prize (0)".to_string(),
        Outcome::Drawn { rank } => format!("Rank {} winner", rank.value()),
    }
}

pub fn format_timestamp(timestamp: Option<DateTime<Utc>>) -> String {
    timestamp
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}
