use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::models::VoteDirection;

pub const MAX_IDEA_LENGTH: usize = 140;

#[derive(Debug, Clone)]
pub struct Idea {
    pub id: Uuid,
    pub text: String,
    pub upvotes: u32,
    pub downvotes: u32,
    pub created_at: DateTime<Utc>,
    pub comparables: Vec<String>,
    /// Identity of the signed-in user who posted it. Sample ideas have none.
    pub author: Option<String>,
}

impl Idea {
    pub fn new(text: String, author: String, comparables: Vec<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            text,
            upvotes: 0,
            downvotes: 0,
            created_at: now,
            comparables,
            author: Some(author),
        }
    }

    pub fn is_own(&self, user: Option<&str>) -> bool {
        match (self.author.as_deref(), user) {
            (Some(author), Some(user)) => author == user,
            _ => false,
        }
    }
}

// Create idea request
#[derive(Debug, Validate, Deserialize)]
pub struct CreateIdeaRequest {
    #[validate(custom(function = "validate_idea_text"))]
    pub text: String,
}

/// Limits apply to the text as stored, i.e. after trimming.
fn validate_idea_text(text: &str) -> Result<(), ValidationError> {
    let text = text.trim();
    if text.is_empty() {
        let mut error = ValidationError::new("blank");
        error.message = Some("must not be empty".into());
        return Err(error);
    }
    if text.chars().count() > MAX_IDEA_LENGTH {
        let mut error = ValidationError::new("length");
        error.message = Some("must be at most 140 characters".into());
        return Err(error);
    }
    Ok(())
}

// Idea response with derived values
#[derive(Debug, Serialize, Deserialize)]
pub struct IdeaResponse {
    pub id: Uuid,
    pub text: String,
    pub upvotes: u32,
    pub downvotes: u32,
    pub score: i64,
    pub velocity: f64,
    pub is_trending: bool,
    pub created_at: DateTime<Utc>,
    pub comparables: Vec<String>,
    pub is_own: bool,
    pub user_vote: Option<VoteDirection>,
}

// Time window for the feed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeFilter {
    Today,
    Week,
    Month,
    #[default]
    All,
}

impl TimeFilter {
    pub const ALL: [TimeFilter; 4] = [
        TimeFilter::Today,
        TimeFilter::Week,
        TimeFilter::Month,
        TimeFilter::All,
    ];

    /// Window length, or `None` for the unbounded window.
    pub fn duration(self) -> Option<Duration> {
        match self {
            TimeFilter::Today => Some(Duration::days(1)),
            TimeFilter::Week => Some(Duration::days(7)),
            TimeFilter::Month => Some(Duration::days(30)),
            TimeFilter::All => None,
        }
    }

    pub fn cutoff(self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.duration().map(|window| now - window)
    }

    pub fn key(self) -> &'static str {
        match self {
            TimeFilter::Today => "today",
            TimeFilter::Week => "week",
            TimeFilter::Month => "month",
            TimeFilter::All => "all",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TimeFilter::Today => "Today",
            TimeFilter::Week => "This Week",
            TimeFilter::Month => "This Month",
            TimeFilter::All => "All Time",
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TimeFilterOption {
    pub key: &'static str,
    pub label: &'static str,
}
