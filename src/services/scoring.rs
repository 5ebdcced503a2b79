//! Score, velocity and trending derivation.
//!
//! Everything here depends on `now`, so callers recompute on every query.

use chrono::{DateTime, Utc};

use crate::models::Idea;

/// Minimum velocity (score per hour) for an idea to be "on fire".
pub const FIRE_THRESHOLD: f64 = 3.0;

/// Ideas this old or older are never trending.
pub const TRENDING_MAX_AGE_HOURS: f64 = 48.0;

const SECONDS_PER_HOUR: f64 = 3600.0;

pub fn score(idea: &Idea) -> i64 {
    i64::from(idea.upvotes) - i64::from(idea.downvotes)
}

/// Age in hours, floored at one hour so brand-new ideas don't divide by ~0.
pub fn age_hours(idea: &Idea, now: DateTime<Utc>) -> f64 {
    let elapsed = (now - idea.created_at).num_milliseconds() as f64 / 1000.0;
    (elapsed / SECONDS_PER_HOUR).max(1.0)
}

pub fn velocity(idea: &Idea, now: DateTime<Utc>) -> f64 {
    score(idea) as f64 / age_hours(idea, now)
}

pub fn is_trending(idea: &Idea, now: DateTime<Utc>) -> bool {
    age_hours(idea, now) < TRENDING_MAX_AGE_HOURS && velocity(idea, now) >= FIRE_THRESHOLD
}
