use std::collections::{HashMap, VecDeque};

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::{
    models::{Idea, IdeaResponse, MAX_IDEA_LENGTH, Session, TimeFilter, VoteDirection},
    services::scoring,
};

/// Result of a vote attempt. Only `Recorded` changes any state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteOutcome {
    Recorded,
    AlreadyVoted(VoteDirection),
    NotSignedIn,
    UnknownIdea,
}

/// The in-memory idea collection, newest first.
#[derive(Debug, Default)]
pub struct IdeaFeed {
    ideas: VecDeque<Idea>,
}

impl IdeaFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.ideas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ideas.is_empty()
    }

    pub fn get(&self, idea_id: Uuid) -> Option<&Idea> {
        self.ideas.iter().find(|idea| idea.id == idea_id)
    }

    /// Adds an idea to the front of the feed.
    ///
    /// Returns `None` without touching the feed when there is no signed-in
    /// author, or the trimmed text is empty or longer than 140 characters.
    pub fn submit(
        &mut self,
        text: &str,
        author: Option<&str>,
        comparables: Vec<String>,
        now: DateTime<Utc>,
    ) -> Option<&Idea> {
        let author = author?;
        let text = text.trim();
        if text.is_empty() || text.chars().count() > MAX_IDEA_LENGTH {
            return None;
        }

        let idea = Idea::new(text.to_string(), author.to_string(), comparables, now);
        tracing::debug!(idea_id = %idea.id, "idea submitted");
        self.ideas.push_front(idea);
        self.ideas.front()
    }

    /// Casts a vote for the session. No takebacks: once a session has voted
    /// on an idea every later attempt is a no-op.
    pub fn vote(
        &mut self,
        session: Option<&mut Session>,
        idea_id: Uuid,
        direction: VoteDirection,
    ) -> VoteOutcome {
        let Some(session) = session else {
            return VoteOutcome::NotSignedIn;
        };
        let Some(idea) = self.ideas.iter_mut().find(|idea| idea.id == idea_id) else {
            return VoteOutcome::UnknownIdea;
        };
        if let Some(previous) = session.votes.get(&idea_id) {
            return VoteOutcome::AlreadyVoted(*previous);
        }

        session.votes.insert(idea_id, direction);
        match direction {
            VoteDirection::Up => idea.upvotes = idea.upvotes.saturating_add(1),
            VoteDirection::Down => idea.downvotes = idea.downvotes.saturating_add(1),
        }

        VoteOutcome::Recorded
    }

    /// Ideas inside the time window, highest score first. The sort is stable,
    /// so equal scores keep feed order.
    pub fn feed(&self, filter: TimeFilter, now: DateTime<Utc>) -> Vec<&Idea> {
        let cutoff = filter.cutoff(now);
        let mut ideas: Vec<&Idea> = self
            .ideas
            .iter()
            .filter(|idea| cutoff.is_none_or(|cutoff| idea.created_at >= cutoff))
            .collect();

        ideas.sort_by_key(|idea| std::cmp::Reverse(scoring::score(idea)));
        ideas
    }

    /// The user's own ideas regardless of age, newest first.
    pub fn own_ideas(&self, user: &str) -> Vec<&Idea> {
        let mut ideas: Vec<&Idea> = self
            .ideas
            .iter()
            .filter(|idea| idea.is_own(Some(user)))
            .collect();

        ideas.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        ideas
    }

    pub fn seed_samples(&mut self, now: DateTime<Utc>) {
        let samples = [
            (
                "An app that tells you which friends are awake right now",
                24,
                3,
                2,
            ),
            (
                "A website that generates fake but realistic meeting excuses",
                18,
                7,
                5,
            ),
            (
                "Smart glasses that blur your ex if you see them in public",
                41,
                12,
                1,
            ),
        ];

        for (text, upvotes, downvotes, age_days) in samples {
            self.ideas.push_back(Idea {
                id: Uuid::new_v4(),
                text: text.to_string(),
                upvotes,
                downvotes,
                created_at: now - Duration::days(age_days),
                comparables: Vec::new(),
                author: None,
            });
        }

        tracing::info!("Seeded {} sample ideas", samples.len());
    }
}

pub fn idea_response(
    idea: &Idea,
    user: Option<&str>,
    votes: Option<&HashMap<Uuid, VoteDirection>>,
    now: DateTime<Utc>,
) -> IdeaResponse {
    IdeaResponse {
        id: idea.id,
        text: idea.text.clone(),
        upvotes: idea.upvotes,
        downvotes: idea.downvotes,
        score: scoring::score(idea),
        velocity: scoring::velocity(idea, now),
        is_trending: scoring::is_trending(idea, now),
        created_at: idea.created_at,
        comparables: idea.comparables.clone(),
        is_own: idea.is_own(user),
        user_vote: votes.and_then(|votes| votes.get(&idea.id).copied()),
    }
}

/// Slices one page out of an ordered list. Pages start at 1.
pub fn paginate<T>(items: Vec<T>, page: u32, limit: u32) -> Vec<T> {
    let offset = (page.saturating_sub(1) as usize).saturating_mul(limit as usize);
    items.into_iter().skip(offset).take(limit as usize).collect()
}
