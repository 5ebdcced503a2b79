use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteDirection {
    Up,
    Down,
}

// Vote request
#[derive(Debug, Deserialize)]
pub struct VoteRequest {
    pub direction: VoteDirection,
}

// Vote response
#[derive(Debug, Serialize, Deserialize)]
pub struct VoteResponse {
    /// False when this session had already voted and nothing changed.
    pub recorded: bool,
    pub user_vote: Option<VoteDirection>,
    pub upvotes: u32,
    pub downvotes: u32,
    pub score: i64,
}
