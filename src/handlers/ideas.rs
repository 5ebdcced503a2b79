use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;
use validator::Validate;

use crate::{
    AppState,
    auth::{AuthUser, OptionalAuthUser},
    error::{AppError, Result},
    models::{
        CreateIdeaRequest, IdeaResponse, TimeFilter, TimeFilterOption, VoteRequest, VoteResponse,
    },
    services::{
        feed_service::{self, VoteOutcome},
        scoring,
    },
};

#[derive(Debug, Deserialize)]
pub struct GetIdeasQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub time: Option<TimeFilter>,
}

pub async fn create_idea(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(payload): Json<CreateIdeaRequest>,
) -> Result<(StatusCode, Json<IdeaResponse>)> {
    // Validate input
    payload.validate()?;

    // External lookup happens before any lock is taken
    let comparables = state.comparables.lookup_or_empty(payload.text.trim()).await;

    let now = Utc::now();
    let mut feed = state.feed.write().await;
    let idea = feed
        .submit(&payload.text, Some(auth_user.user.as_str()), comparables, now)
        .ok_or_else(|| AppError::Validation("text: must not be empty".to_string()))?;

    tracing::info!(idea_id = %idea.id, "Idea posted");

    let response = feed_service::idea_response(idea, Some(auth_user.user.as_str()), None, now);

    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn get_ideas(
    State(state): State<AppState>,
    Query(params): Query<GetIdeasQuery>,
    auth_user: OptionalAuthUser,
) -> Result<Json<Value>> {
    let page = params.page.unwrap_or(1).max(1);
    let limit = params.limit.unwrap_or(25).clamp(1, 100); // Max 100 per page
    let time_filter = params.time.unwrap_or_default();
    let now = Utc::now();

    let sessions = state.sessions.read().await;
    let session = auth_user
        .0
        .as_ref()
        .and_then(|user| sessions.get(user.session_id, now));
    let user = session.map(|session| session.user.as_str());
    let votes = session.map(|session| &session.votes);

    let feed = state.feed.read().await;
    let ideas = feed.feed(time_filter, now);
    let total_count = ideas.len() as u32;

    let ideas: Vec<IdeaResponse> = feed_service::paginate(ideas, page, limit)
        .into_iter()
        .map(|idea| feed_service::idea_response(idea, user, votes, now))
        .collect();

    Ok(Json(json!({
        "ideas": ideas,
        "time_filter": time_filter,
        "pagination": {
            "page": page,
            "limit": limit,
            "total": total_count,
            "pages": total_count.div_ceil(limit)
        }
    })))
}

pub async fn get_my_ideas(
    State(state): State<AppState>,
    Query(params): Query<GetIdeasQuery>,
    auth_user: AuthUser,
) -> Result<Json<Value>> {
    let page = params.page.unwrap_or(1).max(1);
    let limit = params.limit.unwrap_or(25).clamp(1, 100);
    let now = Utc::now();

    let sessions = state.sessions.read().await;
    let votes = sessions
        .get(auth_user.session_id, now)
        .map(|session| &session.votes);

    let feed = state.feed.read().await;
    let user = auth_user.user.as_str();
    let ideas = feed.own_ideas(user);
    let total_count = ideas.len() as u32;

    let ideas: Vec<IdeaResponse> = feed_service::paginate(ideas, page, limit)
        .into_iter()
        .map(|idea| feed_service::idea_response(idea, Some(user), votes, now))
        .collect();

    Ok(Json(json!({
        "ideas": ideas,
        "pagination": {
            "page": page,
            "limit": limit,
            "total": total_count,
            "pages": total_count.div_ceil(limit)
        }
    })))
}

pub async fn get_idea(
    State(state): State<AppState>,
    Path(idea_id): Path<Uuid>,
    auth_user: OptionalAuthUser,
) -> Result<Json<IdeaResponse>> {
    let now = Utc::now();

    let sessions = state.sessions.read().await;
    let session = auth_user
        .0
        .as_ref()
        .and_then(|user| sessions.get(user.session_id, now));

    let feed = state.feed.read().await;
    let idea = feed
        .get(idea_id)
        .ok_or_else(|| AppError::NotFound("Idea not found".to_string()))?;

    Ok(Json(feed_service::idea_response(
        idea,
        session.map(|session| session.user.as_str()),
        session.map(|session| &session.votes),
        now,
    )))
}

pub async fn vote_idea(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(idea_id): Path<Uuid>,
    Json(payload): Json<VoteRequest>,
) -> Result<Json<VoteResponse>> {
    // Session before feed, always in this order
    let mut sessions = state.sessions.write().await;
    let mut feed = state.feed.write().await;

    let session = sessions.get_mut(auth_user.session_id, Utc::now());
    let outcome = feed.vote(session, idea_id, payload.direction);

    let (recorded, user_vote) = match outcome {
        VoteOutcome::Recorded => (true, payload.direction),
        VoteOutcome::AlreadyVoted(previous) => (false, previous),
        VoteOutcome::NotSignedIn => {
            return Err(AppError::Authentication("Session expired".to_string()));
        }
        VoteOutcome::UnknownIdea => return Err(AppError::NotFound("Idea not found".to_string())),
    };

    let idea = feed
        .get(idea_id)
        .ok_or_else(|| AppError::NotFound("Idea not found".to_string()))?;

    if recorded {
        tracing::debug!(idea_id = %idea_id, direction = ?user_vote, "Vote recorded");
    }

    Ok(Json(VoteResponse {
        recorded,
        user_vote: Some(user_vote),
        upvotes: idea.upvotes,
        downvotes: idea.downvotes,
        score: scoring::score(idea),
    }))
}

pub async fn get_time_filters() -> Json<Value> {
    let filters: Vec<TimeFilterOption> = TimeFilter::ALL
        .into_iter()
        .map(|filter| TimeFilterOption {
            key: filter.key(),
            label: filter.label(),
        })
        .collect();

    Json(json!({
        "filters": filters,
        "default": TimeFilter::default()
    }))
}
