use axum::{extract::State, http::StatusCode, response::Json};
use chrono::{Duration, Utc};
use serde_json::{Value, json};
use validator::Validate;

use crate::{
    AppState,
    auth::{AuthUser, Claims},
    error::{AppError, Result},
    models::{CurrentUserResponse, DEFAULT_USER_EMAIL, SignInRequest, SignInResponse},
};

pub async fn sign_in(
    State(state): State<AppState>,
    Json(mut payload): Json<SignInRequest>,
) -> Result<(StatusCode, Json<SignInResponse>)> {
    // A blank email means the default identity
    payload.email = payload
        .email
        .map(|email| email.trim().to_string())
        .filter(|email| !email.is_empty());
    payload.validate()?;

    let user = payload
        .email
        .as_deref()
        .unwrap_or(DEFAULT_USER_EMAIL)
        .to_lowercase();

    let now = Utc::now();
    let ttl = Duration::hours(state.config.session_ttl_hours);

    let mut sessions = state.sessions.write().await;
    let session = sessions.create(&user, ttl, now);
    let (session_id, expires_at) = (session.id, session.expires_at);

    let token = match Claims::new(&user, session_id, now, expires_at, &state.config.jwt_secret) {
        Ok((token, _)) => token,
        Err(e) => {
            sessions.remove(session_id);
            return Err(e);
        }
    };

    Ok((
        StatusCode::CREATED,
        Json(SignInResponse {
            token,
            user,
            expires_at,
        }),
    ))
}

pub async fn sign_out(State(state): State<AppState>, auth_user: AuthUser) -> Result<Json<Value>> {
    state
        .sessions
        .write()
        .await
        .remove(auth_user.session_id)
        .ok_or_else(|| AppError::Authentication("Session expired".to_string()))?;

    Ok(Json(json!({
        "message": "Signed out successfully"
    })))
}

pub async fn get_current_user(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<CurrentUserResponse>> {
    let sessions = state.sessions.read().await;
    let session = sessions
        .get(auth_user.session_id, Utc::now())
        .ok_or_else(|| AppError::Authentication("Session expired".to_string()))?;

    Ok(Json(CurrentUserResponse {
        user: session.user.clone(),
        session_id: session.id,
        votes_cast: session.votes.len(),
    }))
}
