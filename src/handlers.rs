use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::{bearer_token, validate_token, SessionStore};
use crate::config::DEFAULT_FEED_LIMIT;
use crate::core::errors::ApiError;
use crate::core::helpers::now;
use crate::models::models::{Post, Profile};
use crate::repository::Repository;

pub struct AppState {
    pub repo: Repository,
    pub sessions: SessionStore,
}

#[derive(Deserialize)]
pub struct RegisterBody {
    pub handle: String,
    pub password: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub photo: String,
}

#[derive(Deserialize)]
pub struct LoginBody {
    pub handle: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct PostBody {
    pub text: String,
}

#[derive(Deserialize)]
pub struct LimitQuery {
    pub limit: Option<usize>,
}

#[derive(Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub query: String,
}

fn build_profile_json(profile: &Profile) -> serde_json::Value {
    serde_json::json!({
        "handle": profile.handle,
        "display_name": profile.display_name,
        "email": profile.email,
        "bio": profile.bio,
        "photo": profile.photo_ref,
    })
}

fn build_posts_json(posts: &[Post]) -> serde_json::Value {
    let now = now();
    posts
        .iter()
        .map(|p| {
            serde_json::json!({
                "id": p.id,
                "author": p.author,
                "text": p.text,
                "created_at": p.created_at,
                "age": p.age(now),
            })
        })
        .collect()
}

fn require_user(req: &HttpRequest, state: &AppState) -> Result<String, ApiError> {
    validate_token(req, &state.sessions).ok_or(ApiError::Unauthorized)
}

pub async fn create_user(
    state: web::Data<AppState>,
    body: web::Json<RegisterBody>,
) -> Result<HttpResponse, ApiError> {
    let profile = state
        .repo
        .register(&body.handle, &body.email, &body.bio, &body.photo, &body.password)?;
    Ok(HttpResponse::Created().json(build_profile_json(&profile)))
}

pub async fn login_user(
    state: web::Data<AppState>,
    body: web::Json<LoginBody>,
) -> Result<HttpResponse, ApiError> {
    let token = state
        .sessions
        .login(&state.repo, &body.handle, &body.password)
        .ok_or(ApiError::Unauthorized)?;
    let profile = state.repo.get_profile(&body.handle)?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "token": token,
        "handle": profile.handle,
    })))
}

pub async fn logout_user(req: HttpRequest, state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let token = bearer_token(&req).ok_or(ApiError::Unauthorized)?;
    if !state.sessions.logout(token) {
        return Err(ApiError::Unauthorized);
    }
    Ok(HttpResponse::Ok().json(serde_json::json!({"message": "Logged out successfully"})))
}

pub async fn get_user(state: web::Data<AppState>, path: web::Path<String>) -> Result<HttpResponse, ApiError> {
    let profile = state.repo.get_profile(&path)?;
    Ok(HttpResponse::Ok().json(build_profile_json(&profile)))
}

pub async fn list_user_posts(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<LimitQuery>,
) -> HttpResponse {
    let posts = state.repo.posts_by_user(&path, query.limit);
    HttpResponse::Ok().json(build_posts_json(&posts))
}

pub async fn list_followers(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    HttpResponse::Ok().json(state.repo.get_followers(&path))
}

pub async fn list_following(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    HttpResponse::Ok().json(state.repo.get_following(&path))
}

pub async fn handle_follow(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let handle = require_user(&req, &state)?;
    let target = path.into_inner();
    if !state.repo.is_registered(&target) {
        return Err(ApiError::NotFound("Target user not found".to_string()));
    }
    let changed = state.repo.follow(&handle, &target);
    Ok(HttpResponse::Ok().json(serde_json::json!({"status": "followed", "changed": changed})))
}

pub async fn handle_unfollow(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let handle = require_user(&req, &state)?;
    let changed = state.repo.unfollow(&handle, &path);
    Ok(HttpResponse::Ok().json(serde_json::json!({"status": "unfollowed", "changed": changed})))
}

pub async fn create_post(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Json<PostBody>,
) -> Result<HttpResponse, ApiError> {
    let handle = require_user(&req, &state)?;
    let post = state.repo.create_post(&handle, &body.text)?;
    Ok(HttpResponse::Created().json(post))
}

pub async fn get_post(state: web::Data<AppState>, path: web::Path<String>) -> Result<HttpResponse, ApiError> {
    let id = Uuid::parse_str(&path).map_err(|_| ApiError::BadRequest("Invalid post ID".to_string()))?;
    let post = state.repo.get_post(&id)?;
    Ok(HttpResponse::Ok().json(post))
}

pub async fn get_feed(
    req: HttpRequest,
    state: web::Data<AppState>,
    query: web::Query<LimitQuery>,
) -> Result<HttpResponse, ApiError> {
    let handle = require_user(&req, &state)?;
    let limit = query.limit.unwrap_or(DEFAULT_FEED_LIMIT);
    let posts = state.repo.feed_for(&handle, Some(limit));
    Ok(HttpResponse::Ok().json(build_posts_json(&posts)))
}

pub async fn search_posts(state: web::Data<AppState>, query: web::Query<SearchQuery>) -> HttpResponse {
    let posts = state.repo.search_by_query(&query.query);
    HttpResponse::Ok().json(serde_json::json!({
        "query": query.query,
        "posts": build_posts_json(&posts),
    }))
}

pub async fn list_hashtags(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(state.repo.list_tags())
}

pub async fn search_hashtag(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    // `@mention` keys are kept as-is; a bare word is taken as a `#tag`.
    let tag = if path.starts_with('@') {
        path.into_inner()
    } else {
        format!("#{}", path.trim_start_matches('#'))
    };
    let posts = state.repo.search_by_tag(&tag);
    HttpResponse::Ok().json(serde_json::json!({
        "query": tag,
        "posts": build_posts_json(&posts),
    }))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/users", web::post().to(create_user))
        .route("/login", web::post().to(login_user))
        .route("/logout", web::post().to(logout_user))
        .route("/users/{handle}", web::get().to(get_user))
        .route("/users/{handle}/posts", web::get().to(list_user_posts))
        .route("/users/{handle}/followers", web::get().to(list_followers))
        .route("/users/{handle}/following", web::get().to(list_following))
        .route("/users/{handle}/follow", web::post().to(handle_follow))
        .route("/users/{handle}/unfollow", web::post().to(handle_unfollow))
        .route("/posts", web::post().to(create_post))
        .route("/posts/{id}", web::get().to(get_post))
        .route("/feed", web::get().to(get_feed))
        .route("/search", web::get().to(search_posts))
        .route("/hashtags", web::get().to(list_hashtags))
        .route("/hashtags/{tag}", web::get().to(search_hashtag));
}
