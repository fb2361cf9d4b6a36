//! API Handlers
//!
//! Each proxy handler derives a cache key, serves it from its route cache,
//! and on a miss fetches upstream and populates the cache.

use axum::{
    extract::{Query, State},
    http::{header::COOKIE, HeaderMap},
    Json,
};
use serde_json::{json, Map, Value};
use tracing::warn;

use crate::api::AppState;
use crate::error::{ApiError, Result, UpstreamError};
use crate::models::{
    CacheStatsResponse, CovidQuery, DataResponse, GithubQuery, HealthResponse, NpmQuery,
    RedditQuery, StatsResponse, SteamQuery, TwitchQuery,
};
use crate::session::Claim;
use crate::upstream::endpoints;

type DataResult = Result<Json<DataResponse<Value>>>;

/// Logs an upstream failure before it is turned into a response.
fn log_failure(route: &str, key: &str, err: ApiError) -> ApiError {
    warn!(route, key, error = %err, "upstream fetch failed");
    err
}

/// Handler for GET /info/covid
///
/// Worldwide totals when `country` is omitted.
pub async fn covid_handler(
    State(state): State<AppState>,
    Query(query): Query<CovidQuery>,
) -> DataResult {
    let key = query.cache_key();
    let url = endpoints::covid(&key);

    let data = state
        .caches
        .covid
        .get_or_populate(&key, || async {
            Ok::<_, ApiError>(state.upstream.get_json(&url).await?)
        })
        .await
        .map_err(|err| log_failure("covid", &key, err))?;

    Ok(Json(DataResponse::new(data)))
}

/// Handler for GET /info/reddit
///
/// Caches the whole listing for `sub_type` and serves one post from it,
/// moving to the next post on each request.
pub async fn reddit_handler(
    State(state): State<AppState>,
    Query(query): Query<RedditQuery>,
) -> DataResult {
    let (sub, kind) = query.validate()?;
    let key = RedditQuery::cache_key(&sub, &kind);
    let url = endpoints::reddit(&sub, &kind);

    let listing = state
        .caches
        .reddit
        .get_or_populate(&key, || async {
            let body = state.upstream.get_json(&url).await?;
            let listing = body.get("data").cloned().ok_or_else(|| UpstreamError::Shape {
                url: url.clone(),
                reason: "listing has no data".to_string(),
            })?;
            if post_count(&listing) == 0 {
                return Err(ApiError::NotFound(
                    "Subreddit does not exist or doesn't have any posts yet.".to_string(),
                ));
            }
            Ok(listing)
        })
        .await
        .map_err(|err| log_failure("reddit", &key, err))?;

    let posts = listing["children"].as_array().map(Vec::as_slice).unwrap_or_default();
    let index = state.next_reddit_index(posts.len());
    let post = posts
        .get(index)
        .map(|child| child["data"].clone())
        .ok_or_else(|| ApiError::Internal("cached listing has no posts".to_string()))?;

    Ok(Json(DataResponse::new(post)))
}

fn post_count(listing: &Value) -> usize {
    listing["children"].as_array().map_or(0, Vec::len)
}

/// Handler for GET /info/npm
pub async fn npm_handler(
    State(state): State<AppState>,
    Query(query): Query<NpmQuery>,
) -> DataResult {
    let package = query.validate()?;
    let url = endpoints::npm(&package);

    let summary = state
        .caches
        .npm
        .get_or_populate(&package, || async {
            let document = state.upstream.get_json(&url).await?;
            Ok::<_, ApiError>(summarize_package(&document))
        })
        .await
        .map_err(|err| log_failure("npm", &package, err))?;

    Ok(Json(DataResponse::new(summary)))
}

/// Reduces a registry document to the fields the API exposes.
/// `version` lists published versions newest first.
pub fn summarize_package(document: &Value) -> Value {
    let versions: Vec<&String> = document["versions"]
        .as_object()
        .map(|versions| versions.keys().rev().collect())
        .unwrap_or_default();

    let mut summary = Map::new();
    summary.insert("version".to_string(), json!(versions));
    for field in [
        "description",
        "contributors",
        "homepage",
        "keywords",
        "repository",
        "bugs",
        "license",
    ] {
        summary.insert(field.to_string(), document[field].clone());
    }
    Value::Object(summary)
}

/// Handler for GET /socials/github
pub async fn github_handler(
    State(state): State<AppState>,
    Query(query): Query<GithubQuery>,
) -> DataResult {
    let repo = query.validate()?;
    let url = endpoints::github(&repo);

    let data = state
        .caches
        .github
        .get_or_populate(&repo, || async {
            Ok::<_, ApiError>(state.upstream.get_json(&url).await?)
        })
        .await
        .map_err(|err| log_failure("github", &repo, err))?;

    Ok(Json(DataResponse::new(data)))
}

/// First element of the array at `pointer`; `Shape` when there is no array.
fn first_at<'a>(
    body: &'a Value,
    pointer: &str,
    url: &str,
) -> std::result::Result<Option<&'a Value>, UpstreamError> {
    body.pointer(pointer)
        .and_then(Value::as_array)
        .map(|items| items.first())
        .ok_or_else(|| UpstreamError::Shape {
            url: url.to_string(),
            reason: format!("missing {pointer}"),
        })
}

/// Handler for GET /socials/steam
///
/// Resolves the vanity name, then caches the profile merged with its ban record.
pub async fn steam_handler(
    State(state): State<AppState>,
    Query(query): Query<SteamQuery>,
) -> DataResult {
    let username = query.validate()?;
    if state.steam_api_key.is_empty() {
        return Err(ApiError::Internal("Steam API key is not configured".to_string()));
    }

    let data = state
        .caches
        .steam
        .get_or_populate(&username, || fetch_steam_profile(&state, &username))
        .await
        .map_err(|err| log_failure("steam", &username, err))?;

    Ok(Json(DataResponse::new(data)))
}

async fn fetch_steam_profile(state: &AppState, username: &str) -> Result<Value> {
    let key = &*state.steam_api_key;
    let no_account = || ApiError::NotFound("No steam account with that name".to_string());

    let resolved = state
        .upstream
        .get_json(&endpoints::steam_resolve(key, username))
        .await?;
    let steam_id = resolved["response"]["steamid"]
        .as_str()
        .ok_or_else(no_account)?;

    let summaries_url = endpoints::steam_summaries(key, steam_id);
    let bans_url = endpoints::steam_bans(key, steam_id);
    let (summaries, bans) = tokio::try_join!(
        state.upstream.get_json(&summaries_url),
        state.upstream.get_json(&bans_url),
    )?;

    let player = first_at(&summaries, "/response/players", &summaries_url)?
        .ok_or_else(no_account)?;
    let record = first_at(&bans, "/players", &bans_url)?.cloned().unwrap_or_default();

    Ok(json!({
        "id": player["steamid"],
        "url": player["profileurl"],
        "realname": player["realname"],
        "avatar": player["avatarfull"],
        "createdAt": player["timecreated"],
        "CommunityBanned": record["CommunityBanned"],
        "VACBanned": record["VACBanned"],
        "NumberOfVACBans": record["NumberOfVACBans"],
        "DaysSinceLastBan": record["DaysSinceLastBan"],
        "NumberOfGameBans": record["NumberOfGameBans"],
    }))
}

/// Handler for GET /socials/twitch
///
/// Caches the user record with its live stream (or `null`) under `stream`.
pub async fn twitch_handler(
    State(state): State<AppState>,
    Query(query): Query<TwitchQuery>,
) -> DataResult {
    let login = query.validate()?;
    if !state.twitch.is_configured() {
        return Err(ApiError::Internal("Twitch credentials are not configured".to_string()));
    }

    let data = state
        .caches
        .twitch
        .get_or_populate(&login, || fetch_twitch_channel(&state, &login))
        .await
        .map_err(|err| log_failure("twitch", &login, err))?;

    Ok(Json(DataResponse::new(data)))
}

async fn fetch_twitch_channel(state: &AppState, login: &str) -> Result<Value> {
    let token = state.twitch.access_token(state.upstream.as_ref()).await?;
    let bearer = format!("Bearer {token}");
    let headers = [
        ("Client-ID", state.twitch.client_id()),
        ("Authorization", bearer.as_str()),
    ];

    let users_url = endpoints::twitch_user(login);
    let streams_url = endpoints::twitch_stream(login);
    let fetched = tokio::try_join!(
        state.upstream.get_json_with(&users_url, &headers),
        state.upstream.get_json_with(&streams_url, &headers),
    );
    if let Err(UpstreamError::Status { status: 401, .. }) = &fetched {
        state.twitch.invalidate().await;
    }
    let (users, streams) = fetched?;

    let mut channel = first_at(&users, "/data", &users_url)?
        .and_then(Value::as_object)
        .cloned()
        .ok_or_else(|| ApiError::NotFound("No twitch account with that name".to_string()))?;
    let stream = first_at(&streams, "/data", &streams_url)?.cloned();
    channel.insert("stream".to_string(), stream.unwrap_or(Value::Null));

    Ok(Value::Object(channel))
}

/// Handler for GET /info/validate
pub async fn validate_handler() -> Json<DataResponse<&'static str>> {
    Json(DataResponse::new("Correct API token"))
}

/// Handler for GET /session
///
/// Returns the caller's claim, or 401 when the request carries no valid session.
pub async fn session_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Claim>> {
    let cookie = headers.get(COOKIE).and_then(|value| value.to_str().ok());

    state
        .sessions
        .resolve(cookie)
        .await
        .map(Json)
        .ok_or(ApiError::Unauthorized)
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let caches = state
        .caches
        .stats()
        .await
        .into_iter()
        .map(|(name, ttl_secs, stats)| (name, CacheStatsResponse::new(&stats, ttl_secs)))
        .collect();

    Json(StatsResponse {
        caches,
        sessions_memoized: state.sessions.memo_len().await,
    })
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
