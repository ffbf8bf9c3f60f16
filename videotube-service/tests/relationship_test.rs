//! Scenario tests for the relationship engine against a real database.
//! They run only when TEST_DATABASE_URL is set and are skipped otherwise.

use std::sync::Arc;

use actix_web::{test, web, App};
use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use videotube_service::app_state::AppState;
use videotube_service::config::{
    AppConfig, AuthConfig, Config, DatabaseConfig, PolicyConfig, StorageConfig,
};
use videotube_service::db::{comment_repo, like_repo, playlist_repo, subscription_repo, tweet_repo, video_repo};
use videotube_service::domain::models::{CommentTarget, LikeTarget};
use videotube_service::error::{ApiError, Result as ApiResult};
use videotube_service::pagination::PageQuery;
use videotube_service::routes::configure_routes;
use videotube_service::security::jwt;
use videotube_service::services::storage::{AssetKind, AssetStorage, StoredAsset};
use videotube_service::services::toggle;

const TEST_SECRET: &str = "relationship-test-secret";

struct NullStorage;

#[async_trait]
impl AssetStorage for NullStorage {
    async fn upload(&self, _local_path: &str, _kind: AssetKind) -> ApiResult<StoredAsset> {
        Ok(StoredAsset {
            url: "https://assets.test/videos/fixture.mp4".into(),
            duration: 1.0,
        })
    }

    async fn delete(&self, _asset_id: &str, _kind: AssetKind) -> ApiResult<()> {
        Ok(())
    }
}

fn service_config() -> Config {
    Config {
        app: AppConfig {
            env: "test".into(),
            host: "127.0.0.1".into(),
            http_port: 0,
        },
        database: DatabaseConfig {
            url: "postgres://unused".into(),
            max_connections: 5,
            min_connections: 1,
        },
        auth: AuthConfig {
            jwt_secret: TEST_SECRET.into(),
            token_ttl_seconds: 3600,
        },
        storage: StorageConfig {
            bucket: "test".into(),
            region: "us-east-1".into(),
            endpoint: None,
            access_key_id: String::new(),
            secret_access_key: String::new(),
            public_base_url: "https://assets.test".into(),
        },
        policy: PolicyConfig {
            allow_self_subscribe: false,
            playlist_remove_checks_video_owner: true,
        },
    }
}

fn bearer(user_id: Uuid) -> String {
    let token = jwt::sign_token(user_id, TEST_SECRET, 3600).expect("sign token");
    format!("Bearer {token}")
}

async fn test_pool() -> Option<PgPool> {
    let url = std::env::var("TEST_DATABASE_URL").ok()?;
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&url)
        .await
        .expect("connect to TEST_DATABASE_URL");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("run migrations");
    Some(pool)
}

macro_rules! require_pool {
    () => {
        match test_pool().await {
            Some(pool) => pool,
            None => {
                eprintln!("skipping: TEST_DATABASE_URL not set");
                return;
            }
        }
    };
}

async fn create_user(pool: &PgPool) -> Uuid {
    let tag = Uuid::new_v4().simple().to_string();
    sqlx::query_scalar::<_, Uuid>(
        r#"
        INSERT INTO users (username, email, full_name)
        VALUES ($1, $2, 'Test User')
        RETURNING id
        "#,
    )
    .bind(format!("user_{tag}"))
    .bind(format!("{tag}@test.local"))
    .fetch_one(pool)
    .await
    .expect("create user")
}

async fn create_video(pool: &PgPool, owner_id: Uuid, title: &str, views: i64) -> Uuid {
    let video = video_repo::create_video(
        pool,
        owner_id,
        title,
        "a test video",
        "https://assets.test/videos/v.mp4",
        "https://assets.test/images/t.png",
        12.5,
    )
    .await
    .expect("create video");
    sqlx::query("UPDATE videos SET views = $2 WHERE id = $1")
        .bind(video.id)
        .bind(views)
        .execute(pool)
        .await
        .expect("seed views");
    video.id
}

fn policy() -> PolicyConfig {
    PolicyConfig {
        allow_self_subscribe: false,
        playlist_remove_checks_video_owner: true,
    }
}

#[tokio::test]
async fn like_toggle_twice_is_a_noop() {
    let pool = require_pool!();
    let owner = create_user(&pool).await;
    let liker = create_user(&pool).await;
    let video_id = create_video(&pool, owner, "toggle test", 0).await;
    let target = LikeTarget::Video(video_id);

    let first = toggle::toggle_like(&pool, liker, target).await.unwrap();
    assert!(first.active);
    assert_eq!(like_repo::count_for(&pool, target).await.unwrap(), 1);

    let second = toggle::toggle_like(&pool, liker, target).await.unwrap();
    assert!(!second.active);
    assert_eq!(like_repo::count_for(&pool, target).await.unwrap(), 0);
}

#[tokio::test]
async fn duplicate_like_insert_loses_to_the_existing_edge() {
    let pool = require_pool!();
    let owner = create_user(&pool).await;
    let liker = create_user(&pool).await;
    let video_id = create_video(&pool, owner, "dup insert", 0).await;
    let target = LikeTarget::Video(video_id);

    assert!(like_repo::insert_if_absent(&pool, liker, target)
        .await
        .unwrap()
        .is_some());
    assert!(like_repo::insert_if_absent(&pool, liker, target)
        .await
        .unwrap()
        .is_none());
    assert_eq!(like_repo::count_for(&pool, target).await.unwrap(), 1);
}

#[tokio::test]
async fn like_count_in_detail_matches_edge_count() {
    let pool = require_pool!();
    let owner = create_user(&pool).await;
    let video_id = create_video(&pool, owner, "counted", 0).await;

    let mut likers = Vec::new();
    for _ in 0..3 {
        let liker = create_user(&pool).await;
        toggle::toggle_like(&pool, liker, LikeTarget::Video(video_id))
            .await
            .unwrap();
        likers.push(liker);
    }

    let detail = video_repo::detail(&pool, video_id, Some(likers[0]))
        .await
        .unwrap()
        .expect("video exists");
    assert_eq!(detail.like_count, 3);
    assert!(detail.is_liked);

    let anonymous = video_repo::detail(&pool, video_id, None)
        .await
        .unwrap()
        .expect("video exists");
    assert!(!anonymous.is_liked);
}

#[tokio::test]
async fn liking_a_missing_video_is_not_found() {
    let pool = require_pool!();
    let liker = create_user(&pool).await;

    let err = toggle::toggle_like(&pool, liker, LikeTarget::Video(Uuid::new_v4()))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}

#[tokio::test]
async fn subscription_toggle_and_subscriber_list() {
    let pool = require_pool!();
    let channel = create_user(&pool).await;
    let fan = create_user(&pool).await;

    let on = toggle::toggle_subscription(&pool, &policy(), fan, channel)
        .await
        .unwrap();
    assert!(on.active);
    assert!(subscription_repo::is_subscribed(&pool, fan, channel)
        .await
        .unwrap());

    let params = PageQuery::default().normalize();
    let (subscribers, subs_count) = subscription_repo::subscribers(&pool, channel, &params)
        .await
        .unwrap();
    assert_eq!(subscribers.len(), 1);
    assert_eq!(subscribers[0].id, fan);
    assert_eq!(subs_count, 1);

    let (channels, _) = subscription_repo::subscribed_channels(&pool, fan, fan, &params)
        .await
        .unwrap();
    assert_eq!(channels.len(), 1);
    assert_eq!(channels[0].id, channel);
    assert_eq!(channels[0].total_subs, 1);
    assert!(channels[0].is_subscribed);

    let off = toggle::toggle_subscription(&pool, &policy(), fan, channel)
        .await
        .unwrap();
    assert!(!off.active);
    assert_eq!(
        subscription_repo::subscriber_count(&pool, channel)
            .await
            .unwrap(),
        0
    );
}

#[tokio::test]
async fn playlist_totals_follow_membership_and_video_deletion() {
    let pool = require_pool!();
    let owner = create_user(&pool).await;
    let v1 = create_video(&pool, owner, "pl one", 100).await;
    let v2 = create_video(&pool, owner, "pl two", 50).await;

    let playlist = playlist_repo::create_playlist(&pool, owner, "favorites", "")
        .await
        .unwrap();

    assert!(playlist_repo::add_video(&pool, playlist.id, v1).await.unwrap());
    assert!(playlist_repo::add_video(&pool, playlist.id, v2).await.unwrap());
    // re-add is a no-op
    assert!(!playlist_repo::add_video(&pool, playlist.id, v1).await.unwrap());

    let params = PageQuery::default().normalize();
    let (listed, listed_total) = playlist_repo::user_playlists(&pool, owner, &params)
        .await
        .unwrap();
    assert_eq!(listed_total, 1);
    assert_eq!(listed[0].id, playlist.id);

    let summary = playlist_repo::summary(&pool, playlist.id)
        .await
        .unwrap()
        .expect("playlist exists");
    assert_eq!(summary.total_videos, 2);
    assert_eq!(summary.total_views, 150);
    assert!((summary.total_duration - 25.0).abs() < f64::EPSILON);

    // a deleted video leaves a dangling membership that no longer counts
    video_repo::delete_video(&pool, v2).await.unwrap();
    let after = playlist_repo::summary(&pool, playlist.id)
        .await
        .unwrap()
        .expect("playlist exists");
    assert_eq!(after.total_videos, 1);
    assert_eq!(after.total_views, 100);

    // removing the last member restores empty totals
    assert!(playlist_repo::remove_video(&pool, playlist.id, v1)
        .await
        .unwrap());
    let empty = playlist_repo::summary(&pool, playlist.id)
        .await
        .unwrap()
        .expect("playlist exists");
    assert_eq!(empty.total_videos, 0);
    assert_eq!(empty.total_views, 0);
    assert_eq!(empty.total_duration, 0.0);
}

#[tokio::test]
async fn tweet_detail_carries_interaction_counts() {
    let pool = require_pool!();
    let author = create_user(&pool).await;
    let fan = create_user(&pool).await;
    let tweet = tweet_repo::create_tweet(&pool, author, "first post")
        .await
        .unwrap();

    toggle::toggle_like(&pool, fan, LikeTarget::Tweet(tweet.id))
        .await
        .unwrap();
    comment_repo::create_comment(&pool, fan, CommentTarget::Tweet(tweet.id), "nice one")
        .await
        .unwrap();

    let view = tweet_repo::detail(&pool, tweet.id, Some(fan))
        .await
        .unwrap()
        .expect("tweet exists");
    assert_eq!(view.like_count, 1);
    assert_eq!(view.comment_count, 1);
    assert!(view.is_liked);
    assert_eq!(view.owner.id, author);

    let anonymous = tweet_repo::detail(&pool, tweet.id, None)
        .await
        .unwrap()
        .expect("tweet exists");
    assert!(!anonymous.is_liked);

    assert!(tweet_repo::detail(&pool, Uuid::new_v4(), None)
        .await
        .unwrap()
        .is_none());

    let params = PageQuery::default().normalize();
    let (tweets, total) = tweet_repo::user_tweets(&pool, author, None, &params)
        .await
        .unwrap();
    assert_eq!(total, 1);
    assert_eq!(tweets[0].comment_count, 1);
}

#[actix_web::test]
async fn non_owner_mutation_is_forbidden_end_to_end() {
    let pool = require_pool!();
    let owner = create_user(&pool).await;
    let intruder = create_user(&pool).await;
    let video_id = create_video(&pool, owner, "guarded", 0).await;

    let state = web::Data::new(AppState::from_parts(
        pool.clone(),
        service_config(),
        Arc::new(NullStorage),
    ));
    let app = test::init_service(
        App::new()
            .app_data(state)
            .configure(|cfg| configure_routes(cfg, TEST_SECRET)),
    )
    .await;

    let req = test::TestRequest::patch()
        .uri(&format!("/api/v1/videos/{video_id}"))
        .insert_header(("Authorization", bearer(intruder)))
        .set_json(serde_json::json!({ "title": "hijacked" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 403);

    let req = test::TestRequest::delete()
        .uri(&format!("/api/v1/videos/{video_id}"))
        .insert_header(("Authorization", bearer(intruder)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 403);

    let untouched = video_repo::find_video_by_id(&pool, video_id)
        .await
        .unwrap()
        .expect("video still exists");
    assert_eq!(untouched.title, "guarded");

    let req = test::TestRequest::patch()
        .uri(&format!("/api/v1/videos/{video_id}"))
        .insert_header(("Authorization", bearer(owner)))
        .set_json(serde_json::json!({ "title": "renamed" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let renamed = video_repo::find_video_by_id(&pool, video_id)
        .await
        .unwrap()
        .expect("video exists");
    assert_eq!(renamed.title, "renamed");
}

#[tokio::test]
async fn feed_paginates_and_hides_unpublished_videos() {
    let pool = require_pool!();
    let owner = create_user(&pool).await;
    for i in 0..3 {
        create_video(&pool, owner, &format!("feed {i}"), i).await;
    }
    let hidden = create_video(&pool, owner, "hidden", 0).await;
    video_repo::toggle_publish(&pool, hidden).await.unwrap();

    let params = PageQuery {
        page: Some("1".into()),
        limit: Some("2".into()),
        ..Default::default()
    }
    .normalize();

    let (items, total) = video_repo::feed(&pool, Some(owner), &params).await.unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(total, 3);
    assert!(items.iter().all(|v| v.is_published));
    assert!(items.iter().all(|v| v.owner.id == owner));
}

#[tokio::test]
async fn search_matches_published_titles_only() {
    let pool = require_pool!();
    let owner = create_user(&pool).await;
    let tag = &Uuid::new_v4().simple().to_string()[..8];
    create_video(&pool, owner, &format!("borrowck_{tag} deep dive"), 0).await;
    let hidden = create_video(&pool, owner, &format!("borrowck_{tag} secrets"), 0).await;
    video_repo::toggle_publish(&pool, hidden).await.unwrap();

    let params = PageQuery::default().normalize();
    let (items, total) = video_repo::search(&pool, &format!("borrowck_{tag}"), &params)
        .await
        .unwrap();
    assert_eq!(total, 1);
    assert_eq!(items.len(), 1);
    assert!(items[0].title.contains("deep dive"));
}
