//! Route configuration. Each domain manages its own routes; scopes that
//! are protected end to end are wrapped with the JWT middleware, while
//! mixed scopes rely on the `Principal` extractor per route.

use actix_web::web;

use crate::handlers;
use crate::middleware::JwtAuth;

pub fn configure_routes(cfg: &mut web::ServiceConfig, jwt_secret: &str) {
    cfg.route("/health", web::get().to(handlers::health::health))
        .service(
            web::scope("/api/v1")
                .configure(routes::videos::configure)
                .configure(|c| routes::likes::configure(c, jwt_secret))
                .configure(routes::subscriptions::configure)
                .configure(routes::comments::configure)
                .configure(routes::tweets::configure)
                .configure(routes::playlists::configure)
                .configure(|c| routes::dashboard::configure(c, jwt_secret)),
        );
}

mod routes {
    use super::*;

    pub mod videos {
        use super::*;
        use crate::handlers::{comments, videos};

        pub fn configure(cfg: &mut web::ServiceConfig) {
            cfg.service(
                web::scope("/videos")
                    .route("", web::get().to(videos::list_videos))
                    .route("", web::post().to(videos::publish_video))
                    .route("/search", web::get().to(videos::search_videos))
                    .route("/{id}", web::get().to(videos::get_video))
                    .route("/{id}", web::patch().to(videos::update_video))
                    .route("/{id}", web::delete().to(videos::delete_video))
                    .route("/{id}/thumbnail", web::patch().to(videos::update_thumbnail))
                    .route(
                        "/{id}/toggle-publish",
                        web::post().to(videos::toggle_publish),
                    )
                    .route("/{id}/view", web::post().to(videos::record_view))
                    .route("/{id}/comments", web::get().to(comments::video_comments))
                    .route("/{id}/comments", web::post().to(comments::comment_on_video)),
            );
        }
    }

    pub mod likes {
        use super::*;
        use crate::handlers::likes;

        pub fn configure(cfg: &mut web::ServiceConfig, jwt_secret: &str) {
            cfg.service(
                web::scope("/likes")
                    .wrap(JwtAuth::new(jwt_secret))
                    .route(
                        "/toggle/video/{id}",
                        web::post().to(likes::toggle_video_like),
                    )
                    .route(
                        "/toggle/comment/{id}",
                        web::post().to(likes::toggle_comment_like),
                    )
                    .route(
                        "/toggle/tweet/{id}",
                        web::post().to(likes::toggle_tweet_like),
                    )
                    .route("/status", web::get().to(likes::like_status))
                    .route("/videos", web::get().to(likes::liked_videos)),
            );
        }
    }

    pub mod subscriptions {
        use super::*;
        use crate::handlers::subscriptions;

        pub fn configure(cfg: &mut web::ServiceConfig) {
            cfg.service(
                web::scope("/subscriptions")
                    .route(
                        "/toggle/{channelId}",
                        web::post().to(subscriptions::toggle_subscription),
                    )
                    .route(
                        "/{channelId}/subscribers",
                        web::get().to(subscriptions::channel_subscribers),
                    )
                    .route(
                        "/{subscriberId}/channels",
                        web::get().to(subscriptions::subscribed_channels),
                    ),
            );
        }
    }

    pub mod comments {
        use super::*;
        use crate::handlers::comments;

        pub fn configure(cfg: &mut web::ServiceConfig) {
            cfg.service(
                web::scope("/comments")
                    .route("/{id}", web::patch().to(comments::update_comment))
                    .route("/{id}", web::delete().to(comments::delete_comment)),
            );
        }
    }

    pub mod tweets {
        use super::*;
        use crate::handlers::{comments, tweets};

        pub fn configure(cfg: &mut web::ServiceConfig) {
            cfg.service(
                web::scope("/tweets")
                    .route("", web::post().to(tweets::create_tweet))
                    .route("/user/{userId}", web::get().to(tweets::user_tweets))
                    .route("/{id}", web::get().to(tweets::get_tweet))
                    .route("/{id}", web::patch().to(tweets::update_tweet))
                    .route("/{id}", web::delete().to(tweets::delete_tweet))
                    .route("/{id}/comments", web::get().to(comments::tweet_comments))
                    .route("/{id}/comments", web::post().to(comments::comment_on_tweet)),
            );
        }
    }

    pub mod playlists {
        use super::*;
        use crate::handlers::playlists;

        pub fn configure(cfg: &mut web::ServiceConfig) {
            cfg.service(
                web::scope("/playlists")
                    .route("", web::post().to(playlists::create_playlist))
                    .route("/user/{userId}", web::get().to(playlists::user_playlists))
                    .route("/{id}", web::get().to(playlists::get_playlist))
                    .route("/{id}", web::patch().to(playlists::update_playlist))
                    .route("/{id}", web::delete().to(playlists::delete_playlist))
                    .route(
                        "/{id}/videos/{videoId}",
                        web::post().to(playlists::add_video),
                    )
                    .route(
                        "/{id}/videos/{videoId}",
                        web::delete().to(playlists::remove_video),
                    ),
            );
        }
    }

    pub mod dashboard {
        use super::*;
        use crate::handlers::dashboard;

        pub fn configure(cfg: &mut web::ServiceConfig, jwt_secret: &str) {
            cfg.service(
                web::scope("/dashboard")
                    .wrap(JwtAuth::new(jwt_secret))
                    .route("/stats", web::get().to(dashboard::channel_stats))
                    .route("/videos", web::get().to(dashboard::channel_videos)),
            );
        }
    }
}
