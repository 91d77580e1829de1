//! 主应用程序入口
//!
//! 装配仓储、应用服务与路由，启动 Axum Web API 服务。

use std::net::SocketAddr;
use std::sync::Arc;

use application::services::{
    AuthService, AuthServiceDependencies, BlogsService, BlogsServiceDependencies, CommentsService,
    CommentsServiceDependencies, DevicesService, DevicesServiceDependencies, PostsService,
    PostsServiceDependencies, TestingService, TestingServiceDependencies, UsersService,
    UsersServiceDependencies,
};
use application::{Clock, SystemClock, ThrottleService, TokenIssuer};
use config::AppConfig;
use domain::{
    AttemptRepository, BlogRepository, CommentRepository, LikeRepository, MaintenanceRepository,
    PostRepository, SessionRepository, UserRepository,
};
use infrastructure::db::repositories::{
    PgAttemptRepository, PgBlogRepository, PgCommentRepository, PgLikeRepository,
    PgMaintenanceRepository, PgPostRepository, PgSessionRepository, PgUserRepository,
};
use infrastructure::{create_pg_pool, BcryptPasswordHasher, JwtTokenIssuer, TracingEmailSender};
use tracing_subscriber::EnvFilter;
use web_api::{router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = AppConfig::from_env_with_defaults();

    tracing::info!(
        database = config.database.url.split('@').last().unwrap_or("unknown"),
        "connecting to database"
    );
    let pool = create_pg_pool(&config.database.url, config.database.max_connections).await?;
    sqlx::migrate!("../../migrations").run(&pool).await?;

    // 仓储按依赖它们的服务共享
    let users: Arc<dyn UserRepository> = Arc::new(PgUserRepository::new(pool.clone()));
    let blogs: Arc<dyn BlogRepository> = Arc::new(PgBlogRepository::new(pool.clone()));
    let posts: Arc<dyn PostRepository> = Arc::new(PgPostRepository::new(pool.clone()));
    let comments: Arc<dyn CommentRepository> = Arc::new(PgCommentRepository::new(pool.clone()));
    let likes: Arc<dyn LikeRepository> = Arc::new(PgLikeRepository::new(pool.clone()));
    let sessions: Arc<dyn SessionRepository> = Arc::new(PgSessionRepository::new(pool.clone()));
    let attempts: Arc<dyn AttemptRepository> = Arc::new(PgAttemptRepository::new(pool.clone()));
    let maintenance: Arc<dyn MaintenanceRepository> =
        Arc::new(PgMaintenanceRepository::new(pool));

    let password_hasher: Arc<dyn application::PasswordHasher> =
        Arc::new(BcryptPasswordHasher::new(config.server.bcrypt_cost));
    let token_issuer: Arc<dyn TokenIssuer> = Arc::new(JwtTokenIssuer::new(&config.jwt));
    let email_sender: Arc<dyn application::EmailSender> = Arc::new(TracingEmailSender);
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let auth_service = Arc::new(AuthService::new(AuthServiceDependencies {
        users: users.clone(),
        sessions: sessions.clone(),
        password_hasher: password_hasher.clone(),
        token_issuer: token_issuer.clone(),
        email_sender,
        clock: clock.clone(),
    }));
    let users_service = Arc::new(UsersService::new(UsersServiceDependencies {
        users,
        password_hasher,
        clock: clock.clone(),
    }));
    let blogs_service = Arc::new(BlogsService::new(BlogsServiceDependencies {
        blogs: blogs.clone(),
        posts: posts.clone(),
        clock: clock.clone(),
    }));
    let posts_service = Arc::new(PostsService::new(PostsServiceDependencies {
        posts: posts.clone(),
        blogs,
        likes: likes.clone(),
        clock: clock.clone(),
    }));
    let comments_service = Arc::new(CommentsService::new(CommentsServiceDependencies {
        comments,
        posts,
        likes,
        clock: clock.clone(),
    }));
    let devices_service = Arc::new(DevicesService::new(DevicesServiceDependencies {
        sessions,
        token_issuer: token_issuer.clone(),
        clock: clock.clone(),
    }));
    let testing_service = Arc::new(TestingService::new(TestingServiceDependencies {
        maintenance,
    }));
    let throttle = Arc::new(ThrottleService::new(
        attempts,
        clock,
        config.throttle.window_seconds,
        config.throttle.max_attempts,
    ));

    let state = AppState {
        auth_service,
        users_service,
        blogs_service,
        posts_service,
        comments_service,
        devices_service,
        testing_service,
        throttle,
        token_issuer,
        admin: config.admin.clone(),
    };

    let app = router(state);
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!(%addr, "blog platform API listening");
    // 限流与设备会话需要客户端地址，使用 ConnectInfo
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
