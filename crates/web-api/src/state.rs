use std::sync::Arc;

use application::services::{
    AuthService, BlogsService, CommentsService, DevicesService, PostsService, TestingService,
    UsersService,
};
use application::{ThrottleService, TokenIssuer};
use config::AdminConfig;

#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<AuthService>,
    pub users_service: Arc<UsersService>,
    pub blogs_service: Arc<BlogsService>,
    pub posts_service: Arc<PostsService>,
    pub comments_service: Arc<CommentsService>,
    pub devices_service: Arc<DevicesService>,
    pub testing_service: Arc<TestingService>,
    pub throttle: Arc<ThrottleService>,
    pub token_issuer: Arc<dyn TokenIssuer>,
    pub admin: AdminConfig,
}
