//! /testing 路由
//!
//! 端到端测试前的全量清库，生产部署应在反向代理层屏蔽。

use axum::{extract::State, http::StatusCode, routing::delete, Router};

use crate::error::ApiError;
use crate::state::AppState;

pub(super) fn routes() -> Router<AppState> {
    Router::new().route("/testing/all-data", delete(wipe_all))
}

async fn wipe_all(State(state): State<AppState>) -> Result<StatusCode, ApiError> {
    state.testing_service.wipe_all().await?;
    Ok(StatusCode::NO_CONTENT)
}
