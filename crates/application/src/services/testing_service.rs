use std::sync::Arc;

use domain::MaintenanceRepository;

use crate::error::ApplicationError;

pub struct TestingServiceDependencies {
    pub maintenance: Arc<dyn MaintenanceRepository>,
}

/// DELETE /testing/all-data 的后端：清空全部数据，仅用于测试环境。
pub struct TestingService {
    deps: TestingServiceDependencies,
}

impl TestingService {
    pub fn new(deps: TestingServiceDependencies) -> Self {
        Self { deps }
    }

    pub async fn wipe_all(&self) -> Result<(), ApplicationError> {
        self.deps.maintenance.wipe_all().await?;
        tracing::warn!("all application data wiped");
        Ok(())
    }
}
