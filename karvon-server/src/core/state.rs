use sqlx::SqlitePool;

use crate::core::Config;
use crate::db::DbService;
use crate::utils::AppError;

/// 服务器状态 — 所有 handler 共享的引用
///
/// | 字段 | 说明 |
/// |------|------|
/// | config | 配置项 (不可变) |
/// | pool | SQLite 连接池 |
#[derive(Clone, Debug)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// SQLite 连接池
    pub pool: SqlitePool,
}

impl ServerState {
    pub fn new(config: Config, pool: SqlitePool) -> Self {
        Self { config, pool }
    }

    /// 初始化服务器状态
    ///
    /// 1. 确保数据目录存在
    /// 2. 打开数据库 (data_dir/karvon.db) 并应用迁移
    pub async fn initialize(config: &Config) -> Result<Self, AppError> {
        std::fs::create_dir_all(&config.data_dir).map_err(|e| {
            AppError::internal(format!(
                "Failed to create data directory {}: {e}",
                config.data_dir
            ))
        })?;

        let db_path = config.database_path();
        let db_service = DbService::new(&db_path.to_string_lossy()).await?;

        Ok(Self::new(config.clone(), db_service.pool))
    }
}
