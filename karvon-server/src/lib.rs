//! Karvon operations server — 配送业务运营后端
//!
//! # 模块结构
//!
//! ```text
//! karvon-server/src/
//! ├── core/          # 配置、状态、HTTP 服务器
//! ├── api/           # HTTP 路由和处理器 (每个资源一个模块)
//! ├── db/            # 数据库层 (连接池、迁移、仓储)
//! ├── reconcile.rs   # 对账计算 (纯函数)
//! └── utils/         # 错误、日志、时间、校验
//! ```

pub mod api;
pub mod core;
pub mod db;
pub mod reconcile;
pub mod utils;

// Re-export 公共类型
pub use crate::core::{Config, Server, ServerState};
pub use crate::utils::{AppError, AppResult};

pub fn print_banner() {
    println!(
        r#"
    __ __
   / //_/___ _______   ______  ____
  / ,<  / __ `/ ___/ | / / __ \/ __ \
 / /| |/ /_/ / /   | |/ / /_/ / / / /
/_/ |_|\__,_/_/    |___/\____/_/ /_/
    "#
    );
}
