use chrono_tz::Tz;

/// 服务器配置
///
/// # 环境变量
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | HTTP_PORT | 3000 | HTTP 服务端口 |
/// | DATA_DIR | ./data | 数据目录 (SQLite 数据库文件) |
/// | TIMEZONE | Europe/Warsaw | 业务时区 (营业日边界) |
/// | ENVIRONMENT | development | 运行环境 |
/// | LOG_LEVEL | info | 日志级别 |
/// | LOG_DIR | (无) | 日志文件目录，未设置则只输出到终端 |
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP API 服务端口
    pub http_port: u16,
    /// 数据目录，存储数据库文件
    pub data_dir: String,
    /// 业务时区 — 所有「营业日」范围计算都基于它
    pub timezone: Tz,
    /// 运行环境: development | staging | production
    pub environment: String,
}

impl Config {
    /// 从环境变量加载配置，未设置的项使用默认值
    pub fn from_env() -> Self {
        let timezone = std::env::var("TIMEZONE")
            .ok()
            .and_then(|v| v.parse::<Tz>().ok())
            .unwrap_or(chrono_tz::Europe::Warsaw);

        Self {
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            data_dir: std::env::var("DATA_DIR").unwrap_or_else(|_| "./data".into()),
            timezone,
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
        }
    }

    /// 使用自定义值覆盖部分配置，常用于测试场景
    pub fn with_overrides(data_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.data_dir = data_dir.into();
        config.http_port = http_port;
        config
    }

    /// 数据库文件路径
    pub fn database_path(&self) -> std::path::PathBuf {
        std::path::Path::new(&self.data_dir).join("karvon.db")
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
