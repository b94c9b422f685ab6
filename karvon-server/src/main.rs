use karvon_server::{Config, Server, ServerState, print_banner};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. 环境 (dotenv + 日志)
    dotenv::dotenv().ok();
    karvon_server::utils::logger::init_logger();

    print_banner();

    tracing::info!("Karvon operations server starting...");

    // 2. 配置
    let config = Config::from_env();

    // 3. 初始化状态 (数据库连接池 + 迁移)
    let state = ServerState::initialize(&config).await?;

    // 4. HTTP 服务
    let server = Server::with_state(config, state);
    server.run().await.map_err(anyhow::Error::from_boxed)?;

    Ok(())
}
