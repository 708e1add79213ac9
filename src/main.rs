use property_catalog::{
    build_app, infrastructure::logger::Logger, AppConfig, AppState, CatalogService, CatalogStore,
    JsonFile, ROUTE_PREFIX,
};
use tokio::net::TcpListener;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;
    Logger::init(&config.log_level);

    info!("启动房源目录服务...");

    let store = CatalogStore::new(JsonFile::new(&config.data_file, config.layout.clone()));

    // 启动时检查一次数据文件，损坏时只告警，请求仍会返回 500
    match store.load().await {
        Ok(records) => info!(
            "✅ 已加载 {} 条房源 ({}, {:?})",
            records.len(),
            config.data_file.display(),
            config.layout
        ),
        Err(err) => warn!("数据文件暂不可用: {}", err),
    }

    let app = build_app(
        AppState::new(CatalogService::new(store)),
        config.request_timeout,
    );

    let addr = config.server_addr();
    let listener = TcpListener::bind(&addr).await?;

    info!("🚀 房源目录服务运行在 http://{}", addr);
    info!("📖 API 端点:");
    info!("   GET    {}          - 房源列表 (支持 type, search)", ROUTE_PREFIX);
    info!("   POST   {}          - 新增房源", ROUTE_PREFIX);
    info!("   GET    {}/:id      - 单个房源", ROUTE_PREFIX);
    info!("   GET    {}/summary  - 统计信息", ROUTE_PREFIX);
    info!("   GET    /health                  - 健康检查");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("服务已停止");
    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = sigterm.recv() => {}
                    _ = tokio::signal::ctrl_c() => {}
                }
            }
            Err(err) => {
                warn!("无法注册 SIGTERM: {}", err);
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
