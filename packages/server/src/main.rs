use axum::http::{self, Method};
use dotenvy::dotenv;
use env_logger::Builder;
use log::LevelFilter;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use werewolf_server::{
    app,
    models::config::RolePool,
    state::AppState,
    utils::config::ServerConfig,
};

// ログ設定
fn init_logger() {
    let mut builder = Builder::new();
    builder
        .filter_level(LevelFilter::Info)
        .filter_module("werewolf_server", LevelFilter::Debug)
        .filter_module("tower_http", LevelFilter::Debug)
        .format_timestamp(Some(env_logger::TimestampPrecision::Millis))
        .format_target(true)
        .parse_default_env()
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 環境変数をロード
    if let Err(e) = dotenv() {
        eprintln!("Warning: .envファイルの読み込みに失敗しました: {}", e);
    }

    init_logger();

    let config = ServerConfig::from_env()?;
    let pool = RolePool::load(&config.roles_file)?;
    log::info!(
        "loaded {} roles from {}: {:?}",
        pool.required_players(),
        config.roles_file.display(),
        pool.roles()
    );
    log::info!("rules: {:?}", config.rules);

    let state = AppState::new(pool, config.rules.clone());

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([http::header::CONTENT_TYPE]);

    let app = app::create_app(state).layer(cors).layer(
        TraceLayer::new_for_http().make_span_with(|request: &http::Request<_>| {
            tracing::info_span!(
                "HTTP request",
                method = %request.method(),
                uri = %request.uri(),
            )
        }),
    );

    let listener = tokio::net::TcpListener::bind(config.bind_address).await?;
    log::info!("サーバーを起動しました: http://{}", config.bind_address);
    axum::serve(listener, app).await?;
    Ok(())
}
