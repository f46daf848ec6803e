use actix_web::{middleware, web, App, HttpServer};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use pubsub::auth::SessionStore;
use pubsub::config::{RepositoryConfig, ServerConfig};
use pubsub::core::db::seed_demo_data;
use pubsub::handlers::{self, AppState};
use pubsub::repository::Repository;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("pubsub=info,actix_web=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let server_config = ServerConfig::from_env();
    let repo_config = RepositoryConfig::from_env();
    info!(?repo_config, "repository configuration");

    let repo = Repository::with_config(repo_config);
    if server_config.seed_demo_data {
        if let Err(err) = seed_demo_data(&repo) {
            warn!(error = %err, "failed to seed demo data");
        }
    }

    let state = web::Data::new(AppState {
        repo,
        sessions: SessionStore::new(server_config.token_expiration_hours),
    });

    info!("Server listening on http://{}", server_config.bind_addr);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(middleware::Logger::default())
            .configure(handlers::configure)
    })
    .bind(&server_config.bind_addr)?
    .run()
    .await?;

    Ok(())
}
