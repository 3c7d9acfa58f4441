use dotenv::dotenv;
use social_users::{config::Config, MongoDB, MongoUserStore, UserStore};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    // Load environment variables
    dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env();

    log::info!("🚀 Bootstrapping users collection...");
    log::info!("📊 Database: {} / {}", config.mongodb_uri, config.mongodb_database);

    let db = match MongoDB::new(&config.mongodb_uri, &config.mongodb_database).await {
        Ok(db) => db,
        Err(e) => {
            log::error!("❌ Failed to connect to MongoDB: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let store = MongoUserStore::new(&db);
    if let Err(e) = store.ensure_indexes().await {
        log::error!("❌ Failed to prepare users collection: {}", e);
        return ExitCode::FAILURE;
    }

    match config.default_avatar().load() {
        Ok(image) => log::info!(
            "🖼️  Default avatar: {} ({} bytes)",
            config.default_avatar_path,
            image.bytes().len()
        ),
        Err(e) => log::warn!("⚠️  {} - users without an image cannot be created", e),
    }

    match db.health_check().await {
        Ok(_) => log::info!("✅ MongoDB healthy"),
        Err(e) => {
            log::error!("❌ Health check failed: {}", e);
            return ExitCode::FAILURE;
        }
    }

    match store.count().await {
        Ok(count) => log::info!("👥 {} user(s) stored", count),
        Err(e) => {
            log::error!("❌ Failed to count users: {}", e);
            return ExitCode::FAILURE;
        }
    }

    ExitCode::SUCCESS
}
