//! hdo entry point: prepares the database and reports issue status.

use std::sync::Arc;

use hdo_common::{AppError, Config, Localizer};
use hdo_core::{IssueService, StatsCache};
use hdo_db::repositories::{IssueRepository, UserRepository, VoteConnectionRepository};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hdo=debug".into()),
        )
        .init();

    info!("Starting hdo...");

    let config = Config::load()
        .map_err(AppError::from)
        .inspect_err(AppError::log)?;
    let localizer = Localizer::from_config(&config.locale);

    let db = hdo_db::init(&config).await.inspect_err(AppError::log)?;
    info!("Connected to database");

    let applied = hdo_db::migrate(&db).await.inspect_err(AppError::log)?;
    info!(applied, "Migrations completed");

    let db = Arc::new(db);
    let issue_service = IssueService::new(
        IssueRepository::new(Arc::clone(&db)),
        VoteConnectionRepository::new(Arc::clone(&db)),
        UserRepository::new(Arc::clone(&db)),
        StatsCache::default(),
    );

    let issues = issue_service
        .list_vote_ordered()
        .await
        .inspect_err(AppError::log)?;

    for issue in issues {
        let record = issue_service.load(issue.id).await.inspect_err(AppError::log)?;
        let stats = issue_service.stats(issue.id).await.inspect_err(AppError::log)?;
        info!(
            issue_id = issue.id,
            slug = %issue.slug,
            status = %record.published_text(&localizer),
            editor = %record.last_updated_by_name(&localizer),
            votes = stats.total,
            score = ?stats.score,
            "Issue"
        );
    }

    info!("Done");
    Ok(())
}
