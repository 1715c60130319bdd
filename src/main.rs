use std::{path::Path, process, sync::Arc};

use inkwell::{
    application::{
        clock::SystemClock,
        error::AppError,
        posts::PostService,
        snapshot::SnapshotRepo,
        store::PostStore,
    },
    config::{self, Settings},
    domain::types::FeaturedMode,
    infra::{
        error::InfraError,
        http::{self, ApiState},
        snapshot::TomlSnapshotRepo,
        telemetry,
    },
};
use tokio::sync::Notify;
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) =
        config::load_with_cli().map_err(|err| AppError::from(InfraError::from(err)))?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
        config::Command::CheckSnapshot(args) => {
            run_check_snapshot(settings.store.featured_mode, &args.file).await
        }
    }
}

async fn run_serve(settings: Settings) -> Result<(), AppError> {
    let mode = settings.store.featured_mode;
    let snapshots = settings
        .store
        .snapshot_path
        .as_ref()
        .map(TomlSnapshotRepo::new);

    let posts = Arc::new(load_post_service(mode, snapshots.as_ref()).await?);
    info!(
        target = "inkwell::server",
        featured_mode = %mode,
        posts = posts.post_count(),
        "Post store ready"
    );

    let served = serve_http(&settings, ApiState::new(Arc::clone(&posts))).await;
    finish_serving(served, snapshots.as_ref(), &posts).await
}

/// Save the store whether or not the server stopped cleanly. A server error
/// takes precedence over a failed save.
async fn finish_serving(
    served: Result<(), AppError>,
    snapshots: Option<&TomlSnapshotRepo>,
    posts: &PostService,
) -> Result<(), AppError> {
    let saved = match snapshots {
        Some(repo) => save_snapshot(repo, posts).await,
        None => Ok(()),
    };

    match (served, saved) {
        (Err(err), Err(save_err)) => {
            error!(
                target = "inkwell::server",
                error = %save_err,
                "Failed to save store snapshot after server error"
            );
            Err(err)
        }
        (Err(err), Ok(())) | (Ok(()), Err(err)) => Err(err),
        (Ok(()), Ok(())) => Ok(()),
    }
}

async fn save_snapshot(repo: &TomlSnapshotRepo, posts: &PostService) -> Result<(), AppError> {
    repo.save(&posts.snapshot()).await?;
    info!(
        target = "inkwell::server",
        path = %repo.path().display(),
        "Store snapshot saved"
    );
    Ok(())
}

async fn load_post_service(
    mode: FeaturedMode,
    snapshots: Option<&TomlSnapshotRepo>,
) -> Result<PostService, AppError> {
    let clock = Arc::new(SystemClock);

    let Some(repo) = snapshots else {
        return Ok(PostService::new(mode, clock));
    };

    match repo.load().await? {
        Some(snapshot) => {
            let service = PostService::from_snapshot(mode, snapshot, clock)?;
            info!(
                target = "inkwell::server",
                path = %repo.path().display(),
                "Store restored from snapshot"
            );
            Ok(service)
        }
        None => {
            info!(
                target = "inkwell::server",
                path = %repo.path().display(),
                "No snapshot found, starting with an empty store"
            );
            Ok(PostService::new(mode, clock))
        }
    }
}

async fn serve_http(settings: &Settings, api_state: ApiState) -> Result<(), AppError> {
    let router = http::build_router(api_state);

    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;
    info!(
        target = "inkwell::server",
        addr = %settings.server.addr,
        "Listening"
    );

    let stop = Arc::new(Notify::new());
    let stopped = Arc::clone(&stop);
    let mut server = tokio::spawn(async move {
        axum::serve(listener, router.into_make_service())
            .with_graceful_shutdown(async move { stopped.notified().await })
            .await
    });

    tokio::select! {
        result = &mut server => return flatten_server_result(result),
        () = shutdown_signal() => {}
    }

    info!(
        target = "inkwell::server",
        grace_seconds = settings.server.graceful_shutdown.as_secs(),
        "Shutdown requested, draining connections"
    );
    stop.notify_one();

    match tokio::time::timeout(settings.server.graceful_shutdown, &mut server).await {
        Ok(result) => flatten_server_result(result),
        Err(_) => {
            warn!(
                target = "inkwell::server",
                "Graceful shutdown timed out, closing remaining connections"
            );
            server.abort();
            Ok(())
        }
    }
}

fn flatten_server_result(
    result: Result<std::io::Result<()>, tokio::task::JoinError>,
) -> Result<(), AppError> {
    match result {
        Ok(Ok(())) => Ok(()),
        Ok(Err(err)) => Err(AppError::from(InfraError::from(err))),
        Err(err) => Err(AppError::unexpected(format!("server task failed: {err}"))),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(target = "inkwell::server", error = %err, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                terminate.recv().await;
            }
            Err(err) => {
                warn!(target = "inkwell::server", error = %err, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}

async fn run_check_snapshot(mode: FeaturedMode, file: &Path) -> Result<(), AppError> {
    let repo = TomlSnapshotRepo::new(file);
    let snapshot = repo.load().await?.ok_or_else(|| {
        AppError::unexpected(format!("snapshot file `{}` does not exist", file.display()))
    })?;

    let next_id = snapshot.next_id;
    let store = PostStore::restore(mode, snapshot)?;
    info!(
        target = "inkwell::snapshot",
        path = %file.display(),
        featured_mode = %mode,
        posts = store.len(),
        featured = store.featured_posts().len(),
        next_id,
        "Snapshot is valid"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use inkwell::application::clock::ManualClock;
    use inkwell::domain::entities::PostContent;

    fn service_with_post() -> PostService {
        let service = PostService::new(FeaturedMode::Starred, Arc::new(ManualClock::new(0, 1)));
        service
            .create_post(PostContent::new("A", "body", "ada"))
            .expect("create");
        service
    }

    #[tokio::test]
    async fn snapshot_is_saved_when_server_fails() {
        let dir = tempfile::tempdir().expect("tempdir");
        let repo = TomlSnapshotRepo::new(dir.path().join("store.toml"));
        let posts = service_with_post();

        let result = finish_serving(
            Err(AppError::unexpected("server task failed")),
            Some(&repo),
            &posts,
        )
        .await;

        assert!(matches!(result, Err(AppError::Unexpected(_))));
        let saved = repo.load().await.expect("load").expect("snapshot written");
        assert_eq!(saved, posts.snapshot());
    }

    #[tokio::test]
    async fn clean_shutdown_saves_snapshot() {
        let dir = tempfile::tempdir().expect("tempdir");
        let repo = TomlSnapshotRepo::new(dir.path().join("store.toml"));
        let posts = service_with_post();

        finish_serving(Ok(()), Some(&repo), &posts)
            .await
            .expect("finish");

        assert_eq!(repo.load().await.expect("load"), Some(posts.snapshot()));
    }

    #[tokio::test]
    async fn in_memory_store_skips_saving() {
        let posts = service_with_post();
        assert!(finish_serving(Ok(()), None, &posts).await.is_ok());
    }
}
