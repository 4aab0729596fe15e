use dotenvy::dotenv;
use service::{errors::ServiceError, storage::Storage};
use tracing::{error, info, warn};
use uuid::Uuid;

fn init_logging(format: &str) {
    common::utils::logging::init_logging(format);
    info!(service = "datastore", event = "logger_init", "tracing subscriber initialized");
}

/// Record count of one collection, or `None` when its file is corrupt.
async fn count<T>(store: &service::storage::CollectionStore<T>) -> Option<usize>
where
    T: serde::Serialize + serde::de::DeserializeOwned,
{
    match store.try_read_all().await {
        Ok(records) => Some(records.len()),
        Err(ServiceError::Corrupt { collection, reason }) => {
            error!(service = "datastore", event = "corrupt_collection", %collection, %reason, "collection cannot be parsed");
            None
        }
        Err(e) => {
            error!(service = "datastore", event = "read_failed", collection = store.name(), error = %e, "collection unreadable");
            None
        }
    }
}

/// Open every collection, creating missing files, and report what is stored.
async fn check(storage: &Storage) -> bool {
    let counts = [
        ("users", count(&storage.users).await),
        ("posts", count(&storage.posts).await),
        ("comments", count(&storage.comments).await),
        ("tags", count(&storage.tags).await),
        ("collection_points", count(&storage.collection_points).await),
        ("bans", Some(storage.bans.list_bans().await.len())),
    ];
    let mut summary = serde_json::Map::new();
    for (name, n) in &counts {
        summary.insert((*name).to_string(), n.map_or(serde_json::Value::Null, serde_json::Value::from));
    }
    println!("{}", serde_json::Value::Object(summary));
    counts.iter().all(|(_, n)| n.is_some())
}

fn main() -> std::process::ExitCode {
    dotenv().ok();
    let cfg = configs::AppConfig::load_and_validate();
    let log_format = cfg.as_ref().map(|c| c.runtime.log_format.clone()).unwrap_or_else(|_| "compact".into());
    init_logging(&log_format);

    let cfg = match cfg {
        Ok(cfg) => cfg,
        Err(e) => {
            error!(service = "datastore", event = "config_invalid", error = %e, "failed to load configuration");
            return std::process::ExitCode::FAILURE;
        }
    };

    let run_id = Uuid::new_v4();
    let pid = std::process::id();
    let version = env!("CARGO_PKG_VERSION");

    std::panic::set_hook(Box::new(move |info| {
        error!(service = "datastore", event = "panic", %run_id, pid, message = %info, "unhandled panic occurred");
    }));

    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all();
    if let Some(w) = cfg.runtime.worker_threads {
        builder.worker_threads(w);
    }
    let rt = match builder.build() {
        Ok(rt) => rt,
        Err(e) => {
            error!(service = "datastore", event = "runtime_build_failed", error = %e, "failed to build tokio runtime");
            return std::process::ExitCode::FAILURE;
        }
    };

    info!(
        service = "datastore",
        event = "start",
        %run_id,
        pid,
        version,
        data_dir = %cfg.storage.data_dir,
        geocoder = cfg.geocoder.enabled,
        "checking data store"
    );

    rt.block_on(async move {
        let storage = match service::runtime::bootstrap(&cfg).await {
            Ok(storage) => storage,
            Err(e) => {
                error!(service = "datastore", event = "bootstrap_failed", error = %e, "cannot prepare data directory");
                return std::process::ExitCode::FAILURE;
            }
        };
        if check(&storage).await {
            info!(service = "datastore", event = "stop", %run_id, "data store healthy");
            std::process::ExitCode::SUCCESS
        } else {
            warn!(service = "datastore", event = "stop", %run_id, "data store has unreadable collections");
            std::process::ExitCode::FAILURE
        }
    })
}
