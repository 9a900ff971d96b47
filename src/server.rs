//! Booking service runtime.
//!
//! [`ServerHandle`] owns the full lifecycle: database init, migrations,
//! default admin, REST API, finish sweep, metrics and graceful shutdown.

use std::sync::{Arc, OnceLock};
use std::time::Instant;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use sea_orm::DatabaseConnection;
use tracing::{error, info, warn};

use crate::application::{
    run_sweep, start_finish_sweep_task, CatalogService, ReservationService, SweepReport,
};
use crate::config::{AppConfig, SANDBOX_PROVIDER};
use crate::domain::vehicle::CatalogRepository;
use crate::domain::{PoolTopology, RepositoryProvider};
use crate::infrastructure::crypto::hash_password;
use crate::infrastructure::database::repositories::SeaOrmRepositoryProvider;
use crate::infrastructure::{
    init_database, run_migrations, LogNotifier, SandboxPaymentGateway,
};
use crate::interfaces::http::modules::auth::{find_admin, insert_admin};
use crate::interfaces::http::{create_api_router, ApiContext};
use crate::shared::shutdown::{ShutdownCoordinator, ShutdownSignal};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

// ── Options ────────────────────────────────────────────────────────

pub struct ServerOptions {
    pub config: AppConfig,
    /// Run database migrations on startup (default: true).
    pub auto_migrate: bool,
    /// Create the configured admin account if it does not exist (default: true).
    pub create_default_admin: bool,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            config: AppConfig::default(),
            auto_migrate: true,
            create_default_admin: true,
        }
    }
}

// ── Services ───────────────────────────────────────────────────────

/// Wired application services over an open database.
#[derive(Clone)]
pub struct Services {
    pub repos: Arc<dyn RepositoryProvider>,
    pub reservations: ReservationService,
    pub catalog: CatalogService,
}

impl Services {
    /// Build the pool topology from the stored vehicle types and wire the
    /// services with the sandbox payment provider and log notifier.
    pub async fn build(db: &DatabaseConnection, config: &AppConfig) -> Result<Self, BoxError> {
        let repos: Arc<dyn RepositoryProvider> =
            Arc::new(SeaOrmRepositoryProvider::new(db.clone()));

        let vehicle_types = repos.catalog().list_vehicle_types().await?;
        let topology = Arc::new(PoolTopology::from_vehicle_types(&vehicle_types));
        info!(vehicle_types = vehicle_types.len(), "Pool topology loaded");

        if config.payment.provider != SANDBOX_PROVIDER {
            warn!(
                provider = %config.payment.provider,
                "Unknown payment provider, falling back to sandbox"
            );
        }
        let payment = Arc::new(SandboxPaymentGateway::new(
            config.payment.checkout_base_url.clone(),
        ));
        let notifier = Arc::new(LogNotifier::new());

        let reservations = ReservationService::new(
            repos.clone(),
            topology.clone(),
            payment,
            notifier,
            config.lifecycle_settings(),
        );
        let catalog = CatalogService::new(repos.clone(), topology);

        Ok(Self {
            repos,
            reservations,
            catalog,
        })
    }
}

/// Open the database and apply migrations when asked to.
pub async fn open_database(
    config: &AppConfig,
    auto_migrate: bool,
) -> Result<DatabaseConnection, BoxError> {
    let db = init_database(&config.database_config()).await?;
    if auto_migrate {
        info!("Running database migrations...");
        run_migrations(&db).await?;
    }
    Ok(db)
}

/// One sweep against the configured database, then exit.
pub async fn sweep_once(config: &AppConfig, auto_migrate: bool) -> Result<SweepReport, BoxError> {
    let db = open_database(config, auto_migrate).await?;
    let services = Services::build(&db, config).await?;
    let report = run_sweep(&services.reservations).await?;
    info!(
        finished = report.finished,
        expired = report.expired,
        "🧹 One-off sweep done"
    );
    db.close().await?;
    Ok(report)
}

// ── ServerHandle ───────────────────────────────────────────────────

/// Handle to a running booking service.
///
/// ```rust,no_run
/// use parkspace::server::{ServerHandle, ServerOptions};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
///     let handle = ServerHandle::start(ServerOptions::default()).await?;
///     handle.shutdown().await;
///     Ok(())
/// }
/// ```
pub struct ServerHandle {
    pub services: Services,
    /// The configuration the server was started with.
    pub config: AppConfig,
    pub api_port: u16,

    db: DatabaseConnection,
    shutdown: ShutdownCoordinator,
    sweep_task: tokio::task::JoinHandle<()>,
    api_task: tokio::task::JoinHandle<()>,
}

impl ServerHandle {
    /// Start the service:
    /// 1. Install the Prometheus recorder
    /// 2. Connect to the database and run migrations
    /// 3. Create the default admin (if enabled)
    /// 4. Start the finish sweep task
    /// 5. Start the REST API (with Swagger UI)
    pub async fn start(opts: ServerOptions) -> Result<Self, BoxError> {
        let app_cfg = opts.config;
        app_cfg.validate()?;

        info!("Starting Parkspace booking service...");

        let prometheus_handle = prometheus_handle()?;

        // ── Database ───────────────────────────────────────────
        let db = open_database(&app_cfg, opts.auto_migrate).await?;

        if opts.create_default_admin {
            create_default_admin(&db, &app_cfg).await;
        }

        // ── Services ───────────────────────────────────────────
        let services = Services::build(&db, &app_cfg).await?;

        let jwt_config = app_cfg.jwt_config();
        info!(
            "JWT configured with {}h token expiration",
            jwt_config.expiration_hours
        );
        if app_cfg.security.webhook_secret.is_none() {
            warn!("No webhook secret configured, payment callbacks are not authenticated");
        }

        // ── Shutdown coordinator ───────────────────────────────
        let shutdown = ShutdownCoordinator::new(app_cfg.server.shutdown_timeout);
        let shutdown_signal = shutdown.signal();

        // ── Background tasks ───────────────────────────────────
        let sweep_task = start_finish_sweep_task(
            services.reservations.clone(),
            shutdown_signal.clone(),
            app_cfg.sweep_interval(),
        );

        // ── REST API server ────────────────────────────────────
        let api_router = create_api_router(ApiContext {
            db: db.clone(),
            reservations: services.reservations.clone(),
            catalog: services.catalog.clone(),
            jwt_config,
            webhook_secret: app_cfg.security.webhook_secret.clone(),
            metrics: prometheus_handle,
            started_at: Arc::new(Instant::now()),
        });

        let api_port = app_cfg.server.api_port;
        let api_addr = format!("{}:{}", app_cfg.server.api_host, api_port);
        let listener = tokio::net::TcpListener::bind(&api_addr).await?;
        info!("REST API server listening on http://{}", api_addr);
        info!("Swagger UI available at http://{}/docs/", api_addr);

        let api_shutdown = shutdown_signal.clone();
        let api_server = axum::serve(listener, api_router).with_graceful_shutdown(async move {
            api_shutdown.wait().await;
            info!("🛑 REST API server received shutdown signal");
        });

        let api_task = tokio::spawn(async move {
            if let Err(e) = api_server.await {
                error!("REST API server error: {}", e);
            }
        });

        info!("🚀 Booking service started.");

        Ok(Self {
            services,
            config: app_cfg,
            api_port,
            db,
            shutdown,
            sweep_task,
            api_task,
        })
    }

    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.signal()
    }

    /// Install OS signal listeners (SIGTERM, SIGINT) that trigger shutdown.
    pub fn install_signal_handler(&self) {
        self.shutdown.start_signal_listener();
    }

    pub fn trigger_shutdown(&self) {
        self.shutdown.signal().trigger();
    }

    /// Wait for the server to stop after shutdown has been triggered, at most
    /// the configured shutdown timeout.
    pub async fn wait(self) {
        info!("⏳ Waiting for server tasks to complete...");

        let Self {
            db,
            shutdown,
            sweep_task,
            api_task,
            ..
        } = self;

        let tasks = async move {
            match api_task.await {
                Ok(()) => info!("REST API server stopped"),
                Err(e) => error!("REST API server task panicked: {}", e),
            }
            if let Err(e) = sweep_task.await {
                error!("Finish sweep task panicked: {}", e);
            }
        };
        if tokio::time::timeout(shutdown.timeout(), tasks).await.is_err() {
            warn!(
                timeout_secs = shutdown.timeout().as_secs(),
                "Shutdown timed out, exiting anyway"
            );
        }

        if let Err(e) = db.close().await {
            warn!("Error closing database connection: {}", e);
        } else {
            info!("✅ Database connection closed");
        }

        info!("👋 Parkspace shutdown complete");
    }

    /// Trigger shutdown and wait for completion.
    pub async fn shutdown(self) {
        info!("🛑 Shutting down booking service...");
        self.trigger_shutdown();
        self.wait().await;
    }

    pub fn is_running(&self) -> bool {
        !self.api_task.is_finished()
    }
}

// ── Helpers ────────────────────────────────────────────────────────

/// The global recorder can only be installed once per process, so a restart
/// within the same process reuses it.
fn prometheus_handle() -> Result<PrometheusHandle, BoxError> {
    static PROM_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

    if let Some(handle) = PROM_HANDLE.get() {
        return Ok(handle.clone());
    }
    let handle = PrometheusBuilder::new().install_recorder()?;
    info!("📊 Prometheus metrics recorder installed");
    Ok(PROM_HANDLE.get_or_init(|| handle).clone())
}

/// Create the configured admin account unless it already exists.
async fn create_default_admin(db: &DatabaseConnection, app_cfg: &AppConfig) {
    let username = app_cfg.admin.username.trim();

    match find_admin(db, username).await {
        Ok(Some(_)) => return,
        Ok(None) => {}
        Err(e) => {
            error!("Failed to look up admin user: {}", e);
            return;
        }
    }

    info!("Creating default admin user...");
    let password_hash = match hash_password(&app_cfg.admin.password) {
        Ok(hash) => hash,
        Err(e) => {
            error!("Failed to hash admin password: {}", e);
            return;
        }
    };

    match insert_admin(db, username, password_hash).await {
        Ok(_) => {
            info!("Default admin created: {}", username);
            info!("⚠️  Please change the admin password immediately!");
        }
        Err(e) => error!("Failed to create admin user: {}", e),
    }
}

/// Initialize tracing from the application config. `RUST_LOG` wins over
/// `[logging] level`.
///
/// Call once at process startup, before [`ServerHandle::start`].
pub fn init_tracing(config: &AppConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    match config.logging.format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.database.url = "sqlite::memory:".to_string();
        config.database.max_connections = 1;
        config
    }

    #[tokio::test]
    async fn default_admin_is_created_once() {
        let config = memory_config();
        let db = open_database(&config, true).await.unwrap();

        create_default_admin(&db, &config).await;
        let first = find_admin(&db, "admin").await.unwrap().unwrap();
        create_default_admin(&db, &config).await;
        let second = find_admin(&db, "admin").await.unwrap().unwrap();

        assert_eq!(first.id, second.id);
    }

    #[tokio::test]
    async fn services_follow_the_seeded_topology() {
        let config = memory_config();
        let db = open_database(&config, true).await.unwrap();
        let services = Services::build(&db, &config).await.unwrap();

        let configs = services.catalog.list_vehicle_configs().await.unwrap();
        assert_eq!(configs.len(), 3);
        assert_eq!(
            run_sweep(&services.reservations).await.unwrap(),
            SweepReport::default()
        );
    }

    #[tokio::test]
    async fn unsigned_callbacks_block_a_real_provider() {
        let mut config = memory_config();
        config.payment.provider = "stripe".to_string();

        let err = ServerHandle::start(ServerOptions {
            config,
            auto_migrate: true,
            create_default_admin: false,
        })
        .await
        .err()
        .expect("start refused");
        assert!(err.to_string().contains("security.webhook_secret"));
    }
}
