//! GymSchedPro API server.

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use gymsched::adapters::clock::SystemClock;
use gymsched::adapters::crypto::{Argon2PasswordHasher, HmacTotpGenerator};
use gymsched::adapters::http::{api_router, AppState};
use gymsched::adapters::identity::{LocalIdentityConfig, LocalIdentityProvider};
use gymsched::adapters::memory::{
    InMemoryAccountRepository, InMemoryAppointmentRepository, InMemoryCoachRepository,
    InMemoryIdentityStore,
};
use gymsched::adapters::postgres::{
    self, PostgresAccountRepository, PostgresAppointmentRepository, PostgresCoachRepository,
    PostgresIdentityStore,
};
use gymsched::application::CallPolicy;
use gymsched::config::AppConfig;
use gymsched::domain::account::RoleAssignment;
use gymsched::domain::mfa::TotpConfig;
use gymsched::ports::{AccountRepository, AppointmentRepository, CoachRepository, IdentityStore};

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("Startup error: {err}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    init_tracing(&config);
    config.validate()?;

    let policy = CallPolicy::new(
        config.backend.call_timeout(),
        config.backend.read_retries,
        config.backend.retry_backoff(),
    );
    let clock = Arc::new(SystemClock);

    let (appointments, coaches, accounts, identities): (
        Arc<dyn AppointmentRepository>,
        Arc<dyn CoachRepository>,
        Arc<dyn AccountRepository>,
        Arc<dyn IdentityStore>,
    ) = match &config.database {
        Some(database) => {
            let pool = postgres::connect(
                &database.url,
                database.max_connections,
                database.acquire_timeout(),
            )
            .await?;
            (
                Arc::new(PostgresAppointmentRepository::new(pool.clone())),
                Arc::new(PostgresCoachRepository::new(pool.clone())),
                Arc::new(PostgresAccountRepository::new(pool.clone())),
                Arc::new(PostgresIdentityStore::new(pool)),
            )
        }
        None => {
            tracing::warn!("No database configured, using in-memory stores");
            (
                Arc::new(InMemoryAppointmentRepository::new()),
                Arc::new(InMemoryCoachRepository::new()),
                Arc::new(InMemoryAccountRepository::new()),
                Arc::new(InMemoryIdentityStore::new()),
            )
        }
    };

    let auth = &config.auth;
    let totp = TotpConfig::default();
    let hasher = Argon2PasswordHasher::new(
        auth.password_memory_kib,
        auth.password_iterations,
        auth.password_parallelism,
    )?;
    let identity = Arc::new(LocalIdentityProvider::new(
        LocalIdentityConfig {
            session_secret: auth.session_secret.clone(),
            session_ttl_secs: auth.session_ttl_secs,
            totp_issuer: auth.totp_issuer.clone(),
            totp,
            challenge_ttl_secs: auth.challenge_ttl_secs,
            require_verified_email: auth.require_verified_email,
        },
        identities,
        Arc::new(hasher),
        Arc::new(HmacTotpGenerator::new(totp)),
        clock.clone(),
    ));

    let state = AppState {
        appointments,
        coaches,
        accounts,
        identity: identity.clone(),
        sessions: identity,
        clock,
        roles: RoleAssignment::new(auth.admin_email.clone(), auth.owner_email.clone()),
        policy,
    };

    let addr = config.server.socket_addr()?;
    let app = api_router(state, &config.server);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(
        %addr,
        environment = %config.server.environment,
        "GymSchedPro listening"
    );
    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if config.is_production() {
        builder.json().init();
    } else {
        builder.init();
    }
}
