//! # course-enroll
//!
//! Payment initiation and Stripe webhook service for course enrollment.
//!
//! ## Usage
//!
//! ```bash
//! # Set environment variables
//! export STRIPE_SECRET_KEY=sk_test_...
//! export STRIPE_WEBHOOK_SECRET=whsec_...
//! export MAIL_HOST=smtp.gmail.com MAIL_USER=... MAIL_PASS=...
//!
//! # Run the server
//! course-enroll
//! ```

use enroll_api::{routes, state::AppState};
use enroll_stripe::print_webhook_setup_instructions;
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    print_banner();

    let state = AppState::from_env().await?;

    let addr = state.config.socket_addr()?;
    let is_prod = state.config.is_production();

    info!("Environment: {}", state.config.environment);
    info!("Store backend: {:?}", state.config.store_backend);
    info!("Payment provider: {}", state.processor.provider_name());
    info!("Webhook dedup: {}", state.config.webhook_dedup);

    let webhook_path = state.processor.webhook_path();
    let app = routes::create_router(state);

    info!("Course enrollment service starting on http://{}", addr);

    if !is_prod {
        info!("Capture: POST http://{}/api/v1/payment/capture", addr);
        info!("Webhook: POST http://{}{}", addr, webhook_path);
        print_webhook_setup_instructions(&format!("http://{}{}", addr, webhook_path));
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::builder()
        .with_default_directive(Level::INFO.into())
        .from_env_lossy();

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer())
            .with(filter)
            .init();
    }
}

fn print_banner() {
    println!(
        r#"
  course-enroll
  ━━━━━━━━━━━━━━━━━━━━━━━
  Course payments & enrollment
  Version: {}
"#,
        env!("CARGO_PKG_VERSION")
    );
}
