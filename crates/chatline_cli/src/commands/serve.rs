//! Serve command - Run the browser chat app.

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use tower_http::trace::TraceLayer;
use tracing::info;

use chatline_core::{SessionRegistry, Variant};
use chatline_web::{create_router, AppState, WebConfig};

use super::PipelineArgs;

#[derive(Args, Debug)]
pub struct ServeArgs {
    #[command(flatten)]
    pub pipeline: PipelineArgs,

    /// Address to bind
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, default_value_t = 8501)]
    pub port: u16,

    /// Pause before each reply, in milliseconds [default: 1000 for multi, 0 for single]
    #[arg(long)]
    pub typing_delay_ms: Option<u64>,

    /// Drop sessions idle for this many seconds
    #[arg(long)]
    pub session_ttl_secs: Option<u64>,
}

/// Typing delay used when none is given
pub fn default_typing_delay(variant: Variant) -> Duration {
    match variant {
        Variant::SingleAgent => Duration::ZERO,
        Variant::MultiAgent => Duration::from_millis(1000),
    }
}

pub async fn execute(args: ServeArgs) -> Result<()> {
    let variant = Variant::from(args.pipeline.variant);
    let manager = args.pipeline.build_manager()?;

    let sessions = match args.session_ttl_secs {
        Some(secs) => SessionRegistry::with_idle_ttl(Duration::from_secs(secs)),
        None => SessionRegistry::new(),
    };
    let typing_delay = args
        .typing_delay_ms
        .map(Duration::from_millis)
        .unwrap_or_else(|| default_typing_delay(variant));

    let state = AppState::new(
        manager,
        sessions,
        WebConfig::default().with_typing_delay(typing_delay),
    );
    let app = create_router(state).layer(TraceLayer::new_for_http());

    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    let local = listener.local_addr()?;

    info!(
        %variant,
        typing_delay_ms = typing_delay.as_millis() as u64,
        session_ttl_secs = args.session_ttl_secs,
        "chatline server listening on http://{}",
        local
    );
    println!("💬 chatline ({}) running at http://{}", variant, local);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        // No signal handler available; run until killed.
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_typing_delay() {
        assert_eq!(
            default_typing_delay(Variant::MultiAgent),
            Duration::from_secs(1)
        );
        assert!(default_typing_delay(Variant::SingleAgent).is_zero());
    }
}
