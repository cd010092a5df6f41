/// Resolves once the process receives ctrl-c. Loops poll the shutdown flag
/// and exit at their next iteration boundary.
pub async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {e}");
    }
}
