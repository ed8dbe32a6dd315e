use tokio::signal;

/// Resolves on Ctrl+C so the server can stop accepting requests and drain.
pub async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        tracing::error!("failed to install Ctrl+C handler: {}", e);
        return std::future::pending().await;
    }

    #[cfg(not(windows))]
    println!();
    tracing::info!("Ctrl+C recieved. Please wait, this could take a while.");
}
