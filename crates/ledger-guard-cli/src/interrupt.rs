use ledger_guard_core::StopSignal;

/// Raise `stop` on the first Ctrl-C. The listener runs on its own thread
/// with a single-threaded runtime so the lifecycle check itself stays
/// synchronous.
pub fn stop_on_ctrl_c(stop: StopSignal) {
    let spawned = std::thread::Builder::new()
        .name("ctrl-c".into())
        .spawn(move || {
            let rt = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(rt) => rt,
                Err(e) => {
                    tracing::warn!("cannot listen for Ctrl-C: {e}");
                    return;
                }
            };
            rt.block_on(async {
                if tokio::signal::ctrl_c().await.is_ok() {
                    tracing::info!("interrupt received, stopping database verification");
                    stop.stop();
                }
            });
        });
    if let Err(e) = spawned {
        tracing::warn!("cannot listen for Ctrl-C: {e}");
    }
}
