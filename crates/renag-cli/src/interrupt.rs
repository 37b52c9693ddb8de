//! Ctrl-C handling for `renag check`.
//!
//! The first Ctrl-C cancels the scan: files already started finish and the
//! partial report is printed. A second Ctrl-C exits immediately.

use renag_core::{CancelToken, ExitStatus};
use std::io;

/// Spawns a watcher thread that cancels `token` on Ctrl-C.
///
/// # Errors
///
/// Returns an error if the signal runtime or the thread cannot be started.
pub fn cancel_on_ctrl_c(token: CancelToken) -> io::Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_io()
        .build()?;

    std::thread::Builder::new()
        .name("renag-ctrl-c".to_string())
        .spawn(move || {
            runtime.block_on(async {
                if tokio::signal::ctrl_c().await.is_err() {
                    return;
                }
                tracing::warn!("Interrupted; finishing files in progress (Ctrl-C again to abort)");
                token.cancel();

                if tokio::signal::ctrl_c().await.is_ok() {
                    std::process::exit(ExitStatus::ScanFailure.code());
                }
            });
        })?;
    Ok(())
}
