//! Loading indicator shown while a scenario is pending.

use std::io::Write;
use std::time::{Duration, Instant};

use tokio::sync::watch;
use tokio::task::JoinHandle;

const FRAMES: &[&str] = &["◐", "◓", "◑", "◒"];

const TICK: Duration = Duration::from_millis(120);

/// Draws `<frame> <message> (<elapsed>s / <budget>s)` on stderr until stopped,
/// so stdout stays clean for `--format json` output.
pub struct Spinner {
    handle: JoinHandle<()>,
    stop: watch::Sender<bool>,
}

impl Spinner {
    pub fn start(message: &str, budget: Duration) -> Self {
        let (stop_tx, mut stop_rx) = watch::channel(false);
        let message = message.to_string();
        let started = Instant::now();

        let handle = tokio::spawn(async move {
            let mut frames = FRAMES.iter().cycle();
            loop {
                let frame = frames.next().copied().unwrap_or(" ");
                eprint!(
                    "\x1b[2K\r{frame} {}",
                    status_line(&message, started.elapsed(), budget)
                );
                let _ = std::io::stderr().flush();

                tokio::select! {
                    _ = tokio::time::sleep(TICK) => {}
                    _ = stop_rx.changed() => break,
                }
            }
            eprint!("\x1b[2K\r");
            let _ = std::io::stderr().flush();
        });

        Self {
            handle,
            stop: stop_tx,
        }
    }

    /// Stop drawing and clear the line.
    pub async fn stop(self) {
        let _ = self.stop.send(true);
        let _ = self.handle.await;
    }
}

fn status_line(message: &str, elapsed: Duration, budget: Duration) -> String {
    format!("{message} ({}s / {}s)", elapsed.as_secs(), budget.as_secs())
}
