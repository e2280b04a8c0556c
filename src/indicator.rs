use std::io::{self, Write};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::warn;

/// Busy indicator printing a `.` every tick while a request is in flight.
///
/// The first dot is printed as soon as the task runs. Dropping the indicator
/// without calling [`TypingIndicator::stop`] also ends the task, but only
/// `stop` waits for it to finish writing.
pub struct TypingIndicator {
    stop_tx: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

impl TypingIndicator {
    pub fn start(interval: Duration) -> Self {
        Self::start_with_writer(interval, io::stdout())
    }

    pub fn start_with_writer<W>(interval: Duration, mut writer: W) -> Self
    where
        W: Write + Send + 'static,
    {
        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(async move {
            let mut ticker = time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    biased;
                    _ = &mut stop_rx => break,
                    _ = ticker.tick() => {
                        if writer.write_all(b".").and_then(|()| writer.flush()).is_err() {
                            break;
                        }
                    }
                }
            }
        });

        Self { stop_tx, handle }
    }

    pub async fn stop(self) {
        let _ = self.stop_tx.send(());
        if let Err(err) = self.handle.await {
            warn!(error = %err, "typing indicator task failed");
        }
    }
}
