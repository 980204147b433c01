use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

/// Lifecycle of one background dataset fetch.
#[derive(Debug, Default)]
pub(super) enum LoadState<T> {
    #[default]
    Idle,
    Loading,
    Ready(T),
    Error(String),
}

impl<T> LoadState<T> {
    pub(super) fn ready(&self) -> Option<&T> {
        match self {
            Self::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub(super) fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }
}

pub(super) type LoadReceiver<T> = Receiver<Result<T, String>>;

/// Runs `job` on a worker thread; errors are flattened to their display chain
/// so they can cross the channel.
pub(super) fn spawn_load<T, F>(job: F) -> LoadReceiver<T>
where
    T: Send + 'static,
    F: FnOnce() -> anyhow::Result<T> + Send + 'static,
{
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        let result = job().map_err(|error| format!("{error:#}"));
        let _ = tx.send(result);
    });

    rx
}

/// Non-blocking poll of a pending load. `None` while the worker is still
/// running.
pub(super) fn poll_load<T>(rx: &LoadReceiver<T>) -> Option<Result<T, String>> {
    match rx.try_recv() {
        Ok(result) => Some(result),
        Err(TryRecvError::Empty) => None,
        Err(TryRecvError::Disconnected) => {
            Some(Err("Background load worker disconnected".to_owned()))
        }
    }
}

/// User-facing message for a failed load, naming the command that produces
/// the missing files.
pub(super) fn load_error_message(error: &str, preprocess_cmd: &str) -> String {
    format!("{error}. Run: {preprocess_cmd} (see README for details).")
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn worker_result_arrives_on_the_channel() {
        let rx = spawn_load(|| Ok(7));
        let result = rx.recv_timeout(Duration::from_secs(5)).expect("worker should finish");
        assert_eq!(result, Ok(7));
    }

    #[test]
    fn errors_keep_their_context_chain() {
        let rx = spawn_load::<(), _>(|| {
            Err(anyhow::anyhow!("HTTP 404").context("failed to load airports_poi.json"))
        });
        let result = rx.recv_timeout(Duration::from_secs(5)).expect("worker should finish");
        assert_eq!(result, Err("failed to load airports_poi.json: HTTP 404".to_owned()));
    }

    #[test]
    fn dropped_sender_reads_as_disconnected() {
        let (tx, rx) = mpsc::channel::<Result<u8, String>>();
        assert!(poll_load(&rx).is_none());
        drop(tx);
        assert!(matches!(poll_load(&rx), Some(Err(_))));
    }

    #[test]
    fn error_message_names_the_preprocess_command() {
        assert_eq!(
            load_error_message("HTTP 404", "Rscript scripts/preprocess_network.R"),
            "HTTP 404. Run: Rscript scripts/preprocess_network.R (see README for details)."
        );
    }
}
