//! Async runtime for the command line entry point

use std::future::Future;
use std::io;

/// Drive `task` to completion unless `interrupt` resolves first.
///
/// Returns `None` when interrupted. The runtime is shut down without
/// waiting on blocking tasks, so a pending stdin read cannot keep the
/// process alive.
pub fn run_until_interrupted<F, I>(task: F, interrupt: I) -> io::Result<Option<F::Output>>
where
    F: Future,
    I: Future,
{
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    let outcome = runtime.block_on(async {
        tokio::select! {
            output = task => Some(output),
            _ = interrupt => None,
        }
    });

    runtime.shutdown_background();
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::time::{Duration, Instant};

    #[test]
    fn test_completes_without_interrupt() {
        let outcome = run_until_interrupted(async { 7 }, std::future::pending::<()>()).unwrap();
        assert_eq!(outcome, Some(7));
    }

    #[test]
    fn test_interrupt_does_not_wait_for_blocking_read() {
        // Sender stays alive, so the blocking recv never returns on its own
        let (_sender, receiver) = mpsc::channel::<String>();
        let started = Instant::now();

        let outcome = run_until_interrupted(
            async move {
                tokio::task::spawn_blocking(move || receiver.recv()).await.ok();
            },
            async { tokio::time::sleep(Duration::from_millis(50)).await },
        )
        .unwrap();

        assert!(outcome.is_none());
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
