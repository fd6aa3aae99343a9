use crate::error::FilestoreError;
use std::future::Future;

/// Run an async operation in a synchronous context.
///
/// Uses the current Tokio runtime when available, otherwise creates a
/// lightweight current-thread runtime. Any error type that can absorb a
/// [`FilestoreError`] works, so higher layers reuse this for their own `*_sync` APIs.
pub fn run_blocking<F, Fut, T, E>(make_future: F) -> Result<T, E>
where
    F: FnOnce() -> Fut + Send,
    Fut: Future<Output = Result<T, E>> + Send,
    T: Send,
    E: From<FilestoreError> + Send,
{
    if let Ok(handle) = tokio::runtime::Handle::try_current() {
        std::thread::scope(|s| {
            s.spawn(|| handle.block_on(make_future()))
                .join()
                .map_err(|_| E::from(FilestoreError::Other("Thread panicked".into())))?
        })
    } else {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| E::from(FilestoreError::Other(format!("Failed to create runtime: {e}"))))?;

        rt.block_on(make_future())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;

    #[test]
    fn test_without_runtime() {
        let value: Result<i32> = run_blocking(|| async { Ok(41 + 1) });
        let value = value.unwrap();
        assert_eq!(value, 42);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_inside_runtime() {
        let value: Result<&str> = run_blocking(|| async {
            tokio::task::yield_now().await;
            Ok("done")
        });
        let value = value.unwrap();
        assert_eq!(value, "done");
    }

    #[test]
    fn test_error_propagates() {
        let result: Result<()> = run_blocking(|| async { Err(FilestoreError::Other("boom".into())) });
        assert!(matches!(result, Err(FilestoreError::Other(_))));
    }
}
