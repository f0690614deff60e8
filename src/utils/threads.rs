use std::future::Future;
use std::pin::Pin;

use futures::stream::{self, StreamExt};

/// 以受限并发执行一组异步任务，返回所有任务的结果
///
/// 并发上限为max_parallels，超出的任务排队等待空闲槽位。
pub async fn do_parallel_with_limit<T>(
    futures: Vec<Pin<Box<dyn Future<Output = T> + Send>>>,
    max_parallels: usize,
) -> Vec<T>
where
    T: Send + 'static,
{
    stream::iter(futures)
        .buffer_unordered(max_parallels.max(1))
        .collect()
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_all_futures_complete() {
        let futures: Vec<Pin<Box<dyn Future<Output = usize> + Send>>> = (0..10usize)
            .map(|i| Box::pin(async move { i * 2 }) as Pin<Box<dyn Future<Output = usize> + Send>>)
            .collect();

        let mut results = do_parallel_with_limit(futures, 3).await;
        results.sort_unstable();
        assert_eq!(results, vec![0, 2, 4, 6, 8, 10, 12, 14, 16, 18]);
    }

    #[tokio::test]
    async fn test_concurrency_never_exceeds_limit() {
        let active = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let futures: Vec<Pin<Box<dyn Future<Output = ()> + Send>>> = (0..16)
            .map(|_| {
                let active = active.clone();
                let peak = peak.clone();
                Box::pin(async move {
                    let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
                    active.fetch_sub(1, Ordering::SeqCst);
                }) as Pin<Box<dyn Future<Output = ()> + Send>>
            })
            .collect();

        do_parallel_with_limit(futures, 4).await;
        assert!(peak.load(Ordering::SeqCst) <= 4);
    }

    #[tokio::test]
    async fn test_zero_limit_is_clamped() {
        let futures: Vec<Pin<Box<dyn Future<Output = u8> + Send>>> =
            vec![Box::pin(async { 7u8 }) as Pin<Box<dyn Future<Output = u8> + Send>>];
        let results = do_parallel_with_limit(futures, 0).await;
        assert_eq!(results, vec![7]);
    }
}
