//! Progress reporting while a body is streamed out

use futures::stream::Stream;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

/// Callback receiving the fraction (0.0 to 1.0) of a body sent so far
pub type FractionCallback = Arc<dyn Fn(f64) + Send + Sync>;

/// Wraps a stream of byte chunks and reports how much of it has been consumed
///
/// The fraction is computed against `total_bytes`, which should be the full
/// body length. A zero total reports 1.0 on the first chunk.
pub struct ProgressStream<S> {
    inner: S,
    on_progress: FractionCallback,
    bytes_sent: usize,
    total_bytes: usize,
    chunk_count: usize,
}

impl<S> ProgressStream<S> {
    pub fn new(inner: S, total_bytes: usize, on_progress: FractionCallback) -> Self {
        Self {
            inner,
            on_progress,
            bytes_sent: 0,
            total_bytes,
            chunk_count: 0,
        }
    }

    /// Fraction of the body consumed so far
    pub fn fraction(&self) -> f64 {
        if self.total_bytes == 0 {
            return 1.0;
        }
        (self.bytes_sent as f64 / self.total_bytes as f64).min(1.0)
    }

    pub fn bytes_sent(&self) -> usize {
        self.bytes_sent
    }

    pub fn chunk_count(&self) -> usize {
        self.chunk_count
    }
}

impl<S, B, E> Stream for ProgressStream<S>
where
    S: Stream<Item = Result<B, E>> + Unpin,
    B: AsRef<[u8]>,
{
    type Item = Result<B, E>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        match Pin::new(&mut self.inner).poll_next(cx) {
            Poll::Ready(Some(Ok(chunk))) => {
                let len = chunk.as_ref().len();
                if len > 0 {
                    self.bytes_sent += len;
                    self.chunk_count += 1;
                    let fraction = self.fraction();
                    (self.on_progress)(fraction);
                }
                Poll::Ready(Some(Ok(chunk)))
            }
            other => other,
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}
