use crate::FetchError;
use log::*;
use std::path::PathBuf;
use std::sync::mpsc;

/// Transfers the raw bytes behind a URL.
pub trait Fetch: Sync {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

impl<F> Fetch for F
where
    F: Fn(&str) -> Result<Vec<u8>, FetchError> + Sync,
{
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        self(url)
    }
}

/// Fetches URLs as paths on the local file system, optionally below a base directory.
#[derive(Debug, Clone, Default)]
pub struct FileFetcher {
    base: Option<PathBuf>,
}

impl FileFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base(base: impl Into<PathBuf>) -> Self {
        Self {
            base: Some(base.into()),
        }
    }
}

impl Fetch for FileFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let path = match &self.base {
            Some(base) => base.join(url),
            None => PathBuf::from(url),
        };
        std::fs::read(&path).map_err(|e| FetchError::from_io(url, e))
    }
}

/// Counts of a finished batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchSummary {
    pub requested: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl BatchSummary {
    fn record<T>(&mut self, result: &Result<T, FetchError>) {
        if result.is_ok() {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
    }
}

/// Runs batches of transfers with a bounded number in flight.
///
/// Whatever the concurrency, the per-item callback and the batch callback run on the thread that
/// called [`DownloadQueue::run`]. With a concurrency of one the items are transferred one after the
/// other in request order, so completion order equals request order.
pub struct DownloadQueue<F> {
    fetcher: F,
    concurrency: usize,
}

impl<F> DownloadQueue<F>
where
    F: Fetch,
{
    /// A concurrency of zero is treated as one.
    pub fn new(fetcher: F, concurrency: usize) -> Self {
        Self {
            fetcher,
            concurrency: concurrency.max(1),
        }
    }

    pub fn sequential(fetcher: F) -> Self {
        Self::new(fetcher, 1)
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Transfers every `(tag, url)` item.
    ///
    /// `per_item` is called exactly once per item with its tag and transfer result, in completion
    /// order. A failed transfer does not stop the batch. `on_batch_done` is called exactly once
    /// after the last item, including for an empty batch.
    pub fn run<T, I, P, D>(&self, items: I, mut per_item: P, on_batch_done: D) -> BatchSummary
    where
        T: Send,
        I: IntoIterator<Item = (T, String)>,
        P: FnMut(T, Result<Vec<u8>, FetchError>),
        D: FnOnce(BatchSummary),
    {
        let items: Vec<(T, String)> = items.into_iter().collect();
        let mut summary = BatchSummary {
            requested: items.len(),
            ..Default::default()
        };

        let pool = if self.concurrency > 1 && items.len() > 1 {
            match rayon::ThreadPoolBuilder::new()
                .num_threads(self.concurrency)
                .build()
            {
                Ok(pool) => Some(pool),
                Err(e) => {
                    warn!("unable to start transfer threads, transferring sequentially: {}", e);
                    None
                }
            }
        } else {
            None
        };

        match pool {
            Some(pool) => {
                let fetcher = &self.fetcher;
                pool.in_place_scope(|scope| {
                    let (sender, receiver) = mpsc::channel();
                    for (tag, url) in items {
                        let sender = sender.clone();
                        scope.spawn(move |_| {
                            let result = fetcher.fetch(&url);
                            // The receiver outlives the scope, so this cannot fail.
                            let _ = sender.send((tag, result));
                        });
                    }
                    drop(sender);
                    for (tag, result) in receiver {
                        summary.record(&result);
                        per_item(tag, result);
                    }
                });
            }
            None => {
                for (tag, url) in items {
                    trace!("fetching {}", url);
                    let result = self.fetcher.fetch(&url);
                    summary.record(&result);
                    per_item(tag, result);
                }
            }
        }

        on_batch_done(summary);
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn echo(url: &str) -> Result<Vec<u8>, FetchError> {
        match url {
            "missing" => Err(FetchError::NotFound {
                url: url.to_string(),
            }),
            _ => Ok(url.as_bytes().to_vec()),
        }
    }

    #[test]
    fn sequential_keeps_request_order() {
        let queue = DownloadQueue::sequential(echo);
        let mut seen = vec![];
        let done = Cell::new(0);
        let summary = queue.run(
            (0..4).map(|i| (i, if i == 2 { "missing".to_string() } else { format!("{}", i) })),
            |tag, result| seen.push((tag, result.is_ok())),
            |_| done.set(done.get() + 1),
        );
        assert_eq!(seen, vec![(0, true), (1, true), (2, false), (3, true)]);
        assert_eq!(done.get(), 1);
        assert_eq!(
            summary,
            BatchSummary {
                requested: 4,
                succeeded: 3,
                failed: 1
            }
        );
    }

    #[test]
    fn concurrent_delivers_every_item_once() {
        let queue = DownloadQueue::new(echo, 4);
        let mut seen = vec![];
        let mut batches = 0;
        queue.run(
            (0..32).map(|i| (i, format!("{}", i))),
            |tag, result| {
                assert_eq!(result.unwrap(), format!("{}", tag).into_bytes());
                seen.push(tag);
            },
            |summary| {
                assert_eq!(summary.succeeded, 32);
                batches += 1;
            },
        );
        seen.sort_unstable();
        assert_eq!(seen, (0..32).collect::<Vec<_>>());
        assert_eq!(batches, 1);
    }

    #[test]
    fn empty_batch_still_completes() {
        let queue = DownloadQueue::new(echo, 0);
        assert_eq!(queue.concurrency(), 1);
        let mut done = false;
        let summary = queue.run(
            Vec::<(usize, String)>::new(),
            |_, _| unreachable!(),
            |_| done = true,
        );
        assert!(done);
        assert_eq!(summary, BatchSummary::default());
    }

    #[test]
    fn missing_file_is_not_found() {
        let fetcher = FileFetcher::with_base(std::env::temp_dir());
        assert!(matches!(
            fetcher.fetch("pano-visibility-no-such-file.bin"),
            Err(FetchError::NotFound { .. })
        ));
    }
}
