//! Lazily connected, shared PDF generator.

use std::fmt;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::engine::{HttpRenderEngine, RenderEngine};
use crate::error::PdfError;
use crate::options::PdfOptions;

type Connect = dyn Fn() -> Result<Arc<dyn RenderEngine>, PdfError> + Send + Sync;

/// Owner of the process-wide render engine.
///
/// The engine is opened on first use and shared by all concurrent callers.
/// [`close`](Self::close) releases it; it may be called any number of times,
/// and a render after it opens a fresh engine.
///
/// # Example
///
/// ```no_run
/// use std::time::Duration;
///
/// use studydoc_pdf::{PdfGenerator, PdfOptions, PrintLayout};
///
/// let generator = PdfGenerator::http("http://localhost:3000", Duration::from_secs(30));
/// let layout = PrintLayout::new("PIA");
/// let options = layout.apply_to(PdfOptions::default());
///
/// let pdf = generator.render(&layout.page("<p>Hello</p>"), &options)?;
/// generator.close();
/// # Ok::<(), studydoc_pdf::PdfError>(())
/// ```
pub struct PdfGenerator {
    shared: Arc<Shared>,
}

struct Shared {
    connect: Box<Connect>,
    /// Serializes connects. Never taken while holding `engine`.
    connecting: Mutex<()>,
    engine: Mutex<Option<Arc<dyn RenderEngine>>>,
}

impl Shared {
    fn current(&self) -> Option<Arc<dyn RenderEngine>> {
        self.engine
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn acquire(&self) -> Result<Arc<dyn RenderEngine>, PdfError> {
        if let Some(engine) = self.current() {
            return Ok(engine);
        }

        let _connecting = self.connecting.lock().unwrap_or_else(PoisonError::into_inner);
        // Another caller may have connected while we waited
        if let Some(engine) = self.current() {
            return Ok(engine);
        }

        let started = Instant::now();
        let engine = (self.connect)()?;
        info!(elapsed_ms = started.elapsed().as_millis(), "render engine connected");
        *self.engine.lock().unwrap_or_else(PoisonError::into_inner) = Some(Arc::clone(&engine));
        Ok(engine)
    }
}

impl PdfGenerator {
    /// Create a generator that opens engines with `connect`.
    pub fn new<F>(connect: F) -> Self
    where
        F: Fn() -> Result<Arc<dyn RenderEngine>, PdfError> + Send + Sync + 'static,
    {
        Self {
            shared: Arc::new(Shared {
                connect: Box::new(connect),
                connecting: Mutex::new(()),
                engine: Mutex::new(None),
            }),
        }
    }

    /// Create a generator backed by an HTTP conversion service.
    #[must_use]
    pub fn http(base_url: &str, timeout: Duration) -> Self {
        let base_url = base_url.to_owned();
        Self::new(move || {
            let engine: Arc<dyn RenderEngine> = Arc::new(HttpRenderEngine::new(&base_url, timeout));
            Ok(engine)
        })
    }

    /// Return the shared engine, opening it if none is open.
    ///
    /// Unlike [`render`](Self::render) this waits for the connect function
    /// without a deadline.
    ///
    /// # Errors
    ///
    /// Returns the error of the connect function.
    pub fn acquire(&self) -> Result<Arc<dyn RenderEngine>, PdfError> {
        self.shared.acquire()
    }

    /// Whether an engine is currently open.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.shared.current().is_some()
    }

    /// Print `html` with the shared engine.
    ///
    /// Opening the engine and printing share one deadline of
    /// `options.timeout`. On timeout the worker thread is abandoned and its
    /// result discarded.
    ///
    /// # Errors
    ///
    /// Returns [`PdfError::Timeout`] when the engine does not connect and
    /// render in time, or the connect or engine error.
    pub fn render(&self, html: &str, options: &PdfOptions) -> Result<Vec<u8>, PdfError> {
        let timeout = options.timeout;
        let (tx, rx) = mpsc::channel();

        let shared = Arc::clone(&self.shared);
        let html = html.to_owned();
        let worker_options = options.clone();
        let started = Instant::now();
        thread::Builder::new()
            .name("pdf-render".to_owned())
            .spawn(move || {
                let result = shared
                    .acquire()
                    .and_then(|engine| engine.render(&html, &worker_options));
                // The receiver is gone once the caller timed out.
                let _ = tx.send(result);
            })?;

        match rx.recv_timeout(timeout) {
            Ok(result) => {
                if let Ok(pdf) = &result {
                    info!(
                        elapsed_ms = started.elapsed().as_millis(),
                        pdf_bytes = pdf.len(),
                        "rendered PDF"
                    );
                }
                result
            }
            Err(RecvTimeoutError::Timeout) => {
                warn!(?timeout, "PDF render timed out");
                Err(PdfError::Timeout(timeout))
            }
            Err(RecvTimeoutError::Disconnected) => Err(PdfError::Engine(
                "render worker stopped without a result".to_owned(),
            )),
        }
    }

    /// Release the engine. Does nothing when none is open.
    ///
    /// Does not wait for a connect in progress.
    pub fn close(&self) {
        let engine = self
            .shared
            .engine
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(engine) = engine {
            engine.close();
            info!("render engine closed");
        }
    }
}

impl fmt::Debug for PdfGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PdfGenerator")
            .field("connected", &self.is_connected())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use super::*;
    use pretty_assertions::assert_eq;

    static_assertions::assert_impl_all!(PdfGenerator: Send, Sync);

    /// Returns the HTML it was given, optionally after a delay.
    #[derive(Default)]
    struct EchoEngine {
        delay: Duration,
        closed: AtomicBool,
    }

    impl RenderEngine for EchoEngine {
        fn render(&self, html: &str, _options: &PdfOptions) -> Result<Vec<u8>, PdfError> {
            if self.closed.load(Ordering::SeqCst) {
                return Err(PdfError::Closed);
            }
            thread::sleep(self.delay);
            Ok(html.as_bytes().to_vec())
        }

        fn close(&self) {
            self.closed.store(true, Ordering::SeqCst);
        }
    }

    fn counting(delay: Duration) -> (PdfGenerator, Arc<AtomicUsize>) {
        let connects = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&connects);
        let generator = PdfGenerator::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            let engine: Arc<dyn RenderEngine> = Arc::new(EchoEngine {
                delay,
                ..EchoEngine::default()
            });
            Ok(engine)
        });
        (generator, connects)
    }

    #[test]
    fn test_connects_lazily_and_once() {
        let (generator, connects) = counting(Duration::ZERO);
        assert!(!generator.is_connected());
        assert_eq!(connects.load(Ordering::SeqCst), 0);

        generator.render("a", &PdfOptions::default()).unwrap();
        generator.render("b", &PdfOptions::default()).unwrap();

        assert!(generator.is_connected());
        assert_eq!(connects.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_close_is_idempotent_and_reconnects() {
        let (generator, connects) = counting(Duration::ZERO);
        generator.close();

        let first = generator.acquire().unwrap();
        generator.close();
        generator.close();
        assert!(!generator.is_connected());
        assert!(matches!(
            first.render("x", &PdfOptions::default()),
            Err(PdfError::Closed)
        ));

        let pdf = generator.render("again", &PdfOptions::default()).unwrap();
        assert_eq!(pdf, b"again");
        assert_eq!(connects.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_timeout() {
        let (generator, _) = counting(Duration::from_millis(500));
        let options = PdfOptions::default().with_timeout(Duration::from_millis(20));

        let err = generator.render("slow", &options).unwrap_err();
        assert!(matches!(err, PdfError::Timeout(t) if t == Duration::from_millis(20)));
    }

    #[test]
    fn test_hanging_connect_is_bounded_by_timeout() {
        let generator = PdfGenerator::new(|| {
            thread::sleep(Duration::from_secs(5));
            Err(PdfError::Engine("never".to_owned()))
        });
        let options = PdfOptions::default().with_timeout(Duration::from_millis(20));

        let started = Instant::now();
        let first = generator.render("a", &options).unwrap_err();
        let second = generator.render("b", &options).unwrap_err();
        assert!(matches!(first, PdfError::Timeout(_)));
        assert!(matches!(second, PdfError::Timeout(_)));

        assert!(!generator.is_connected());
        generator.close();
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[test]
    fn test_connect_error_propagates() {
        let generator = PdfGenerator::new(|| Err(PdfError::Engine("no browser".to_owned())));
        let err = generator.render("x", &PdfOptions::default()).unwrap_err();
        assert!(matches!(err, PdfError::Engine(msg) if msg == "no browser"));
        assert!(!generator.is_connected());
    }

    #[test]
    fn test_concurrent_renders_keep_their_results() {
        let (generator, connects) = counting(Duration::from_millis(5));
        let generator = Arc::new(generator);

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let generator = Arc::clone(&generator);
                thread::spawn(move || {
                    let html = format!("<p>{i}</p>");
                    let pdf = generator.render(&html, &PdfOptions::default()).unwrap();
                    (html, pdf)
                })
            })
            .collect();

        for handle in handles {
            let (html, pdf) = handle.join().unwrap();
            assert_eq!(pdf, html.as_bytes());
        }
        assert_eq!(connects.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_debug_shows_connection_state() {
        let (generator, _) = counting(Duration::ZERO);
        assert_eq!(format!("{generator:?}"), "PdfGenerator { connected: false, .. }");
    }
}
