//! Helpers shared by unit tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

/// Counts WARN events seen while installed.
struct WarnCounter(Arc<AtomicUsize>);

impl<S: Subscriber> Layer<S> for WarnCounter {
  fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
    if *event.metadata().level() == Level::WARN {
      self.0.fetch_add(1, Ordering::SeqCst);
    }
  }
}

/// Runs `f` with a subscriber that counts WARN events; `f` receives the
/// current count on demand.
pub(crate) fn with_warn_counter<R>(f: impl FnOnce(&dyn Fn() -> usize) -> R) -> R {
  let warnings = Arc::new(AtomicUsize::new(0));
  let subscriber = tracing_subscriber::registry().with(WarnCounter(Arc::clone(&warnings)));
  tracing::subscriber::with_default(subscriber, || {
    let count = || warnings.load(Ordering::SeqCst);
    f(&count)
  })
}
