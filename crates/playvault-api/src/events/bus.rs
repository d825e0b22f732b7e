// ── Topic-keyed publish/subscribe with weak replay ──
//
// Handlers are type-tagged closures kept in registration order per topic.
// Each topic also remembers its last payload through a `Weak`, so a late
// subscriber can be handed the most recent value while somebody else
// still owns it -- the bus itself never keeps a payload alive.

use std::any::{Any, TypeId, type_name};
use std::collections::HashMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, LazyLock, Mutex, MutexGuard, PoisonError, Weak};

use tracing::{debug, trace, warn};

type ErasedPayload = dyn Any + Send + Sync;
type ErasedCallback = Arc<dyn Fn(&ErasedPayload) + Send + Sync>;

static NEXT_HANDLER_ID: AtomicU64 = AtomicU64::new(1);

/// Payload of topics that carry no data (see [`EventBus::publish_signal`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NoData;

// Process-wide sentinel: always reachable, so signals always replay.
static NO_DATA: LazyLock<Arc<NoData>> = LazyLock::new(|| Arc::new(NoData));

/// A typed event callback.
///
/// Clones share identity: unsubscribing any clone removes the
/// registration made with any other clone.
pub struct Handler<T> {
    id: u64,
    callback: Arc<dyn Fn(&T) + Send + Sync>,
}

impl<T> Handler<T> {
    pub fn new(callback: impl Fn(&T) + Send + Sync + 'static) -> Self {
        Self {
            id: NEXT_HANDLER_ID.fetch_add(1, Ordering::Relaxed),
            callback: Arc::new(callback),
        }
    }

    /// Invoke the callback directly, outside any bus.
    pub fn call(&self, value: &T) {
        (self.callback)(value);
    }
}

impl<T> Clone for Handler<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            callback: Arc::clone(&self.callback),
        }
    }
}

impl<T> fmt::Debug for Handler<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler")
            .field("id", &self.id)
            .field("type", &type_name::<T>())
            .finish()
    }
}

/// One handler registration, with its type erased behind a tag.
#[derive(Clone)]
struct Registration {
    handler_id: u64,
    type_id: TypeId,
    type_name: &'static str,
    invoke: ErasedCallback,
}

impl Registration {
    fn new<T: Any + Send + Sync>(handler: &Handler<T>) -> Self {
        let callback = Arc::clone(&handler.callback);
        Self {
            handler_id: handler.id,
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            invoke: Arc::new(move |payload: &ErasedPayload| {
                if let Some(value) = payload.downcast_ref::<T>() {
                    callback(value);
                }
            }),
        }
    }
}

/// Last payload published on a topic.
struct CachedPayload {
    value: Weak<ErasedPayload>,
    type_id: TypeId,
}

#[derive(Default)]
struct BusState {
    handlers: HashMap<String, Vec<Registration>>,
    payloads: HashMap<String, CachedPayload>,
}

/// Typed publish/subscribe bus with per-topic replay of the last value.
///
/// All map mutations go through one mutex. Handlers run synchronously on
/// the publishing thread, after the lock is released, against a snapshot
/// of the registrations taken atomically with the payload update. A
/// handler may therefore call back into the bus without deadlocking; a
/// registration it adds sees the new value through replay rather than
/// through the in-progress dispatch.
#[derive(Default)]
pub struct EventBus {
    state: Mutex<BusState>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    // A panicking handler never runs under the lock, but recover anyway.
    fn lock(&self) -> MutexGuard<'_, BusState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ── Subscription ─────────────────────────────────────────────────

    /// Register `handler` under `topic`.
    ///
    /// If a payload of type `T` was published on `topic` and is still
    /// alive, the handler is invoked with it before this returns. A cached
    /// payload of another type is skipped silently.
    pub fn subscribe<T: Any + Send + Sync>(&self, topic: &str, handler: &Handler<T>) {
        if topic.is_empty() {
            warn!(handler = ?handler, "ignoring subscription to an empty topic");
            return;
        }

        let replay = {
            let mut state = self.lock();
            state
                .handlers
                .entry(topic.to_owned())
                .or_default()
                .push(Registration::new(handler));
            state
                .payloads
                .get(topic)
                .filter(|cached| cached.type_id == TypeId::of::<T>())
                .and_then(|cached| cached.value.upgrade())
        };

        trace!(topic, replay = replay.is_some(), "subscribed");

        if let Some(payload) = replay {
            let registration = Registration::new(handler);
            dispatch(topic, &registration, &*payload);
        }
    }

    /// Register a closure and return the handler needed to unsubscribe it.
    pub fn on<T: Any + Send + Sync>(
        &self,
        topic: &str,
        callback: impl Fn(&T) + Send + Sync + 'static,
    ) -> Handler<T> {
        let handler = Handler::new(callback);
        self.subscribe(topic, &handler);
        handler
    }

    /// Remove one registration of `handler` from `topic`.
    ///
    /// Unknown handlers are ignored. A topic left without handlers is
    /// dropped from the handler map; its cached payload stays.
    pub fn unsubscribe<T: Any + Send + Sync>(&self, topic: &str, handler: &Handler<T>) {
        let mut state = self.lock();
        let Some(registrations) = state.handlers.get_mut(topic) else {
            return;
        };

        if let Some(pos) = registrations
            .iter()
            .position(|r| r.handler_id == handler.id)
        {
            registrations.remove(pos);
            trace!(topic, "unsubscribed");
        }

        if registrations.is_empty() {
            state.handlers.remove(topic);
        }
    }

    // ── Publishing ───────────────────────────────────────────────────

    /// Cache `value` weakly as the last payload of `topic` and invoke every
    /// handler registered right now, in registration order.
    ///
    /// Handlers registered for a different type are skipped with a warning.
    /// A panicking handler is logged and the remaining handlers still run.
    /// An empty topic is ignored.
    pub fn publish<T: Any + Send + Sync>(&self, topic: &str, value: &Arc<T>) {
        if topic.is_empty() {
            warn!(published = type_name::<T>(), "ignoring publish to an empty topic");
            return;
        }

        let erased: Arc<ErasedPayload> = Arc::<T>::clone(value);

        let targets = {
            let mut state = self.lock();
            state.payloads.insert(
                topic.to_owned(),
                CachedPayload {
                    value: Arc::downgrade(&erased),
                    type_id: TypeId::of::<T>(),
                },
            );
            state.handlers.get(topic).cloned().unwrap_or_default()
        };

        debug!(topic, handlers = targets.len(), "publishing event");

        for registration in &targets {
            if registration.type_id != TypeId::of::<T>() {
                warn!(
                    topic,
                    expected = registration.type_name,
                    published = type_name::<T>(),
                    "skipping handler registered for a different payload type"
                );
                continue;
            }
            dispatch(topic, registration, &*erased);
        }
    }

    /// Publish the [`NoData`] sentinel on `topic`.
    pub fn publish_signal(&self, topic: &str) {
        self.publish(topic, &NO_DATA);
    }

    // ── Introspection ────────────────────────────────────────────────

    pub fn has_subscribers(&self, topic: &str) -> bool {
        self.subscriber_count(topic) > 0
    }

    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.lock().handlers.get(topic).map_or(0, Vec::len)
    }

    /// Whether `topic` has a cached payload that is still alive.
    pub fn has_cached(&self, topic: &str) -> bool {
        self.lock()
            .payloads
            .get(topic)
            .is_some_and(|cached| cached.value.strong_count() > 0)
    }

    // ── Reset ────────────────────────────────────────────────────────

    /// Drop handlers and cached payload for one topic.
    pub fn clear_topic(&self, topic: &str) {
        let mut state = self.lock();
        state.handlers.remove(topic);
        state.payloads.remove(topic);
    }

    /// Drop every handler and cached payload.
    pub fn clear_all(&self) {
        let mut state = self.lock();
        state.handlers.clear();
        state.payloads.clear();
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock();
        f.debug_struct("EventBus")
            .field("topics", &state.handlers.len())
            .field("cached", &state.payloads.len())
            .finish()
    }
}

/// Run one handler, containing any panic it raises.
fn dispatch(topic: &str, registration: &Registration, payload: &ErasedPayload) {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| (registration.invoke)(payload)));
    if let Err(cause) = outcome {
        let reason = cause
            .downcast_ref::<&str>()
            .map(|s| (*s).to_owned())
            .or_else(|| cause.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".into());
        warn!(
            topic,
            handler = registration.type_name,
            %reason,
            "event handler panicked"
        );
    }
}
