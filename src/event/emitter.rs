//! Keyed publish/subscribe registry.
//!
//! Handlers for a key run in registration order. [`EventEmitter::listeners`]
//! takes a snapshot, so handlers that add or remove listeners while running
//! only affect later emissions.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

/// A registered callback. Receives the context (usually the owning client)
/// and the event.
pub type Handler<C, E> = Arc<dyn Fn(&mut C, &E) -> anyhow::Result<()> + Send + Sync>;

/// Identifies one registration, for [`EventEmitter::remove_listener`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

/// Handler lists keyed by `K`.
pub struct EventEmitter<K, C: ?Sized, E: ?Sized> {
    handlers: HashMap<K, Vec<(ListenerId, Handler<C, E>)>>,
    next_id: u64,
}

impl<K, C: ?Sized, E: ?Sized> Default for EventEmitter<K, C, E> {
    fn default() -> Self {
        Self {
            handlers: HashMap::new(),
            next_id: 0,
        }
    }
}

impl<K: fmt::Debug, C: ?Sized, E: ?Sized> fmt::Debug for EventEmitter<K, C, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (key, list) in &self.handlers {
            map.entry(key, &list.len());
        }
        map.finish()
    }
}

impl<K: Eq + Hash, C: ?Sized, E: ?Sized> EventEmitter<K, C, E> {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `handler` to the list for `key`.
    ///
    /// No de-duplication is done; registering twice means running twice.
    pub fn add_listener<F>(&mut self, key: impl Into<K>, handler: F) -> ListenerId
    where
        F: Fn(&mut C, &E) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.add_handler(key, Arc::new(handler))
    }

    /// Append an already shared handler to the list for `key`.
    pub fn add_handler(&mut self, key: impl Into<K>, handler: Handler<C, E>) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.handlers
            .entry(key.into())
            .or_default()
            .push((id, handler));
        id
    }

    /// Remove the registration `id` from `key`.
    ///
    /// Returns `false` if it was not registered there.
    pub fn remove_listener(&mut self, key: &K, id: ListenerId) -> bool {
        let Some(list) = self.handlers.get_mut(key) else {
            return false;
        };
        let Some(pos) = list.iter().position(|(candidate, _)| *candidate == id) else {
            return false;
        };
        list.remove(pos);
        if list.is_empty() {
            self.handlers.remove(key);
        }
        true
    }

    /// Remove every handler for `key`, returning how many there were.
    pub fn remove_all_listeners(&mut self, key: &K) -> usize {
        self.handlers.remove(key).map_or(0, |list| list.len())
    }

    /// Number of handlers registered for `key`.
    pub fn listener_count(&self, key: &K) -> usize {
        self.handlers.get(key).map_or(0, Vec::len)
    }

    /// Whether no handler is registered at all.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Snapshot of the handlers currently registered for `key`.
    pub fn listeners(&self, key: &K) -> Listeners<C, E> {
        let handlers = self
            .handlers
            .get(key)
            .map(|list| list.iter().map(|(_, handler)| Arc::clone(handler)).collect())
            .unwrap_or_default();
        Listeners { handlers }
    }

    /// Run every handler for `key` with an external context.
    ///
    /// When the context owns this emitter, take [`listeners`](Self::listeners)
    /// first and call [`Listeners::emit`] instead.
    pub fn emit(&self, key: &K, ctx: &mut C, event: &E) -> anyhow::Result<()> {
        self.listeners(key).emit(ctx, event)
    }
}

/// Handlers captured by [`EventEmitter::listeners`].
pub struct Listeners<C: ?Sized, E: ?Sized> {
    handlers: Vec<Handler<C, E>>,
}

impl<C: ?Sized, E: ?Sized> Listeners<C, E> {
    /// Number of captured handlers.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Whether nothing was registered.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Invoke each handler in order. Stops at the first error.
    pub fn emit(self, ctx: &mut C, event: &E) -> anyhow::Result<()> {
        for handler in self.handlers {
            handler(&mut *ctx, event)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Log = Vec<String>;

    #[test]
    fn test_registration_order() {
        let mut emitter: EventEmitter<&str, Log, u32> = EventEmitter::new();
        emitter.add_listener("tick", |log: &mut Log, n: &u32| {
            log.push(format!("a{}", n));
            Ok(())
        });
        emitter.add_listener("tick", |log: &mut Log, n: &u32| {
            log.push(format!("b{}", n));
            Ok(())
        });

        let mut log = Log::new();
        emitter.emit(&"tick", &mut log, &1).unwrap();
        assert_eq!(log, ["a1", "b1"]);
    }

    #[test]
    fn test_duplicate_registration_runs_twice() {
        let mut emitter: EventEmitter<&str, Log, u32> = EventEmitter::new();
        let handler: Handler<Log, u32> = Arc::new(|log: &mut Log, _: &u32| {
            log.push("hit".into());
            Ok(())
        });
        emitter.add_handler("tick", Arc::clone(&handler));
        emitter.add_handler("tick", handler);

        let mut log = Log::new();
        emitter.emit(&"tick", &mut log, &0).unwrap();
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn test_remove_listener() {
        let mut emitter: EventEmitter<&str, Log, u32> = EventEmitter::new();
        let id = emitter.add_listener("tick", |_, _| Ok(()));
        assert_eq!(emitter.listener_count(&"tick"), 1);

        assert!(emitter.remove_listener(&"tick", id));
        assert!(!emitter.remove_listener(&"tick", id));
        assert!(!emitter.remove_listener(&"other", id));
        assert!(emitter.is_empty());
    }

    #[test]
    fn test_remove_all_listeners() {
        let mut emitter: EventEmitter<&str, Log, u32> = EventEmitter::new();
        emitter.add_listener("tick", |_, _| Ok(()));
        emitter.add_listener("tick", |_, _| Ok(()));
        assert_eq!(emitter.remove_all_listeners(&"tick"), 2);
        assert_eq!(emitter.remove_all_listeners(&"tick"), 0);
    }

    #[test]
    fn test_emit_unknown_key_is_noop() {
        let emitter: EventEmitter<&str, Log, u32> = EventEmitter::new();
        let mut log = Log::new();
        emitter.emit(&"nothing", &mut log, &0).unwrap();
        assert!(log.is_empty());
    }

    #[test]
    fn test_error_stops_emission() {
        let mut emitter: EventEmitter<&str, Log, u32> = EventEmitter::new();
        emitter.add_listener("tick", |_, _| Err(anyhow::anyhow!("broken handler")));
        emitter.add_listener("tick", |log: &mut Log, _: &u32| {
            log.push("unreachable".into());
            Ok(())
        });

        let mut log = Log::new();
        let err = emitter.emit(&"tick", &mut log, &0).unwrap_err();
        assert_eq!(err.to_string(), "broken handler");
        assert!(log.is_empty());
    }

    struct Host {
        emitter: EventEmitter<&'static str, Host, ()>,
        own_id: Option<ListenerId>,
        calls: usize,
    }

    #[test]
    fn test_self_removal_during_emit() {
        let mut host = Host {
            emitter: EventEmitter::new(),
            own_id: None,
            calls: 0,
        };
        let id = host.emitter.add_listener("once", |host: &mut Host, _: &()| {
            host.calls += 1;
            if let Some(id) = host.own_id.take() {
                assert!(host.emitter.remove_listener(&"once", id));
            }
            Ok(())
        });
        host.own_id = Some(id);

        host.emitter.listeners(&"once").emit(&mut host, &()).unwrap();
        assert_eq!(host.calls, 1);

        host.emitter.listeners(&"once").emit(&mut host, &()).unwrap();
        assert_eq!(host.calls, 1);
    }

    #[test]
    fn test_added_during_emit_not_run_in_same_pass() {
        let mut host = Host {
            emitter: EventEmitter::new(),
            own_id: None,
            calls: 0,
        };
        host.emitter.add_listener("grow", |host: &mut Host, _: &()| {
            host.calls += 1;
            host.emitter.add_listener("grow", |host: &mut Host, _: &()| {
                host.calls += 100;
                Ok(())
            });
            Ok(())
        });

        host.emitter.listeners(&"grow").emit(&mut host, &()).unwrap();
        assert_eq!(host.calls, 1);
        assert_eq!(host.emitter.listener_count(&"grow"), 2);
    }
}
