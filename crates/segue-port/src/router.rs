//! Controller dedup and fan-out to destination routes.
//!
//! ```text
//! config thread                        processing thread
//!     │                                      │
//!     ▼                                      ▼
//! ┌────────────┐                     ┌────────────────────┐
//! │ RouteTable │──ArcSwap<Vec<Route>>▶│ Router::route_event│
//! │ add/remove │                     │ (load, match)      │
//! └────────────┘                     └────────────────────┘
//! ```

use arc_swap::ArcSwap;
use segue_midi::{ControllerStates, Expanded, MidiEvent, ProtocolEncoder};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Receives wire-level events (hardware device queue, audio-graph MIDI port).
pub trait MidiSink: Send + Sync {
    /// Must not block the caller.
    fn put_event(&self, event: MidiEvent);
}

/// In-process synth that understands logical controller events.
pub trait SynthSink: Send + Sync {
    fn insert_event(&self, event: &MidiEvent);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteKind {
    Hardware,
    Synth,
    Graph,
}

/// One destination of an output port. Sinks are referenced, not owned.
#[derive(Clone)]
pub enum Route {
    Hardware(Arc<dyn MidiSink>),
    Synth(Arc<dyn SynthSink>),
    Graph(Arc<dyn MidiSink>),
}

impl Route {
    pub fn kind(&self) -> RouteKind {
        match self {
            Route::Hardware(_) => RouteKind::Hardware,
            Route::Synth(_) => RouteKind::Synth,
            Route::Graph(_) => RouteKind::Graph,
        }
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Route::{:?}", self.kind())
    }
}

/// Ordered route list, swapped atomically so the processing thread never
/// waits on configuration changes.
#[derive(Debug)]
pub struct RouteTable {
    routes: ArcSwap<Vec<Route>>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self {
            routes: ArcSwap::from_pointee(Vec::new()),
        }
    }

    pub fn add(&self, route: Route) {
        self.routes.rcu(|routes| {
            let mut next = Vec::clone(routes);
            next.push(route.clone());
            next
        });
    }

    pub fn set(&self, routes: Vec<Route>) {
        self.routes.store(Arc::new(routes));
    }

    /// Remove the route at `index` (registration order).
    pub fn remove(&self, index: usize) -> bool {
        let mut removed = false;
        self.routes.rcu(|routes| {
            let mut next = Vec::clone(routes);
            removed = index < next.len();
            if removed {
                next.remove(index);
            }
            next
        });
        removed
    }

    pub fn clear(&self) {
        self.set(Vec::new());
    }

    pub fn snapshot(&self) -> Arc<Vec<Route>> {
        self.routes.load_full()
    }

    pub fn len(&self) -> usize {
        self.routes.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.load().is_empty()
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies controller dedup, then delivers to every route in order.
pub struct Router {
    encoder: ProtocolEncoder,
    routes: Arc<RouteTable>,
    scratch: Expanded,
}

impl Router {
    pub fn new(encoder: ProtocolEncoder, routes: Arc<RouteTable>) -> Self {
        Self {
            encoder,
            routes,
            scratch: Expanded::new(),
        }
    }

    pub fn encoder(&self) -> &ProtocolEncoder {
        &self.encoder
    }

    pub fn set_device_id(&mut self, device_id: u8) {
        self.encoder.set_device_id(device_id);
    }

    pub fn routes(&self) -> &Arc<RouteTable> {
        &self.routes
    }

    /// Route one event. Returns `false` if it was suppressed or dropped.
    ///
    /// A controller event whose value the addressed store already holds is
    /// not sent; the store is written only when a send goes ahead.
    pub fn route_event(&mut self, event: &MidiEvent, states: &mut ControllerStates) -> bool {
        if let Some((id, value)) = event.controller_value() {
            let Some(state) = states.resolve_mut(event.channel) else {
                warn!(channel = ?event.channel, "controller event for unknown channel, dropped");
                return false;
            };
            if !state.update(id, value) {
                debug!(%id, value, channel = ?event.channel, "controller unchanged, send suppressed");
                return false;
            }
        }

        let routes = self.routes.routes.load();
        for route in routes.iter() {
            match route {
                Route::Hardware(sink) | Route::Graph(sink) => {
                    encode_into(&self.encoder, &mut self.scratch, event, sink.as_ref());
                }
                Route::Synth(synth) => synth.insert_event(event),
            }
        }
        true
    }
}

fn encode_into(encoder: &ProtocolEncoder, scratch: &mut Expanded, event: &MidiEvent, sink: &dyn MidiSink) {
    scratch.clear();
    match encoder.encode(event, scratch) {
        Ok(()) => {
            for wire in scratch.drain(..) {
                sink.put_event(wire);
            }
        }
        Err(e) => warn!(channel = ?event.channel, "{}, event dropped", e),
    }
}
