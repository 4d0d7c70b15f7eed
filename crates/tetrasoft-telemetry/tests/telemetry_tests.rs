//! Integration tests for tetrasoft-telemetry.

use tetrasoft_telemetry::bus::EventBus;
use tetrasoft_telemetry::events::{EventKind, SimulationEvent};
use tetrasoft_telemetry::sinks::{EventSink, TracingSink, VecSink};

fn frame_begin() -> EventKind {
    EventKind::FrameBegin { dt: 1.0 / 60.0, substeps: 10 }
}

// ─── Bus ──────────────────────────────────────────────────────

#[test]
fn flush_delivers_in_recording_order() {
    let sink = VecSink::new();
    let mut bus = EventBus::new().with_sink(sink.clone());

    bus.record(0, frame_begin());
    bus.record(
        0,
        EventKind::FrameEnd {
            wall_time: 0.001,
            floor_contacts: 3,
            kinetic_energy: 0.5,
        },
    );
    assert!(sink.is_empty(), "events delivered before flush");
    assert_eq!(bus.pending(), 2);

    assert_eq!(bus.flush(), 2);
    assert_eq!(bus.pending(), 0);
    let events = sink.events();
    assert_eq!(events.len(), 2);
    assert!(matches!(events[0].kind, EventKind::FrameBegin { .. }));
    assert!(matches!(events[1].kind, EventKind::FrameEnd { floor_contacts: 3, .. }));
}

#[test]
fn flush_without_sinks_discards_queue() {
    let mut bus = EventBus::new();
    bus.record(4, frame_begin());
    assert_eq!(bus.flush(), 1);
    assert_eq!(bus.pending(), 0);
    assert_eq!(bus.flush(), 0);
}

#[test]
fn every_sink_sees_every_event() {
    let a = VecSink::new();
    let b = VecSink::new();
    let mut bus = EventBus::new().with_sink(a.clone()).with_sink(b.clone());

    for frame in 0..3 {
        bus.record(frame, frame_begin());
    }
    bus.finalize();
    assert_eq!(a.len(), 3);
    assert_eq!(a.events(), b.events());
    assert_eq!(a.events()[2].frame, 2);
}

#[test]
fn finalize_reaches_sinks() {
    struct Closing(std::sync::Arc<std::sync::atomic::AtomicBool>);
    impl EventSink for Closing {
        fn handle(&mut self, _event: &SimulationEvent) {}
        fn finalize(&mut self) {
            self.0.store(true, std::sync::atomic::Ordering::SeqCst);
        }
        fn name(&self) -> &str {
            "closing"
        }
    }

    let closed = std::sync::Arc::new(std::sync::atomic::AtomicBool::new(false));
    let mut bus = EventBus::new().with_sink(Closing(closed.clone()));
    bus.finalize();
    assert!(closed.load(std::sync::atomic::Ordering::SeqCst));
}

#[test]
fn tracing_sink_accepts_all_levels() {
    use tracing::Level;
    for level in [Level::ERROR, Level::WARN, Level::INFO, Level::DEBUG, Level::TRACE] {
        let mut sink = TracingSink::new(level);
        sink.handle(&SimulationEvent::new(1, frame_begin()));
        assert_eq!(sink.name(), "tracing_sink");
    }
}

// ─── Events ───────────────────────────────────────────────────

#[test]
fn event_serialization() {
    let event = SimulationEvent::new(
        0,
        EventKind::BodyLoaded {
            name: "Bunny".into(),
            vertices: 120,
            edges: 600,
            tetrahedra: 350,
        },
    );
    let json = serde_json::to_string(&event).unwrap();
    let recovered: SimulationEvent = serde_json::from_str(&json).unwrap();
    assert_eq!(recovered, event);
}

#[test]
fn skinning_event_fields() {
    let event = SimulationEvent::new(
        0,
        EventKind::SkinningComplete {
            visual_vertices: 1000,
            contained: 990,
            fallback: 10,
            degenerate_tetrahedra: 0,
        },
    );
    match event.kind {
        EventKind::SkinningComplete { contained, fallback, .. } => {
            assert_eq!(contained + fallback, 1000);
        }
        _ => panic!("Wrong event kind"),
    }
}
