//! Integration tests for keytone-synth tracks, loops and fallback.
//!
//! Each track is built on a real context, rendered, stopped and rendered
//! through a tail long enough for in-flight notes to finish, then checked for
//! leaked oscillators and nodes.

use keytone_core::{AudioContext, ContextOptions, GraphError};
use keytone_synth::{
    FallbackHandle, Scheduler, SoundEffect, SynthError, TrackBody, TrackKind, TrackLibrary,
};

const SR: f32 = 48000.0;
const BLOCK: usize = 128;

fn context(max_nodes: usize) -> AudioContext {
    let mut ctx = AudioContext::new(ContextOptions {
        sample_rate: SR,
        max_nodes,
    });
    ctx.resume();
    ctx
}

/// Render `seconds`, polling the scheduler between blocks the way the engine
/// does.
fn run(ctx: &mut AudioContext, scheduler: &mut Scheduler, seconds: f32) -> Vec<f32> {
    let mut out = vec![0.0f32; (seconds * SR) as usize];
    for block in out.chunks_mut(BLOCK) {
        ctx.render(block);
        scheduler.poll(ctx);
    }
    out
}

fn peak(signal: &[f32]) -> f32 {
    signal.iter().fold(0.0f32, |m, &s| m.max(s.abs()))
}

// ============================================================================
// 1. Teardown coverage
// ============================================================================

#[test]
fn every_track_tears_down_completely() {
    for kind in TrackKind::ALL {
        let mut ctx = context(4096);
        let mut scheduler = Scheduler::new();

        let handle = kind.create(&mut ctx, &mut scheduler).unwrap();
        assert_eq!(handle.kind(), kind);
        assert!(ctx.live_oscillators() > 0, "{kind} started nothing");

        let out = run(&mut ctx, &mut scheduler, 5.0);
        assert!(peak(&out) > 0.001, "{kind} was silent");

        handle.stop(&mut ctx).unwrap();
        run(&mut ctx, &mut scheduler, 6.0);

        assert_eq!(ctx.live_oscillators(), 0, "{kind} leaked oscillators");
        assert_eq!(ctx.node_count(), 0, "{kind} leaked nodes");
        assert!(scheduler.is_empty(), "{kind} left a loop scheduled");
    }
}

#[test]
fn sustained_tracks_stop_immediately() {
    for kind in [TrackKind::Ambient, TrackKind::Meditation, TrackKind::Calm] {
        let mut ctx = context(4096);
        let mut scheduler = Scheduler::new();
        let handle = kind.create(&mut ctx, &mut scheduler).unwrap();
        run(&mut ctx, &mut scheduler, 0.5);

        handle.stop(&mut ctx).unwrap();
        assert_eq!(ctx.live_oscillators(), 0, "{kind}");
    }
}

#[test]
fn body_shapes_match_tracks() {
    let mut ctx = context(4096);
    let mut scheduler = Scheduler::new();

    for kind in TrackKind::ALL {
        let handle = kind.create(&mut ctx, &mut scheduler).unwrap();
        match (kind, handle.body()) {
            (TrackKind::Ambient, TrackBody::Pads { voices, .. }) => assert_eq!(voices.len(), 5),
            (TrackKind::Meditation, TrackBody::Drones { voices, .. }) => {
                assert_eq!(voices.len(), 4);
            }
            (TrackKind::Calm, TrackBody::PairedPads { voices }) => assert_eq!(voices.len(), 5),
            (TrackKind::Lofi | TrackKind::Piano, TrackBody::Sequence { loop_token }) => {
                assert!(!loop_token.is_cancelled());
            }
            (kind, body) => panic!("{kind} built unexpected body {body:?}"),
        }
        handle.stop(&mut ctx).unwrap();
    }
}

// ============================================================================
// 2. Loops
// ============================================================================

#[test]
fn lofi_loop_keeps_scheduling_bars() {
    let mut ctx = context(4096);
    let mut scheduler = Scheduler::new();
    let handle = TrackKind::Lofi.create(&mut ctx, &mut scheduler).unwrap();

    // The third bar starts at 8 s; its first chord sounds until 8.8 s.
    let out = run(&mut ctx, &mut scheduler, 9.0);
    let late = &out[(8.2 * SR) as usize..(8.6 * SR) as usize];
    assert!(peak(late) > 0.001, "third bar never played");

    handle.stop(&mut ctx).unwrap();
}

#[test]
fn cancelling_one_loop_leaves_the_other() {
    let mut ctx = context(4096);
    let mut scheduler = Scheduler::new();
    let lofi = TrackKind::Lofi.create(&mut ctx, &mut scheduler).unwrap();
    let piano = TrackKind::Piano.create(&mut ctx, &mut scheduler).unwrap();
    assert_eq!(scheduler.active(), 2);

    lofi.stop(&mut ctx).unwrap();
    assert_eq!(scheduler.active(), 1);

    run(&mut ctx, &mut scheduler, 4.5);
    assert_eq!(scheduler.len(), 1);
    // Only piano notes from the second bar remain in flight.
    assert!(ctx.live_oscillators() > 0);

    piano.stop(&mut ctx).unwrap();
    run(&mut ctx, &mut scheduler, 6.0);
    assert_eq!(ctx.node_count(), 0);
}

#[test]
fn piano_in_flight_notes_finish_after_stop() {
    let mut ctx = context(4096);
    let mut scheduler = Scheduler::new();
    let handle = TrackKind::Piano.create(&mut ctx, &mut scheduler).unwrap();
    run(&mut ctx, &mut scheduler, 1.0);

    let before = ctx.live_oscillators();
    handle.stop(&mut ctx).unwrap();
    assert_eq!(ctx.live_oscillators(), before);

    run(&mut ctx, &mut scheduler, 5.0);
    assert_eq!(ctx.live_oscillators(), 0);
}

// ============================================================================
// 3. Failure handling
// ============================================================================

#[test]
fn node_limit_fails_track_without_panicking() {
    let mut ctx = context(10);
    let mut scheduler = Scheduler::new();
    let mark = ctx.mark();

    let err = TrackKind::Ambient
        .create(&mut ctx, &mut scheduler)
        .unwrap_err();
    assert_eq!(err, SynthError::Graph(GraphError::NodeLimit(10)));

    ctx.rollback(mark);
    assert_eq!(ctx.node_count(), 0);
}

#[test]
fn fallback_fits_where_tracks_do_not() {
    // Ambient needs 18 nodes; the fallback needs 11.
    let mut ctx = context(12);
    let mut scheduler = Scheduler::new();
    let mark = ctx.mark();
    assert!(TrackKind::Ambient.create(&mut ctx, &mut scheduler).is_err());
    ctx.rollback(mark);

    let fallback = FallbackHandle::create(&mut ctx).unwrap();
    assert_eq!(ctx.live_oscillators(), 5);
    assert_eq!(ctx.node_count(), 11);
    fallback.stop(&mut ctx).unwrap();
}

#[test]
fn library_indexes_match_kinds() {
    let library = TrackLibrary::standard();
    let mut ctx = context(4096);
    let mut scheduler = Scheduler::new();
    for (i, kind) in TrackKind::ALL.into_iter().enumerate() {
        assert_eq!(library.name(i), Some(kind.name()));
        let handle = library.create(i, &mut ctx, &mut scheduler).unwrap().unwrap();
        assert_eq!(handle.kind(), kind);
        handle.stop(&mut ctx).unwrap();
    }
}

#[test]
fn effects_mix_over_a_track() {
    let mut ctx = context(4096);
    let mut scheduler = Scheduler::new();
    let handle = TrackKind::Calm.create(&mut ctx, &mut scheduler).unwrap();
    let nodes = ctx.node_count();

    SoundEffect::LevelUp.play(&mut ctx).unwrap();
    run(&mut ctx, &mut scheduler, 1.0);
    assert_eq!(ctx.node_count(), nodes);

    handle.stop(&mut ctx).unwrap();
}
