//! Property-based tests for track lifecycles.
//!
//! Any interleaving of track starts, stops, effects and render time must leave
//! the context empty once everything has been stopped and allowed to ring out.

use keytone_core::{AudioContext, ContextOptions};
use keytone_synth::{Scheduler, SoundEffect, TrackHandle, TrackKind, play_keystroke};
use proptest::prelude::*;

const SR: f32 = 8000.0;

#[derive(Debug, Clone)]
enum Step {
    Start(usize),
    Stop,
    Effect(usize),
    Keystroke,
    Render(u8),
}

fn step() -> impl Strategy<Value = Step> {
    prop_oneof![
        (0usize..5).prop_map(Step::Start),
        Just(Step::Stop),
        (0usize..4).prop_map(Step::Effect),
        Just(Step::Keystroke),
        (1u8..20).prop_map(Step::Render),
    ]
}

fn render(ctx: &mut AudioContext, scheduler: &mut Scheduler, tenths: u8) {
    let mut block = [0.0f32; 80];
    for _ in 0..u32::from(tenths) * 10 {
        ctx.render(&mut block);
        scheduler.poll(ctx);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn lifecycle_never_leaks(steps in prop::collection::vec(step(), 1..24)) {
        let mut ctx = AudioContext::new(ContextOptions { sample_rate: SR, max_nodes: 4096 });
        ctx.resume();
        let mut scheduler = Scheduler::new();
        let mut current: Option<TrackHandle> = None;

        for step in steps {
            match step {
                Step::Start(i) => {
                    if current.is_none() {
                        current = Some(TrackKind::ALL[i].create(&mut ctx, &mut scheduler).unwrap());
                    }
                }
                Step::Stop => {
                    if let Some(handle) = current.take() {
                        handle.stop(&mut ctx).unwrap();
                    }
                }
                Step::Effect(i) => SoundEffect::ALL[i].play(&mut ctx).unwrap(),
                Step::Keystroke => play_keystroke(&mut ctx).unwrap(),
                Step::Render(tenths) => render(&mut ctx, &mut scheduler, tenths),
            }
        }

        if let Some(handle) = current.take() {
            handle.stop(&mut ctx).unwrap();
        }
        render(&mut ctx, &mut scheduler, 60);

        prop_assert_eq!(ctx.live_oscillators(), 0);
        prop_assert_eq!(ctx.node_count(), 0);
        prop_assert!(scheduler.is_empty());
    }
}
