//! Tick throughput and replay cost on random scripted matches.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use duel_core::input::{AttackButtons, Direction, InputFrame};
use duel_core::{replay, RosterConfig, ScriptedTick, Simulation};

fn random_script(seed: u64, ticks: usize) -> Vec<ScriptedTick> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut frame = || InputFrame {
        direction: Direction::from_bits_truncate(rng.gen_range(0..16)),
        attack: AttackButtons::from_bits_truncate(rng.gen_range(0..64)),
    };
    (0..ticks)
        .map(|_| ScriptedTick::contact(frame(), frame()))
        .collect()
}

fn bench_replay(c: &mut Criterion) {
    let roster = RosterConfig::sample();
    let mut group = c.benchmark_group("replay");
    for ticks in [60usize, 600, 3600] {
        let script = random_script(42, ticks);
        group.bench_with_input(BenchmarkId::from_parameter(ticks), &script, |b, script| {
            b.iter(|| {
                let (sim, _) = replay(&roster, black_box(script)).unwrap();
                black_box(sim.compute_hash())
            })
        });
    }
    group.finish();
}

fn bench_single_tick(c: &mut Criterion) {
    let roster = RosterConfig::sample();
    let script = random_script(7, 1);
    let inputs = script[0].inputs;

    c.bench_function("tick", |b| {
        b.iter_batched(
            || Simulation::new(&roster).unwrap(),
            |mut sim| {
                sim.staging().stage(sim.point_blank_collisions());
                black_box(sim.tick(black_box(inputs)).unwrap())
            },
            criterion::BatchSize::SmallInput,
        )
    });
}

fn bench_hash(c: &mut Criterion) {
    let roster = RosterConfig::sample();
    let (sim, _) = replay(&roster, &random_script(3, 300)).unwrap();
    c.bench_function("compute_hash", |b| b.iter(|| black_box(sim.compute_hash())));
}

criterion_group!(benches, bench_replay, bench_single_tick, bench_hash);
criterion_main!(benches);
