use criterion::{Criterion, criterion_group, criterion_main};
use rand::SeedableRng;
use rand::rngs::StdRng;
use reversi_engine::board::Board;
use reversi_engine::flip::flip;
use reversi_engine::square::Square;
use std::hint::black_box;

fn bench_flip_initial(c: &mut Criterion) {
    let board = Board::new();

    c.bench_function("flip_initial", |b| {
        b.iter(|| flip(black_box(Square::D3), black_box(board.player), black_box(board.opponent)))
    });
}

fn bench_flip_random(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(1);
    let cases: Vec<_> = (0..256)
        .map(|_| Board::random_position(30, &mut rng))
        .flat_map(|board| board.get_moves().iter().map(move |sq| (sq, board)))
        .collect();

    c.bench_function("flip_random_midgame", |b| {
        b.iter(|| {
            for &(sq, board) in &cases {
                black_box(flip(sq, board.player, board.opponent));
            }
        })
    });
}

criterion_group!(benches, bench_flip_initial, bench_flip_random);
criterion_main!(benches);
