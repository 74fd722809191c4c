use circular_deque::CircularDeque;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

const SIZE: usize = 1024;

fn criterion_benchmarks(c: &mut Criterion) {
    c.bench_function("bench_new", |b| {
        b.iter(|| {
            let ring: CircularDeque<i32> = CircularDeque::new();
            black_box(ring);
        })
    });

    c.bench_function("bench_push_front_1024", |b| {
        b.iter(|| {
            let mut deq = CircularDeque::new();
            for i in 0..SIZE {
                deq.push_front(i);
            }
            black_box(deq);
        })
    });

    c.bench_function("bench_push_back_1024", |b| {
        b.iter(|| {
            let mut deq = CircularDeque::new();
            for i in 0..SIZE {
                deq.push_back(i);
            }
            black_box(deq);
        })
    });

    c.bench_function("bench_grow_shrink_1024", |b| {
        b.iter(|| {
            let mut deq = CircularDeque::new();
            for i in 0..SIZE {
                deq.push_back(i);
            }
            while let Some(i) = deq.pop_front() {
                black_box(i);
            }
            black_box(deq);
        })
    });

    let rng = fastrand::Rng::with_seed(64738);
    let rands: Vec<f32> = (0..4 * SIZE).map(|_| rng.f32()).collect();
    c.bench_function("bench_random_mix", |b| {
        b.iter(|| {
            let mut deq = CircularDeque::new();
            for (n, r) in rands.chunks_exact(4).enumerate() {
                if r[0] < 0.8 {
                    deq.push_back(n);
                }
                if r[1] < 0.8 {
                    deq.push_front(n);
                }
                if r[2] < 0.5 {
                    black_box(deq.pop_front());
                }
                if r[3] < 0.5 {
                    black_box(deq.pop_back());
                }
            }
            black_box(deq);
        })
    });

    // a pop/push pair straddling the quarter-full watermark of a 1024 slot buffer
    let mut ring = CircularDeque::<usize>::with_capacity(SIZE);
    ring.extend(0..SIZE / 4 + 1);
    c.bench_function("bench_watermark_churn", |b| {
        b.iter(|| {
            black_box(ring.pop_back());
            ring.push_back(0);
        })
    });

    let ring: CircularDeque<_> = (0..1000).collect();
    c.bench_function("bench_iter_1000", |b| {
        b.iter(|| {
            let mut sum = 0;
            for &i in &ring {
                sum += i;
            }
            black_box(sum);
        })
    });

    let mut ring: CircularDeque<_> = (0..1000).collect();
    c.bench_function("bench_mut_iter_1000", |b| {
        b.iter(|| {
            let mut sum = 0;
            for i in &mut ring {
                sum += *i;
            }
            black_box(sum);
        })
    });
}

criterion_group!(benches, criterion_benchmarks);
criterion_main!(benches);
