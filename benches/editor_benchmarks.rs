use criterion::{Criterion, black_box, criterion_group, criterion_main};

use liftdeck::session::expansion::section_index_for;
use liftdeck::session::reorder::{self, ReorderIntent};
use liftdeck::session::workout::{ExerciseRecord, Set};

fn make_exercises(count: usize) -> Vec<ExerciseRecord> {
    (0..count)
        .map(|i| ExerciseRecord::new(&format!("Exercise {i}"), vec![Set::new(8, 40.0); 4]))
        .collect()
}

fn bench_section_index(c: &mut Criterion) {
    c.bench_function("section_index_for (full scroll range, 12 cards)", |b| {
        b.iter(|| {
            let mut sum = 0usize;
            for offset in 0..=2_400u32 {
                sum += section_index_for(black_box(offset), 2_600, 200, 12);
            }
            sum
        })
    });
}

fn bench_reorder(c: &mut Criterion) {
    let exercises = make_exercises(40);

    c.bench_function("reorder apply (40 exercises, 100 moves)", |b| {
        b.iter(|| {
            let mut list = exercises.clone();
            for i in 0..100usize {
                let intent = ReorderIntent::new(i % 40, (i * 7 + 3) % 40);
                reorder::apply(black_box(&mut list), intent);
            }
            list
        })
    });
}

criterion_group!(benches, bench_section_index, bench_reorder);
criterion_main!(benches);
