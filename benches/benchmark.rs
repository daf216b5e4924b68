use criterion::{black_box, criterion_group, criterion_main, Criterion};

use sudoku_logical::SudokuGrid;
use sudoku_logical::solver::{BacktrackingSolver, Solver};
use sudoku_logical::solver::logical::{
    CoordinatedLogicalSolver,
    LogicalSolver,
    ParallelLogicalSolver
};

const EASY: &str = "53..7....\n\
    6..195...\n\
    .98....6.\n\
    8...6...3\n\
    4..8.3..1\n\
    7...2...6\n\
    .6....28.\n\
    ...419..5\n\
    ....8..79";

const SEVENTEEN_CLUE: &str = ".......1.\n\
    4........\n\
    .2.......\n\
    ....5.4.7\n\
    ..8...3..\n\
    ..1.9....\n\
    3..4..2..\n\
    .5.1.....\n\
    ...8.6...";

fn bench_easy(c: &mut Criterion) {
    let puzzle = SudokuGrid::parse(EASY).unwrap();
    let mut group = c.benchmark_group("easy");

    group.bench_function("logical", |b|
        b.iter(|| LogicalSolver.solve(black_box(&puzzle))));
    group.bench_function("parallel_logical", |b|
        b.iter(|| ParallelLogicalSolver::default()
            .solve(black_box(&puzzle))));
    group.bench_function("coordinated_logical", |b|
        b.iter(|| CoordinatedLogicalSolver.solve(black_box(&puzzle))));
    group.bench_function("backtracking", |b|
        b.iter(|| BacktrackingSolver.solve(black_box(&puzzle))));
    group.finish();
}

fn bench_seventeen_clue(c: &mut Criterion) {
    let puzzle = SudokuGrid::parse(SEVENTEEN_CLUE).unwrap();
    let mut group = c.benchmark_group("seventeen_clue");
    group.sample_size(20);

    group.bench_function("logical", |b|
        b.iter(|| LogicalSolver.solve(black_box(&puzzle))));
    group.bench_function("parallel_logical", |b|
        b.iter(|| ParallelLogicalSolver::default()
            .solve(black_box(&puzzle))));
    group.bench_function("backtracking", |b|
        b.iter(|| BacktrackingSolver.solve(black_box(&puzzle))));
    group.finish();
}

criterion_group!(benches, bench_easy, bench_seventeen_clue);
criterion_main!(benches);
