//! Command line front end: reads a puzzle file and solves it with the
//! algorithm named on the command line.

use std::env;
use std::fs;
use std::process::ExitCode;
use std::time::Instant;

use tracing::info;
use tracing_subscriber::EnvFilter;

use sudoku_logical::SudokuGrid;
use sudoku_logical::solver::{
    BacktrackingSolver,
    ParallelBacktrackingSolver,
    Solution,
    Solver
};
use sudoku_logical::solver::annealing::AnnealingSolver;
use sudoku_logical::solver::logical::{
    CoordinatedLogicalSolver,
    LogicalSolver,
    ParallelLogicalSolver
};

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() != 3 {
        println!("Usage: sudoku-logical <filename> <algorithm>");
        return ExitCode::SUCCESS;
    }

    let filename = &args[1];
    let algorithm = &args[2];

    let text = match fs::read_to_string(filename) {
        Ok(text) => text,
        Err(error) => {
            eprintln!("File \"{}\" could not be read: {}", filename, error);
            return ExitCode::FAILURE;
        }
    };

    let grid = match SudokuGrid::parse(&text) {
        Ok(grid) => grid,
        Err(error) => {
            eprintln!("File \"{}\" does not hold a valid grid: {}", filename,
                error);
            return ExitCode::FAILURE;
        }
    };

    let solver: Box<dyn Solver> = match algorithm.as_str() {
        "logical" => {
            println!("Running logical algorithm.");
            Box::new(LogicalSolver)
        },
        "parallelLogical" => {
            println!("Running parallelized logical algorithm.");
            Box::new(ParallelLogicalSolver::default())
        },
        "coordinatedLogical" => {
            println!("Running coordinated logical algorithm.");
            Box::new(CoordinatedLogicalSolver)
        },
        "backtracking" => {
            println!("Running backtracking algorithm.");
            Box::new(BacktrackingSolver)
        },
        "parallelizedBacktracking" => {
            println!("Running parallelized backtracking algorithm.");
            Box::new(ParallelBacktrackingSolver::default())
        },
        "bruteforce" => {
            println!("Running brute force algorithm.");
            Box::new(AnnealingSolver::default())
        },
        _ => {
            println!("Please enter a valid algorithm (logical, \
                parallelLogical, coordinatedLogical, backtracking, \
                parallelizedBacktracking, bruteforce).");
            return ExitCode::SUCCESS;
        }
    };

    let started = Instant::now();
    let solution = solver.solve(&grid);
    info!(elapsed = ?started.elapsed(), "solve finished");

    match solution {
        Solution::Solved(solved) => println!("{}", solved),
        Solution::Unsolvable(unsolvable) => {
            println!("The sudoku couldn't be solved!");
            println!("Reason: {}", unsolvable.reason);
            print!("{}", unsolvable);
        }
    }

    ExitCode::SUCCESS
}
