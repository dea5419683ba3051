use anyhow::Context;
use clap::Parser;
use colored::Colorize;
use common::{Problem, SolveResult};
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};

#[derive(Parser)]
#[command(name = "hanoi", about = "Solve the Towers of Hanoi with A* search")]
struct Args {
    /// Number of disks on the source peg
    #[arg(default_value_t = 3)]
    disks: u8,

    /// Give up after this many state expansions
    #[arg(long)]
    limit: Option<u64>,

    /// Log search statistics to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let level = if args.verbose {
        LevelFilter::Info
    } else {
        LevelFilter::Warn
    };
    let _ = TermLogger::init(
        level,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    );

    let problem = Problem::new(args.disks).context("cannot set up the puzzle")?;

    let result = match args.limit {
        Some(limit) => problem.solve_bounded(limit),
        None => problem.solve(),
    };

    match result {
        SolveResult::Solved(moves) => {
            println!("Solução para {} discos:", problem.nr_disks());
            for mv in moves {
                println!(
                    "Mover disco {} de {} para {}",
                    mv.disk.to_string().bold(),
                    mv.action.from,
                    mv.action.to
                );
            }
        }
        SolveResult::Exhausted | SolveResult::TimedOut => {
            println!("Nenhuma solução encontrada.");
        }
    }

    Ok(())
}
