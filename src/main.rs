use clap::{Parser, Subcommand};
use lockwatch::demo;

#[derive(Parser)]
#[clap(author, version, about = "Lockwatch - Runtime Deadlock Detection Tool")]
struct Cli {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the classic AB/BA two-thread deadlock
    AbBa,
    /// Run an N-thread ring deadlock
    Ring {
        /// Number of threads and locks in the ring
        #[clap(default_value_t = 3)]
        n: usize,
    },
    /// Run two threads locking in the same order (no deadlock)
    SameOrder,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::AbBa => demo::run_ab_ba()?,
        Commands::Ring { n } => demo::run_ring(n)?,
        Commands::SameOrder => demo::run_same_order()?,
    }

    Ok(())
}
