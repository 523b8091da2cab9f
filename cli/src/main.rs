mod commands;
mod terminal;

use commands::{CommandLine, Commands, driver, results, scan};
use terminal::{logging, print};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CommandLine::parse_args();

    logging::init_logging();

    let cfg = cli.config();
    let mut session = commands::open_session(&cli, &cfg)?;

    let outcome = match &cli.command {
        Commands::Driver { words } => {
            print::header("driver command");
            driver::driver(&mut session, words)
        }
        Commands::Scan { ssid } => {
            print::header("starting scan");
            scan::scan(&mut session, ssid.clone())
        }
        Commands::Results { capacity } => {
            print::header("scan results");
            results::results(&mut session, *capacity)
        }
    };

    session.deinit();
    outcome
}
