use clap::Parser;
use miette::Result;
use pxsplit::cli::{Cli, Commands};
use pxsplit::output::Printer;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let printer = Printer::new().with_verbosity(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Split(args) => pxsplit::cli::split::run(args, &printer)?,
        Commands::Regions(args) => {
            pxsplit::cli::regions::run(args, &printer)?;
        }
        Commands::Completions(args) => pxsplit::cli::completions::run(args)?,
    }

    Ok(())
}
