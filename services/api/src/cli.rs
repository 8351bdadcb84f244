use crate::demo::{run_demo, run_report, run_summary, DemoArgs, ReportArgs, SummaryArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use pim_avaliador::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "PIM Avaliador",
    about = "Score PIM reports against the rubric and render evaluation documents",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Render the PDF report for a saved evaluation snapshot
    Report(ReportArgs),
    /// Print grades and recommendations for a saved evaluation snapshot
    Summary(SummaryArgs),
    /// Write a sample evaluation snapshot and its rendered report
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Report(args) => run_report(args),
        Command::Summary(args) => run_summary(args),
        Command::Demo(args) => run_demo(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn serve_is_the_default_command() {
        let cli = Cli::try_parse_from(["pim-avaliador-api"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn report_requires_a_snapshot() {
        assert!(Cli::try_parse_from(["pim-avaliador-api", "report"]).is_err());

        let cli = Cli::try_parse_from([
            "pim-avaliador-api",
            "report",
            "--snapshot",
            "avaliacao.json",
            "--print-narrative",
        ])
        .expect("parses");
        match cli.command {
            Some(Command::Report(args)) => {
                assert_eq!(args.snapshot.to_string_lossy(), "avaliacao.json");
                assert!(args.output.is_none());
                assert!(args.print_narrative);
            }
            other => panic!("expected report command, got {other:?}"),
        }
    }
}
