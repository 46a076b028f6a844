use clap::Parser;
use colored::Colorize;
use lex_cli::{
    build::run_build,
    cli::Commands,
    inspect::run_inspect,
    query_commands::{run_context, run_search},
    utils::{print_error, print_info, print_success, print_warning},
    verify::run_verify,
    Cli,
};
use lex_core::LexResult;

fn init_tracing() {
    let filter = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .with_target(false)
        .init();
}

/// Returns the process exit code on success; errors are mapped by the
/// caller via `LexError::exit_code()` (spec.md §6/§7).
fn run(cli: Cli) -> LexResult<i32> {
    match cli.command {
        Commands::Build(args) => {
            let summary = run_build(args)?;
            print_success(&format!(
                "built {} section(s) ({} new, {} complex chain(s))",
                summary.total_sections, summary.new_sections, summary.complex_chains
            ));
            if summary.lines_skipped_malformed > 0 || summary.sections_skipped_malformed_header > 0 {
                print_warning(&format!(
                    "{} malformed line(s), {} malformed header(s) skipped",
                    summary.lines_skipped_malformed, summary.sections_skipped_malformed_header
                ));
            }
            Ok(0)
        }
        Commands::Inspect(args) => {
            println!("{}", run_inspect(args)?);
            Ok(0)
        }
        Commands::Verify(args) => {
            let report = run_verify(args)?;
            if report.violations.is_empty() {
                print_success(&format!("{}: no invariant violations", report.checked));
                Ok(0)
            } else {
                print_error(&format!(
                    "{}: {} invariant violation(s)",
                    report.checked,
                    report.violations.len()
                ));
                for violation in &report.violations {
                    println!(
                        "  {} [{}] {}: {}",
                        "-".red(),
                        violation.rule,
                        violation.subject_id,
                        violation.detail
                    );
                }
                Ok(1)
            }
        }
        Commands::Search(args) => {
            let hits = run_search(args)?;
            if hits.is_empty() {
                print_info("no matches");
            }
            for hit in hits {
                println!("{} [{}] {} - {}", hit.id.cyan(), hit.relevance, hit.title, hit.preview);
            }
            Ok(0)
        }
        Commands::Context(args) => {
            match run_context(args)? {
                Some(text) => println!("{text}"),
                None => print_warning("no such section"),
            }
            Ok(0)
        }
    }
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            print_error(&err.to_string());
            std::process::exit(err.exit_code());
        }
    }
}
