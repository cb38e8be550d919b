use clap::Parser;
use log_injector::args::{Args, Command, RunArgs, VerifyArgs};
use log_injector::configs::config_provider::{ConfigProvider, FileConfigProvider};
use log_injector::error::InjectorError;
use log_injector::integrity::verify_file;
use log_injector::logging;
use log_injector::runner::Runner;
use log_injector::shutdown::spawn_signal_listener;
use log_injector::template::{CounterExtractor, MessageTemplate};
use log_injector::transport::UnixSocketConnector;
use std::process::ExitCode;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    logging::init();

    let result = match args.command {
        Some(Command::Verify(verify)) => verify_counters(verify).await,
        None => inject(args.run).await,
    };

    match result {
        Ok(code) => code,
        Err(error) => {
            error!("{error}");
            ExitCode::FAILURE
        }
    }
}

async fn inject(args: RunArgs) -> Result<ExitCode, InjectorError> {
    println!("Log Injector");
    println!("============");
    println!("Loading configuration from: {}", args.config);

    let config = FileConfigProvider::new(args.config.clone())
        .with_overrides(args.overrides())
        .load_config()
        .await?;

    let shutdown = CancellationToken::new();
    let signals = spawn_signal_listener(shutdown.clone());
    let connector = Arc::new(UnixSocketConnector::new(&config.socket_path));
    let mut runner = Runner::new(config, connector, shutdown);
    let result = runner.run().await;
    signals.abort();

    let summary = result?;
    info!(
        "Messages sent: {}, next counter: {}.",
        summary.snapshot.messages, summary.next_counter
    );
    Ok(ExitCode::SUCCESS)
}

async fn verify_counters(args: VerifyArgs) -> Result<ExitCode, InjectorError> {
    let extractor = match (&args.pattern, &args.template) {
        (Some(pattern), _) => CounterExtractor::from_pattern(pattern)?,
        (None, Some(template)) => CounterExtractor::from_template(&MessageTemplate::parse(template))?,
        (None, None) => {
            let config = FileConfigProvider::new(args.config.clone())
                .load_config()
                .await?;
            CounterExtractor::from_template(&MessageTemplate::parse(&config.message_format))?
        }
    };
    let outcome = verify_file(
        &args.log_file,
        &extractor,
        args.expected,
        args.tolerated_gaps,
    )
    .await?;

    println!("{}", outcome.report);
    println!("Lines without counter: {}", outcome.unmatched_lines);
    if outcome.passed() {
        println!("Result: PASSED");
        Ok(ExitCode::SUCCESS)
    } else {
        println!("Result: FAILED");
        Ok(ExitCode::FAILURE)
    }
}
