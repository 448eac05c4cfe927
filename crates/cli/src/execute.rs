use crate::commands::Commands;
use eyre::WrapErr;
use std::sync::Arc;
use surfside_config::TrackerConfig;
use surfside_core::diagnostics::TracingSubscriber;
use surfside_core::DiagnosticsBus;
use surfside_tracker::{CommandExecutor, RecordingTransport};
use tracing::debug;

/// Prints log lines with a running index, the way the demo's log list did
#[derive(Debug, Default)]
struct LogPrinter {
    printed: usize,
}

impl LogPrinter {
    fn print(&mut self, lines: impl IntoIterator<Item = String>) {
        for line in lines {
            self.printed += 1;
            println!("{:>3}. {line}", self.printed);
        }
    }
}

pub async fn execute_command(
    command: Commands,
    config: TrackerConfig,
    dry_run: bool,
) -> eyre::Result<()> {
    let diagnostics = Arc::new(DiagnosticsBus::default());
    diagnostics.add_subscriber(Arc::new(TracingSubscriber));

    let recording = dry_run.then(|| Arc::new(RecordingTransport::new()));
    let mut executor = CommandExecutor::new(diagnostics);
    if let Some(transport) = &recording {
        executor = executor.with_transport(transport.clone());
    }

    let commands = command
        .into_commands(config)
        .wrap_err("invalid command arguments")?;
    let mut printer = LogPrinter::default();

    for command in commands {
        let name = command.name();
        debug!(command = name, "Executing");
        match executor.execute(command) {
            Ok(mut outcome) => {
                printer.print(std::mem::take(&mut outcome.lines));
                outcome.wait().await;
                printer.print(executor.log().drain());
            }
            Err(e) => {
                printer.print(executor.log().drain());
                return Err(e).wrap_err_with(|| format!("{name} failed"));
            }
        }
    }

    if let Some(transport) = recording {
        println!();
        println!(
            "Dry run: {} batch(es) captured, nothing was sent",
            transport.delivered().len()
        );
        for request in transport.delivered() {
            let body: serde_json::Value = serde_json::from_str(&request.body)?;
            println!("POST {}", request.url);
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
    }

    Ok(())
}
