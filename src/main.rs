use std::sync::Arc;

use tokio::task::JoinSet;

mod cli;
mod config;
mod display;
mod remote;
mod status;

use config::ConfigFile;
use display::StatusDisplay;
use remote::SshRunner;
use status::report::format_server_report;

#[tokio::main]
async fn main() {
    env_logger::init();

    let args = cli::get_cli_args();
    let config = match ConfigFile::try_init() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Unable to read config: {e}");
            std::process::exit(1);
        }
    };

    let servers: Vec<_> = config
        .servers
        .into_iter()
        .filter(|server| {
            args.server
                .as_ref()
                .is_none_or(|wanted| *wanted == server.host)
        })
        .collect();
    if servers.is_empty() {
        log::error!("No matching server in {}", args.config.display());
        std::process::exit(1);
    }

    let runner = Arc::new(SshRunner);
    let app = Arc::new(config.app);

    let server_count = servers.len();
    let mut tasks = JoinSet::new();
    for (position, server) in servers.into_iter().enumerate() {
        let runner = runner.clone();
        let app = app.clone();
        tasks.spawn(async move {
            let report = status::check_server(runner.as_ref(), &server, &app).await;
            (position, report)
        });
    }

    // Checks run concurrently but the report keeps config order.
    let mut reports: Vec<Option<status::ServerReport>> = vec![None; server_count];
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((position, Ok(report))) => reports[position] = Some(report),
            Ok((_, Err(e))) => {
                log::error!("{e}");
                std::process::exit(1);
            }
            Err(e) => {
                log::error!("Status task panicked: {e}");
                std::process::exit(1);
            }
        }
    }

    let mut display = StatusDisplay::new();
    let title = display.add_line(format!("=> {} status", app.name));
    for report in reports.into_iter().flatten() {
        format_server_report(&report, title);
    }
    print!("{}", display.render());
}
