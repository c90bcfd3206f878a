use anyhow::Context;
use clap::Parser;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::io;
use tokio::sync::mpsc;
use tokio::task;

use gia::app::{App, AppResult, View};
use gia::cli::Cli;
use gia::client::AnswerClient;
use gia::event::{Event, EventHandler};
use gia::handler::handle_key_events;
use gia::logging;
use gia::submit::Reply;
use gia::tui::Tui;

#[tokio::main]
async fn main() -> AppResult<()> {
    let cli = Cli::parse();

    let log_dir = cli
        .log_dir
        .clone()
        .or_else(logging::default_log_dir)
        .context("Cannot find a directory for the log file, use --log-dir")?;
    let _log_guard = logging::init(&log_dir).context("Failed to set up logging")?;
    tracing::info!(base_url = %cli.base_url, log_dir = %log_dir.display(), "gia starting");

    let client = AnswerClient::new(cli.base_url.clone(), cli.timeout())
        .context("Failed to build the HTTP client")?;

    // Create an application.
    let mut app = App::new(cli.settings());

    // Initialize the terminal user interface.
    let backend = CrosstermBackend::new(io::stderr());
    let terminal = Terminal::new(backend).context("Failed to create terminal")?;
    let events = EventHandler::new(250);
    let mut tui = Tui::new(terminal, events);
    tui.init().context("Failed to initialize terminal")?;

    // Channels for answers and for the one-off service probe
    let (reply_tx, mut reply_rx) = mpsc::channel::<Reply>(32);
    let (status_tx, mut status_rx) = mpsc::channel(1);
    let probe_client = client.clone();
    task::spawn(async move {
        if status_tx.send(probe_client.status().await).await.is_err() {
            tracing::debug!("status arrived after the app stopped listening");
        }
    });

    // Start the main loop.
    while app.running {
        // Render only when the last events invalidated something.
        tui.draw(&mut app)
            .context("Failed to render user interface")?;

        tokio::select! {
            event = tui.events.next() => match event.context("Unable to get next event")? {
                Event::Tick => app.tick(),
                Event::Key(key_event) => {
                    handle_key_events(key_event, &mut app).context("Error handling key events")?
                }
                Event::Resize(_, _) => app.invalidate(View::Root),
            },
            Some(reply) = reply_rx.recv() => app.receive_reply(reply),
            Some(status) = status_rx.recv() => app.set_service_status(status),
        }

        // Spawn the request for a freshly submitted question
        if let Some(submission) = app.take_submission() {
            let reply_tx = reply_tx.clone();
            let client = client.clone();
            task::spawn(async move {
                submission.deliver(&client, &reply_tx).await;
            });
        }
    }

    // Exit the user interface.
    tui.exit().context("Failed during application shutdown")?;
    tracing::info!("gia shut down cleanly");
    Ok(())
}
