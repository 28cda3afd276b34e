use std::io::stdout;

use crossterm::event::{DisableBracketedPaste, EnableBracketedPaste, EventStream};
use crossterm::execute;
use futures::StreamExt;
use log::{debug, info};
use ratatui::DefaultTerminal;
use tower::Service;

use crate::dataset::Dataset;
use crate::error::{ClientError, DashboardError};
use crate::ui::{view, Dashboard};

/// Runs `dashboard` on the terminal until the user quits.
///
/// The terminal is switched to raw mode and the alternate screen for the
/// duration and restored afterwards, also when the loop fails.
pub async fn run<S>(mut dashboard: Dashboard<S>) -> Result<(), DashboardError>
where
    S: Service<usize, Response = Option<Dataset>, Error = ClientError> + Clone + Send + 'static,
    S::Future: Send,
{
    let mut terminal = ratatui::try_init()?;
    if let Err(error) = execute!(stdout(), EnableBracketedPaste) {
        debug!("Bracketed paste unavailable: {}", error);
    }

    let result = event_loop(&mut terminal, &mut dashboard).await;

    if let Err(error) = execute!(stdout(), DisableBracketedPaste) {
        debug!("Unable to disable bracketed paste: {}", error);
    }
    ratatui::restore();
    result
}

// Terminal events and fetch completions are handled one at a time on this
// task, so the dashboard needs no locking.
async fn event_loop<S>(
    terminal: &mut DefaultTerminal,
    dashboard: &mut Dashboard<S>,
) -> Result<(), DashboardError>
where
    S: Service<usize, Response = Option<Dataset>, Error = ClientError> + Clone + Send + 'static,
    S::Future: Send,
{
    let mut events = EventStream::new();
    let completions = dashboard.completions();

    dashboard.start();
    while !dashboard.should_exit() {
        terminal.draw(|frame| view::draw(frame, &dashboard.view()))?;

        tokio::select! {
            event = events.next() => match event {
                Some(Ok(event)) => dashboard.handle_event(&event),
                Some(Err(error)) => return Err(error.into()),
                None => {
                    info!("Terminal event stream closed");
                    break;
                }
            },
            Ok(completion) = completions.recv() => dashboard.on_completion(completion),
        }
    }
    Ok(())
}
