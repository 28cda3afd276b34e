use async_channel::Receiver;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use log::info;
use tower::Service;

use crate::config::Config;
use crate::dataset::Dataset;
use crate::error::ClientError;
use crate::input::NumberInput;
use crate::request_state::{AsyncRequest, Completion, Settled, StalePolicy};
use crate::stats::{MedianRule, Summary};

static EMPTY: Dataset = Dataset::new();

/// Settings of a [`Dashboard`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    pub dataset_count: usize,
    pub initial_index: usize,
    pub median: MedianRule,
    pub stale: StalePolicy,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            dataset_count: 3,
            initial_index: 0,
            median: MedianRule::default(),
            stale: StalePolicy::default(),
        }
    }
}

impl From<&Config> for Options {
    fn from(config: &Config) -> Self {
        Options {
            dataset_count: config.dataset_count(),
            initial_index: config.initial_index,
            median: config.median,
            stale: config.stale,
        }
    }
}

/// Everything the screen shows, borrowed from a [`Dashboard`].
#[derive(Debug, Clone, Copy)]
pub struct DashboardView<'a> {
    pub summary: &'a Summary,
    pub len: usize,
    pub input: &'a str,
    pub selected: usize,
    pub dataset_count: usize,
    pub loading: bool,
    pub alert: Option<&'a str>,
}

/// State of the dashboard screen.
///
/// Holds the dataset request, the number being typed and the statistics of
/// the current dataset. The statistics are recomputed every time the dataset
/// changes, so they are never stale.
pub struct Dashboard<S>
where
    S: Service<usize, Response = Option<Dataset>, Error = ClientError>,
{
    request: AsyncRequest<S, usize, Dataset>,
    input: NumberInput,
    selected: usize,
    options: Options,
    summary: Summary,
    alert: Option<String>,
    should_exit: bool,
}

impl<S> Dashboard<S>
where
    S: Service<usize, Response = Option<Dataset>, Error = ClientError> + Clone + Send + 'static,
    S::Future: Send,
{
    pub fn new(service: S, mut options: Options) -> Self {
        options.dataset_count = options.dataset_count.max(1);
        Dashboard {
            request: AsyncRequest::new(service, options.stale),
            input: NumberInput::new(),
            selected: options.initial_index,
            options,
            summary: Summary::EMPTY,
            alert: None,
            should_exit: false,
        }
    }

    /// Fetches the initial dataset.
    pub fn start(&mut self) {
        self.select(self.options.initial_index);
    }

    /// Selects dataset `index` and fetches it.
    pub fn select(&mut self, index: usize) {
        self.selected = index;
        self.request.trigger(index);
    }

    /// Appends the typed number to the dataset, locally.
    ///
    /// Does nothing when nothing is typed.
    pub fn submit(&mut self) {
        let Some(value) = self.input.take() else {
            return;
        };
        info!("Appending {} to dataset {}", value, self.selected);
        self.request
            .update_result(|dataset| dataset.get_or_insert_with(Dataset::new).push(value));
        self.refresh_summary();
    }

    pub fn completions(&self) -> Receiver<Completion<Dataset, ClientError>> {
        self.request.completions()
    }

    pub fn on_completion(&mut self, completion: Completion<Dataset, ClientError>) {
        match self.request.settle(completion) {
            Settled::Success => self.refresh_summary(),
            Settled::Failure => {
                self.alert = self.request.error().map(ToString::to_string);
            }
            Settled::Stale => {}
        }
    }

    pub fn handle_event(&mut self, event: &Event) {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(*key),
            Event::Paste(text) if self.alert.is_none() => {
                self.input.paste(text);
            }
            _ => {}
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_exit = true;
            return;
        }

        // The alert blocks everything until dismissed.
        if self.alert.is_some() {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
                self.alert = None;
            }
            return;
        }

        let count = self.options.dataset_count;
        match key.code {
            KeyCode::Esc => self.should_exit = true,
            KeyCode::Enter => self.submit(),
            KeyCode::Backspace => {
                self.input.backspace();
            }
            KeyCode::Tab => self.select((self.selected + 1) % count),
            KeyCode::BackTab => self.select((self.selected % count + count - 1) % count),
            KeyCode::F(n) if (1..=count).contains(&usize::from(n)) => {
                self.select(usize::from(n) - 1)
            }
            KeyCode::Char(c) => {
                self.input.push(c);
            }
            _ => {}
        }
    }

    fn refresh_summary(&mut self) {
        self.summary = self.dataset().summarize(self.options.median);
    }

    pub fn dataset(&self) -> &Dataset {
        self.request.result().unwrap_or(&EMPTY)
    }

    pub fn summary(&self) -> &Summary {
        &self.summary
    }

    pub fn input(&self) -> &NumberInput {
        &self.input
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn is_loading(&self) -> bool {
        self.request.is_loading()
    }

    pub fn alert(&self) -> Option<&str> {
        self.alert.as_deref()
    }

    pub fn should_exit(&self) -> bool {
        self.should_exit
    }

    pub fn view(&self) -> DashboardView<'_> {
        DashboardView {
            summary: &self.summary,
            len: self.dataset().len(),
            input: self.input.as_str(),
            selected: self.selected,
            dataset_count: self.options.dataset_count,
            loading: self.is_loading(),
            alert: self.alert(),
        }
    }
}
