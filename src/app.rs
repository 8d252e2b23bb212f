use anyhow::{Context, Result};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::process::{Command, Stdio};
use std::time::Instant;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::api::ImageSearch;
use crate::config::AppConfig;
use crate::search::{FetchOutcome, FetchTicket, Filter, PageDelta, SearchState};

/// Seconds a status message stays in the info line
const STATUS_TIMEOUT_SECS: u64 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Search,
    Filters,
    Results,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Popup {
    None,
    Help,
}

pub struct App<C> {
    pub section: Section,
    pub popup: Popup,

    // Query, page, results, loading flag and error banner
    pub search: SearchState,

    // Text in the search box (what the user sees, not yet submitted)
    pub input: String,

    // Cursors
    pub selected_filter: usize,
    pub selected_result: usize,

    // Status message (shown in info line, auto-clears after timeout)
    pub status_message: Option<String>,
    pub status_message_time: Option<Instant>,

    opener: Option<String>,
    // Opener processes still being waited on
    openers: Vec<JoinHandle<()>>,
    client: C,

    // Fetch tasks report back here
    outcome_tx: mpsc::UnboundedSender<FetchOutcome>,
    outcome_rx: mpsc::UnboundedReceiver<FetchOutcome>,
}

impl<C> App<C>
where
    C: ImageSearch + Clone + Send + Sync + 'static,
{
    pub fn new(client: C, config: &AppConfig) -> Self {
        let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();

        Self {
            section: Section::Search,
            popup: Popup::None,
            search: SearchState::new(),
            input: String::new(),
            selected_filter: 0,
            selected_result: 0,
            status_message: None,
            status_message_time: None,
            opener: config.opener.clone(),
            openers: Vec::new(),
            client,
            outcome_tx,
            outcome_rx,
        }
    }

    /// Initial fetch. Does nothing until a query has been entered.
    pub fn mount(&mut self) {
        let ticket = self.search.mount();
        self.dispatch(ticket);
    }

    /// Set a status message (auto-clears after 3 seconds)
    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some(msg.into());
        self.status_message_time = Some(Instant::now());
    }

    /// Run a fetch in the background; the outcome is picked up by `tick`
    fn dispatch(&self, ticket: Option<FetchTicket>) {
        let Some(ticket) = ticket else {
            return;
        };

        let client = self.client.clone();
        let tx = self.outcome_tx.clone();
        tokio::spawn(async move {
            let result = client.search(ticket.request).await;
            // Receiver only goes away when the app is shutting down
            let _ = tx.send(FetchOutcome {
                seq: ticket.seq,
                result,
            });
        });
    }

    fn apply_outcome(&mut self, outcome: FetchOutcome) {
        if self.search.complete(outcome) && self.selected_result >= self.search.results().len() {
            self.selected_result = self.search.results().len().saturating_sub(1);
        }
    }

    /// Submit whatever is in the search box
    pub fn submit_search(&mut self) {
        let term = self.input.clone();
        let ticket = self.search.submit_search(&term);
        if ticket.is_some() {
            self.selected_result = 0;
        }
        self.dispatch(ticket);
    }

    /// Put the filter's term in the search box and search for it
    pub fn select_filter(&mut self, filter: Filter) {
        self.input = filter.term().to_string();
        if let Some(index) = Filter::ALL.iter().position(|f| *f == filter) {
            self.selected_filter = index;
        }
        let ticket = self.search.select_filter(filter);
        self.selected_result = 0;
        self.dispatch(ticket);
    }

    pub fn go_to_page(&mut self, delta: PageDelta) {
        if self.search.is_loading() {
            return;
        }
        let ticket = self.search.go_to_page(delta);
        if ticket.is_some() {
            tracing::debug!(page = self.search.page(), "Changing page");
            self.selected_result = 0;
        }
        self.dispatch(ticket);
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        // Handle popups first
        if self.popup != Popup::None {
            if matches!(
                key.code,
                KeyCode::Esc | KeyCode::Char('?') | KeyCode::Enter | KeyCode::Char('q')
            ) {
                self.popup = Popup::None;
            }
            return Ok(());
        }

        match key.code {
            KeyCode::Tab => {
                self.section = match self.section {
                    Section::Search => Section::Filters,
                    Section::Filters => Section::Results,
                    Section::Results => Section::Search,
                };
                return Ok(());
            }
            KeyCode::BackTab => {
                self.section = match self.section {
                    Section::Search => Section::Results,
                    Section::Filters => Section::Search,
                    Section::Results => Section::Filters,
                };
                return Ok(());
            }
            KeyCode::PageDown => {
                self.go_to_page(PageDelta::Next);
                return Ok(());
            }
            KeyCode::PageUp => {
                self.go_to_page(PageDelta::Previous);
                return Ok(());
            }
            _ => {}
        }

        match self.section {
            Section::Search => self.handle_search_key(key),
            Section::Filters => self.handle_filter_key(key),
            Section::Results => self.handle_results_key(key)?,
        }
        Ok(())
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => self.submit_search(),
            KeyCode::Backspace => {
                self.input.pop();
            }
            KeyCode::Esc => self.input.clear(),
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.input.push(c);
            }
            _ => {}
        }
    }

    fn handle_filter_key(&mut self, key: KeyEvent) {
        let count = Filter::ALL.len();
        match key.code {
            KeyCode::Left | KeyCode::Char('h') => {
                self.selected_filter = self.selected_filter.checked_sub(1).unwrap_or(count - 1);
            }
            KeyCode::Right | KeyCode::Char('l') => {
                self.selected_filter = (self.selected_filter + 1) % count;
            }
            KeyCode::Enter | KeyCode::Char(' ') => {
                self.select_filter(Filter::ALL[self.selected_filter]);
            }
            KeyCode::Char('?') => self.popup = Popup::Help,
            KeyCode::Char(c) => {
                if let Some(filter) = Filter::from_digit(c) {
                    self.select_filter(filter);
                }
            }
            _ => {}
        }
    }

    fn handle_results_key(&mut self, key: KeyEvent) -> Result<()> {
        let count = self.search.results().len();
        match key.code {
            KeyCode::Down | KeyCode::Char('j') => {
                if count > 0 {
                    self.selected_result = (self.selected_result + 1) % count;
                }
            }
            KeyCode::Up | KeyCode::Char('k') => {
                if count > 0 {
                    self.selected_result = self.selected_result.checked_sub(1).unwrap_or(count - 1);
                }
            }
            KeyCode::Home | KeyCode::Char('g') => self.selected_result = 0,
            KeyCode::End | KeyCode::Char('G') => self.selected_result = count.saturating_sub(1),
            KeyCode::Char('n') => self.go_to_page(PageDelta::Next),
            KeyCode::Char('p') => self.go_to_page(PageDelta::Previous),
            KeyCode::Enter | KeyCode::Char('o') => self.open_selected()?,
            KeyCode::Char('?') => self.popup = Popup::Help,
            _ => {}
        }
        Ok(())
    }

    /// Open the selected image's page with the system opener
    fn open_selected(&mut self) -> Result<()> {
        if self.search.is_loading() {
            return Ok(());
        }
        let Some(image) = self.search.results().get(self.selected_result) else {
            return Ok(());
        };

        let url = image.open_url().to_string();
        let label = image.label().to_string();
        let opener = self.opener.clone().unwrap_or_else(|| default_opener().to_string());

        tracing::info!("Opening {} with {}", url, opener);
        let mut child = Command::new(&opener)
            .arg(&url)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .with_context(|| format!("Could not run {}", opener))?;

        // Reap the opener off the UI thread
        let handle = tokio::task::spawn_blocking(move || match child.wait() {
            Ok(status) if !status.success() => {
                tracing::warn!("{} exited with {}", opener, status);
            }
            Ok(_) => {}
            Err(e) => tracing::warn!("Could not wait for {}: {}", opener, e),
        });
        self.openers.push(handle);

        self.set_status(format!("Opened {}", label));
        Ok(())
    }

    /// Drain finished fetches and expire the status message
    pub fn tick(&mut self) {
        while let Ok(outcome) = self.outcome_rx.try_recv() {
            self.apply_outcome(outcome);
        }
        self.openers.retain(|handle| !handle.is_finished());

        if let Some(time) = self.status_message_time {
            if time.elapsed().as_secs() >= STATUS_TIMEOUT_SECS {
                self.status_message = None;
                self.status_message_time = None;
            }
        }
    }
}

fn default_opener() -> &'static str {
    if cfg!(target_os = "macos") {
        "open"
    } else {
        "xdg-open"
    }
}
