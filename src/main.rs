use chrono::Local;
use iced::widget::{button, column, container, row, text};
use iced::{window, Alignment, Element, Length, Size, Subscription, Task, Theme};
use std::time::Instant;
use rfd::FileDialog;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

mod clipboard;
mod config;
mod error;
mod state;
mod ui;

use clipboard::{PollEvent, SystemClipboard};
use config::AppConfig;
use state::catalog::{self, Catalog};
use state::data::{Column, SearchTerm, UnifiedRow};
use state::results::{ResultSet, ToggleRequest};

/// Main application state
struct ClipLookup {
    config: AppConfig,
    /// The disk catalog database
    catalog: Catalog,
    /// Rows currently shown in the pop-up
    results: ResultSet,
    /// Id of the most recently started lookup; results of older ones are dropped
    latest_lookup: u64,
    /// The window starts hidden and is shown on the first result
    window_shown: bool,
    database_missing: bool,
    /// Status message to display to the user
    status: String,
}

/// Application messages (events)
#[derive(Debug, Clone)]
enum Message {
    /// The clipboard poller saw new text or failed to read
    Clipboard(PollEvent),
    /// Background lookup finished
    LookupComplete {
        id: u64,
        term: SearchTerm,
        rows: Vec<UnifiedRow>,
    },
    /// User pressed a table cell; two quick presses on one cell are a double-click
    CellPressed { row: usize, column: Column },
    /// Background deletion-flag update finished
    ToggleComplete {
        request: ToggleRequest,
        result: Result<(), String>,
    },
    /// User clicked the "Select database" button
    SelectDatabase,
}

impl ClipLookup {
    /// Create a new instance of the application
    fn new(config: AppConfig) -> (Self, Task<Message>) {
        let catalog = Catalog::new(config.database_path.clone());
        let database_missing = !catalog.exists();

        let mut app = ClipLookup {
            config,
            catalog,
            results: ResultSet::new(),
            latest_lookup: 0,
            window_shown: false,
            database_missing,
            status: String::new(),
        };

        if app.database_missing {
            // Nothing could ever match, so ask for the database right away
            warn!("⚠️  Catalog not found at {}", app.catalog.path().display());
            app.status = format!("Database not found: {}", app.catalog.path().display());
            let task = app.reveal();
            return (app, task);
        }

        info!("📁 Using catalog at {}", app.catalog.path().display());
        app.status = "Watching clipboard...".to_string();
        (app, Task::none())
    }

    /// Show the pop-up (the first time) and bring it to the front
    fn reveal(&mut self) -> Task<Message> {
        let first = !self.window_shown;
        self.window_shown = true;

        window::get_latest().and_then(move |id| {
            if first {
                Task::batch([
                    window::change_mode(id, window::Mode::Windowed),
                    window::gain_focus(id),
                ])
            } else {
                window::gain_focus(id)
            }
        })
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::Clipboard(PollEvent::Search(term)) => {
                info!("🔍 Looking up '{}'", term);

                self.latest_lookup += 1;
                let id = self.latest_lookup;
                let lookup = catalog::lookup_async(self.catalog.clone(), term.clone());

                Task::perform(lookup, move |rows| Message::LookupComplete {
                    id,
                    term: term.clone(),
                    rows,
                })
            }
            Message::Clipboard(PollEvent::Failed(error)) => {
                self.results.show_error(error);
                self.status = format!("Clipboard error at {}", Local::now().format("%H:%M:%S"));
                self.reveal()
            }
            Message::LookupComplete { id, term, rows } => {
                if id != self.latest_lookup {
                    debug!("Dropping results of superseded lookup '{}'", term);
                    return Task::none();
                }

                let failed = rows.first().is_some_and(UnifiedRow::is_error);
                self.results.replace(rows);
                let now = Local::now().format("%H:%M:%S");
                self.status = if failed {
                    format!("'{}': lookup failed at {}", term, now)
                } else if self.results.is_empty() {
                    format!("'{}': no matches at {}", term, now)
                } else {
                    format!("'{}': {} rows at {}", term, self.results.len(), now)
                };

                info!("📊 '{}': {} rows", term, self.results.len());
                self.reveal()
            }
            Message::CellPressed { row, column } => {
                if !self.results.press(row, column, Instant::now()) {
                    return Task::none();
                }

                let Some(request) = self.results.toggle_request(row, column) else {
                    return Task::none();
                };

                let update = catalog::set_deleted_async(
                    self.catalog.clone(),
                    request.disk_no.clone(),
                    request.file_name.clone(),
                    request.new_value.clone(),
                );

                Task::perform(update, move |result| Message::ToggleComplete {
                    request: request.clone(),
                    result,
                })
            }
            Message::ToggleComplete { request, result } => {
                match result {
                    Ok(()) => {
                        if !self.results.apply_toggle(&request) {
                            // A newer search replaced the table; the write still happened
                            debug!(
                                "Toggle for {} finished after the table changed",
                                request.file_name
                            );
                        }
                    }
                    Err(e) => {
                        warn!("⚠️  Updating {} failed: {}", request.file_name, e);
                        self.results.fail_toggle(&request);
                        self.results.show_error(format!("Update failed: {}", e));
                        self.status = format!("Update failed at {}", Local::now().format("%H:%M:%S"));
                    }
                }

                Task::none()
            }
            Message::SelectDatabase => {
                // Show the native file picker dialog
                let file = FileDialog::new()
                    .set_title("Select Catalog Database")
                    .add_filter("SQLite database", &["db", "sqlite", "sqlite3"])
                    .pick_file();

                if let Some(path) = file {
                    self.config.database_path = path.clone();
                    self.catalog = Catalog::new(path);
                    self.database_missing = !self.catalog.exists();

                    if let Err(e) = self.config.save() {
                        warn!("⚠️  Could not save config: {}", e);
                    }

                    info!("📁 Switched catalog to {}", self.catalog.path().display());
                    self.status = format!("Using {}", self.catalog.path().display());
                }

                Task::none()
            }
        }
    }

    /// Build the user interface
    fn view(&self) -> Element<'_, Message> {
        let mut status_bar = row![text(&self.status).size(13)]
            .spacing(10)
            .align_y(Alignment::Center);

        if self.database_missing {
            status_bar = status_bar.push(
                button(text("Select database...").size(13))
                    .on_press(Message::SelectDatabase)
                    .padding([2, 8]),
            );
        }

        let content = column![
            ui::table::view(&self.results, self.config.tag_precedence),
            status_bar,
        ]
        .spacing(4)
        .padding(4);

        container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    /// Poll the clipboard for as long as the app runs
    fn subscription(&self) -> Subscription<Message> {
        Subscription::run_with_id(
            "clipboard-poller",
            clipboard::watch(SystemClipboard, self.config.poll_interval()),
        )
        .map(Message::Clipboard)
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        // Row colors are pastel, so the table reads best on a light theme
        Theme::Light
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt().with_env_filter(env_filter).init();
}

fn main() -> iced::Result {
    init_tracing();

    let config = AppConfig::load_or_default();
    let size = Size::new(config.window_width, config.window_height);

    iced::application("Clipboard Lookup", ClipLookup::update, ClipLookup::view)
        .subscription(ClipLookup::subscription)
        .theme(ClipLookup::theme)
        .window(window::Settings {
            size,
            level: window::Level::AlwaysOnTop,
            visible: false,
            ..window::Settings::default()
        })
        .run_with(move || ClipLookup::new(config))
}
