// src/main.rs
use std::path::PathBuf;

use iced::widget::{button, column, container, row, scrollable, text, text_input, Column, Row};
use iced::{executor, window, Application, Command, Element, Length, Settings, Size, Theme};
use rfd::AsyncFileDialog;
use tracing_subscriber::EnvFilter;

mod api_handler;
mod csv_handler;
mod data_types;
mod error;
mod normalizer;

use api_handler::ApiClient;
use data_types::{InputMode, Record, SessionState};
use error::AppError;

const TEXT_PLACEHOLDER: &str = r#"Enter data in JSON format (e.g., [{"name": "John Doe", "age": 44, "city": "Springfield"}])"#;

pub fn main() -> iced::Result {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    AnonViewer::run(Settings {
        window: window::Settings {
            size: Size::new(1024.0, 768.0),
            ..window::Settings::default()
        },
        ..Settings::default()
    })
}

struct AnonViewer {
    api: ApiClient,
    session: SessionState,
    // Monotonic submit counter; responses carrying an older value are stale.
    generation: u64,
}

#[derive(Debug, Clone)]
enum Message {
    SetMode(InputMode),
    TextChanged(String),
    PickFile,
    FileSelected(Option<PathBuf>),
    SubmitText,
    SubmitFile,
    SubmitFinished(u64, Result<Vec<Record>, AppError>),
    ExportCsv,
    ExportFinished(bool),
}

impl Application for AnonViewer {
    type Executor = executor::Default;
    type Message = Message;
    type Theme = Theme;
    type Flags = ();

    fn new(_flags: ()) -> (Self, Command<Message>) {
        (
            AnonViewer {
                api: ApiClient::new(),
                session: SessionState::default(),
                generation: 0,
            },
            Command::none(),
        )
    }

    fn title(&self) -> String {
        String::from("Data Anonymization")
    }

    fn update(&mut self, message: Message) -> Command<Message> {
        match message {
            Message::SetMode(mode) => {
                self.session.set_mode(mode);
                Command::none()
            }

            Message::TextChanged(content) => {
                self.session.set_text(content);
                Command::none()
            }

            Message::PickFile => Command::perform(pick_input_file(), Message::FileSelected),

            Message::FileSelected(path_opt) => {
                if let Some(path) = path_opt {
                    self.session.set_file(path);
                }
                Command::none()
            }

            Message::SubmitText => match ApiClient::parse_input(&self.session.text_content) {
                Ok(data) => {
                    let generation = self.next_generation();
                    let api = self.api.clone();
                    Command::perform(
                        async move { api.submit_text(data).await },
                        move |outcome| Message::SubmitFinished(generation, outcome),
                    )
                }
                Err(err) => {
                    self.session.apply_outcome(Err(err));
                    Command::none()
                }
            },

            Message::SubmitFile => match self.session.file_path.clone() {
                Some(path) => {
                    let generation = self.next_generation();
                    let api = self.api.clone();
                    Command::perform(
                        async move { api.submit_file(&path).await },
                        move |outcome| Message::SubmitFinished(generation, outcome),
                    )
                }
                None => {
                    self.session.apply_outcome(Err(AppError::MissingInput));
                    Command::none()
                }
            },

            Message::SubmitFinished(generation, outcome) => {
                if generation != self.generation {
                    tracing::debug!(
                        generation,
                        current = self.generation,
                        "discarding response from superseded submission"
                    );
                    return Command::none();
                }
                self.session.apply_outcome(outcome);
                Command::none()
            }

            Message::ExportCsv => {
                let records = self.session.display.records.clone().unwrap_or_default();
                Command::perform(csv_handler::export(records), Message::ExportFinished)
            }

            Message::ExportFinished(_written) => Command::none(),
        }
    }

    fn view(&self) -> Element<Message> {
        let mut content = column![
            text("Data Anonymization").size(28),
            self.mode_switch(),
            self.input_area(),
        ]
        .spacing(15)
        .padding(20);

        if let Some(error) = &self.session.display.error {
            content = content.push(text(error).size(16));
        }

        content = content.push(self.results_area());

        container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

impl AnonViewer {
    fn next_generation(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    fn mode_switch(&self) -> Element<Message> {
        row![
            button(text("Enter Text"))
                .on_press(Message::SetMode(InputMode::Text))
                .padding(10),
            button(text("Upload File"))
                .on_press(Message::SetMode(InputMode::File))
                .padding(10),
        ]
        .spacing(10)
        .into()
    }

    fn input_area(&self) -> Element<Message> {
        match self.session.mode {
            InputMode::Text => column![
                text_input(TEXT_PLACEHOLDER, &self.session.text_content)
                    .on_input(Message::TextChanged)
                    .padding(10),
                button(text("Anonymize"))
                    .on_press(Message::SubmitText)
                    .padding(10),
            ]
            .spacing(10)
            .into(),

            InputMode::File => {
                let staged = self
                    .session
                    .file_path
                    .as_deref()
                    .map(|path| path.display().to_string())
                    .unwrap_or_else(|| String::from("No file selected"));

                column![
                    row![
                        button(text("Choose File"))
                            .on_press(Message::PickFile)
                            .padding(10),
                        text(staged).size(16),
                    ]
                    .spacing(10),
                    button(text("Upload and Anonymize"))
                        .on_press(Message::SubmitFile)
                        .padding(10),
                ]
                .spacing(10)
                .into()
            }
        }
    }

    fn results_area(&self) -> Element<Message> {
        match &self.session.display.records {
            Some(records) if !records.is_empty() => column![
                text("Anonymized Data:").size(20),
                self.render_table(records),
                button(text("Export to CSV"))
                    .on_press(Message::ExportCsv)
                    .padding(10),
            ]
            .spacing(10)
            .into(),

            Some(_) => text("No anonymized data available.").size(16).into(),

            None => text("Enter JSON data or upload a file to anonymize.")
                .size(16)
                .into(),
        }
    }

    fn render_table(&self, records: &[Record]) -> Element<Message> {
        let headers = records[0].headers();

        let header_row = Row::with_children(
            headers
                .iter()
                .map(|header| header_cell(header))
                .collect::<Vec<_>>(),
        )
        .spacing(1);

        let body = records.iter().map(|record| {
            Row::with_children(
                record
                    .cells(headers.len())
                    .into_iter()
                    .map(data_cell)
                    .collect::<Vec<_>>(),
            )
            .spacing(1)
            .into()
        });

        let table = Column::with_children(
            std::iter::once(header_row.into())
                .chain(body)
                .collect::<Vec<_>>(),
        )
        .spacing(1);

        scrollable(table).height(Length::Fill).into()
    }
}

fn header_cell(label: &str) -> Element<'static, Message> {
    container(text(label).size(18))
        .width(Length::Fixed(140.0))
        .padding(5)
        .into()
}

fn data_cell(value: String) -> Element<'static, Message> {
    container(text(value))
        .width(Length::Fixed(140.0))
        .padding(5)
        .into()
}

async fn pick_input_file() -> Option<PathBuf> {
    AsyncFileDialog::new()
        .add_filter("Spreadsheet Files", &["csv", "xls", "xlsx"])
        .pick_file()
        .await
        .map(|handle| handle.path().to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map};

    fn app() -> AnonViewer {
        AnonViewer::new(()).0
    }

    fn record(id: u64, name: &str) -> Record {
        let mut fields = Map::new();
        fields.insert("name".to_string(), json!(name));
        Record { id, fields }
    }

    #[test]
    fn stale_generation_responses_never_overwrite_the_display() {
        let mut app = app();
        app.session.set_text(r#"[{"name":"a"}]"#.to_string());

        // Two overlapping submissions; only the second is current.
        let _ = app.update(Message::SubmitText);
        let _ = app.update(Message::SubmitText);
        assert_eq!(app.generation, 2);

        let _ = app.update(Message::SubmitFinished(1, Ok(vec![record(1, "stale")])));
        assert!(app.session.display.records.is_none());

        let _ = app.update(Message::SubmitFinished(2, Ok(vec![record(1, "fresh")])));
        let records = app.session.display.records.as_ref().unwrap();
        assert_eq!(records[0].csv_value("name"), "fresh");
    }

    #[test]
    fn malformed_text_fails_locally_without_dispatch() {
        let mut app = app();
        app.session.set_text("{not json".to_string());

        let _ = app.update(Message::SubmitText);

        assert_eq!(app.generation, 0, "no submission should have been issued");
        assert_eq!(
            app.session.display.error.as_deref(),
            Some("Invalid JSON format. Please enter valid JSON data.")
        );
        assert_eq!(app.session.display.records.as_ref().map(Vec::len), Some(0));
    }

    #[test]
    fn file_submit_without_a_file_fails_locally() {
        let mut app = app();
        app.session.set_mode(InputMode::File);

        let _ = app.update(Message::SubmitFile);

        assert_eq!(app.generation, 0);
        assert_eq!(
            app.session.display.error.as_deref(),
            Some("Please upload a file")
        );
        assert!(app.session.display.records.is_none());
    }

    #[test]
    fn successful_outcome_clears_a_previous_error() {
        let mut app = app();
        let _ = app.update(Message::SubmitFile);
        assert!(app.session.display.error.is_some());

        let _ = app.update(Message::SubmitFinished(0, Ok(vec![record(1, "X")])));
        assert!(app.session.display.error.is_none());
        assert_eq!(app.session.display.records.as_ref().map(Vec::len), Some(1));
    }
}
