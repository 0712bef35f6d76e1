use futures::StreamExt;
use iced::Task;
use tracing::debug;

use crate::api::ApiClient;
use crate::application::{CoordinatorEvent, DownloadCoordinator};
use crate::config::AppConfig;
use crate::ui::{DownloadMessage, DownloadView};

pub struct DownloadApp {
    view: DownloadView,
    coordinator: DownloadCoordinator,
}

impl DownloadApp {
    pub fn new(config: &AppConfig) -> Self {
        let api_client = ApiClient::new(config.api_config());

        Self {
            view: DownloadView::default(),
            coordinator: DownloadCoordinator::new(api_client, config.poll_interval()),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Message {
    UiMessage(DownloadMessage),
    /// A search, start-job call or status check finished
    Coordinator(CoordinatorEvent),
}

pub fn update(app: &mut DownloadApp, message: Message) -> Task<Message> {
    match message {
        Message::UiMessage(ui_msg) => {
            app.view.update(ui_msg.clone());

            if !app.coordinator.accepts_intents() {
                return Task::none();
            }

            let work = match ui_msg {
                DownloadMessage::SearchPressed => app.coordinator.discover(&app.view.source_link),
                DownloadMessage::PlatformPressed(platform) => {
                    // Copy the link out: starting a job mutates the coordinator
                    let link = app
                        .coordinator
                        .candidates()
                        .and_then(|set| set.get(platform))
                        .map(str::to_string);
                    match link {
                        Some(link) => app.coordinator.start_download(&link),
                        None => return Task::none(),
                    }
                }
                DownloadMessage::SourceLinkChanged(_) => return Task::none(),
            };

            match work {
                Ok(work) => return Task::perform(work, Message::Coordinator),
                Err(e) => debug!(reason = %e, "intent rejected"),
            }
        }
        Message::Coordinator(event) => {
            // A freshly accepted job hands back its poll cycle
            if let Some(cycle) = app.coordinator.apply(event) {
                return Task::stream(cycle.map(Message::Coordinator));
            }
        }
    }
    Task::none()
}

pub fn view(app: &DownloadApp) -> iced::Element<'_, Message> {
    app.view.view(&app.coordinator).map(Message::UiMessage)
}
