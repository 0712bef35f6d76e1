use iced::{
    widget::{button, column, text, text_input, Space},
    Element, Length,
};

use crate::{
    application::DownloadCoordinator,
    domain::{LifecyclePhase, Platform},
};

/// Main view state
#[derive(Default)]
pub struct DownloadView {
    pub source_link: String,
}

#[derive(Debug, Clone)]
pub enum DownloadMessage {
    SourceLinkChanged(String),
    SearchPressed,
    PlatformPressed(Platform),
}

impl DownloadView {
    pub fn update(&mut self, message: DownloadMessage) {
        match message {
            DownloadMessage::SourceLinkChanged(link) => {
                self.source_link = link;
            }
            DownloadMessage::SearchPressed | DownloadMessage::PlatformPressed(_) => {
                // Will be handled by the app
            }
        }
    }

    pub fn view<'a>(&'a self, coordinator: &'a DownloadCoordinator) -> Element<'a, DownloadMessage> {
        let enabled = coordinator.accepts_intents();
        let search_label = if coordinator.phase() == LifecyclePhase::SearchingPlatforms {
            "Searching..."
        } else {
            "Search platforms"
        };

        let mut content = column![
            text("Music Downloader").size(32),
            Space::new().height(Length::Fixed(20.0)),
            text("Spotify link:").size(16),
            text_input("Paste the Spotify link...", &self.source_link)
                .on_input(DownloadMessage::SourceLinkChanged)
                .on_submit(DownloadMessage::SearchPressed)
                .padding(10),
            button(search_label)
                .on_press_maybe(enabled.then_some(DownloadMessage::SearchPressed))
                .padding([10, 20]),
            Space::new().height(Length::Fixed(10.0)),
            text(coordinator.status_message()).size(14),
            Space::new().height(Length::Fixed(20.0)),
        ];

        if let Some(candidates) = coordinator.candidates() {
            for (platform, _) in candidates.available() {
                content = content.push(
                    button(text(format!("Download from {}", platform)))
                        .on_press_maybe(enabled.then_some(DownloadMessage::PlatformPressed(platform)))
                        .padding([10, 20]),
                );
            }
        }

        if let Some(job_id) = coordinator.active_job() {
            let detail = if coordinator.is_polling() {
                " (checking status)"
            } else if coordinator.phase().is_terminal() {
                " (finished)"
            } else {
                ""
            };
            content = content.push(text(format!("Job {}{}", job_id, detail)).size(12));
        }

        content.padding(20).spacing(10).into()
    }
}
