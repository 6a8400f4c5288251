// SPDX-License-Identifier: GPL-3.0-only

//! Report export and photo saving

use crate::config::ExportConfig;
use crate::constants::export::PHOTO_PREFIX;
use crate::errors::ErrorKind;
use crate::presenter::{Action, Presenter};
use crate::report::{self, ReportOptions};
use crate::session::Session;
use crate::storage::FileSaver;
use chrono::{DateTime, Local};
use tracing::{info, warn};

/// Serializes the session and hands files to a [`FileSaver`]
#[derive(Debug, Clone)]
pub struct ExportController {
    map_base_url: String,
    timestamp_format: String,
}

impl ExportController {
    pub fn new(map_base_url: impl Into<String>, timestamp_format: impl Into<String>) -> Self {
        Self {
            map_base_url: map_base_url.into(),
            timestamp_format: timestamp_format.into(),
        }
    }

    pub fn from_config(config: &ExportConfig) -> Self {
        Self::new(config.map_base_url.clone(), config.timestamp_format.clone())
    }

    /// Export the report as of now; returns the suggested file name
    pub fn export_data(&self, session: &Session, saver: &dyn FileSaver) -> String {
        self.export_data_at(session, saver, Local::now())
    }

    /// Export the report as of `at`
    pub fn export_data_at(
        &self,
        session: &Session,
        saver: &dyn FileSaver,
        at: DateTime<Local>,
    ) -> String {
        let options = ReportOptions {
            map_base_url: &self.map_base_url,
            timestamp_format: &self.timestamp_format,
        };
        let body = report::build_report(session, at, &options);
        let name = report::report_file_name(at);

        info!(
            name = %name,
            location = session.location().is_some(),
            photo = session.photo().is_some(),
            "Exporting report"
        );
        saver.save(&name, body.as_bytes());
        name
    }

    /// Save the captured still as a PNG file
    pub fn save_photo(
        &self,
        session: &Session,
        saver: &dyn FileSaver,
        presenter: &mut dyn Presenter,
    ) -> Option<String> {
        let Some(photo) = session.photo() else {
            presenter.show_error(
                Action::SavePhoto,
                ErrorKind::Usage,
                "Please take a photo first.",
            );
            return None;
        };

        match photo.png_bytes() {
            Ok(png) => {
                let name = format!(
                    "{}{}.png",
                    PHOTO_PREFIX,
                    photo.captured_at.format("%Y%m%d_%H%M%S")
                );
                saver.save(&name, &png);
                presenter.show_notice(&format!("Photo saved as {}", name));
                Some(name)
            }
            Err(e) => {
                warn!(error = %e, "Stored photo could not be decoded");
                presenter.show_error(Action::SavePhoto, e.kind(), &e.user_message());
                None
            }
        }
    }
}
