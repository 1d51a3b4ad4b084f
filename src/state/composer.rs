/// Customize-screen state
///
/// Holds the handed-off photo, the user's customization and the render
/// target (the decoded background). Mutations notify listeners so the
/// preview can be redrawn; exports are guarded so only one runs at a time.
use std::path::{Path, PathBuf};

use crate::card::background::Backdrop;
use crate::card::export::ExportJob;
use crate::card::raster::CardScene;
use crate::card::OVERSAMPLE;
use crate::error::CardError;
use crate::state::customization::{CardCustomization, FontChoice};
use crate::state::data::GalleryItem;
use crate::state::handoff::Handoff;
use crate::state::notice::Notice;
use crate::state::observer::Listeners;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComposerEvent {
    /// Name, font or color changed
    Customized,
    /// The background finished loading
    BackdropReady,
    ExportStarted,
    ExportFinished,
}

#[derive(Debug)]
pub struct Composer {
    item: GalleryItem,
    customization: CardCustomization,
    backdrop: Option<Backdrop>,
    exporting: bool,
    listeners: Listeners<ComposerEvent>,
}

impl Composer {
    /// Open the screen with the pending selection.
    ///
    /// Fails with `NoSelection` when nothing was handed off; the caller
    /// sends the user back to the gallery.
    pub fn mount(handoff: &Handoff) -> Result<Self, CardError> {
        let item = handoff.take().ok_or(CardError::NoSelection)?;
        tracing::info!("Customizing photo {}", item.id);
        let customization = CardCustomization::new(item.display_url());

        Ok(Self {
            item,
            customization,
            backdrop: None,
            exporting: false,
            listeners: Listeners::default(),
        })
    }

    pub fn subscribe(&mut self, listener: impl Fn(&ComposerEvent) + Send + 'static) {
        self.listeners.subscribe(listener);
    }

    pub fn item(&self) -> &GalleryItem {
        &self.item
    }

    pub fn customization(&self) -> &CardCustomization {
        &self.customization
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.customization.name = name.into();
        self.listeners.notify(&ComposerEvent::Customized);
    }

    pub fn set_font(&mut self, font: FontChoice) {
        if self.customization.font != font {
            self.customization.font = font;
            self.listeners.notify(&ComposerEvent::Customized);
        }
    }

    /// Set the font by name; names outside the fixed set are ignored
    #[cfg(test)]
    pub fn set_font_named(&mut self, name: &str) -> bool {
        match name.parse::<FontChoice>() {
            Ok(font) => {
                self.set_font(font);
                true
            }
            Err(e) => {
                tracing::warn!("Ignoring font change: {}", e);
                false
            }
        }
    }

    /// Any string is accepted; rendering falls back for invalid colors
    pub fn set_color(&mut self, color: impl Into<String>) {
        self.customization.color = color.into();
        self.listeners.notify(&ComposerEvent::Customized);
    }

    pub fn reset_style(&mut self) {
        self.customization.reset_style();
        self.listeners.notify(&ComposerEvent::Customized);
    }

    pub fn attach_backdrop(&mut self, backdrop: Backdrop) {
        self.backdrop = Some(backdrop);
        self.listeners.notify(&ComposerEvent::BackdropReady);
    }

    pub fn has_backdrop(&self) -> bool {
        self.backdrop.is_some()
    }

    /// Scene for the on-screen preview, once the background is loaded
    pub fn preview_scene(&self) -> Option<CardScene> {
        self.backdrop.as_ref().map(|backdrop| CardScene {
            background: backdrop.preview.clone(),
            customization: self.customization.clone(),
        })
    }

    pub fn is_exporting(&self) -> bool {
        self.exporting
    }

    /// Whether the download control should be enabled
    pub fn can_export(&self) -> bool {
        !self.exporting && !self.customization.trimmed_name().is_empty()
    }

    /// Validate and claim the export slot.
    ///
    /// On success the composer is marked as exporting until
    /// [`Composer::finish_export`] is called with the job's result.
    pub fn begin_export(&mut self, download_dir: &Path, timestamp_ms: i64) -> Result<ExportJob, CardError> {
        if self.exporting {
            tracing::debug!("Export already running, ignoring trigger");
            return Err(CardError::ExportInProgress);
        }
        if self.customization.trimmed_name().is_empty() {
            return Err(CardError::Validation);
        }
        let backdrop = self.backdrop.as_ref().ok_or(CardError::RenderTargetMissing)?;

        let job = ExportJob {
            scene: CardScene {
                background: backdrop.full.clone(),
                customization: self.customization.clone(),
            },
            scale: OVERSAMPLE,
            timestamp_ms,
            download_dir: download_dir.to_path_buf(),
        };

        self.exporting = true;
        self.listeners.notify(&ComposerEvent::ExportStarted);
        Ok(job)
    }

    /// Release the export slot and report the outcome
    pub fn finish_export(&mut self, result: &Result<PathBuf, CardError>) -> Notice {
        self.exporting = false;
        self.listeners.notify(&ComposerEvent::ExportFinished);
        match result {
            Ok(_) => Notice::success("Card downloaded successfully!"),
            Err(e) => {
                tracing::error!("Download error: {}", e);
                Notice::error("Failed to download card. Please try again.")
            }
        }
    }
}

/// Notice for an export that was refused before it started
pub fn refusal_notice(error: &CardError) -> Option<Notice> {
    match error {
        CardError::Validation => Some(Notice::error("Please enter your name")),
        CardError::RenderTargetMissing => Some(Notice::error("Card preview not found")),
        CardError::NoSelection => Some(Notice::error("No image selected. Redirecting...")),
        CardError::ExportFailed(_) => Some(Notice::error("Failed to download card. Please try again.")),
        // Silently ignored: the control is already disabled
        CardError::ExportInProgress => None,
    }
}
