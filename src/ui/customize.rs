/// Customize screen: live card preview and personalization controls
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use iced::font::Family;
use iced::widget::image::Handle;
use iced::widget::{button, column, container, image, row, text, text_input, Row, Space};
use iced::{Alignment, Background, Border, Color, Element, Font, Length, Theme};

use crate::card::raster::{Rasterizer, SoftwareRasterizer};
use crate::card::{CARD_HEIGHT, CARD_WIDTH};
use crate::color::parse_hex;
use crate::state::composer::{Composer, ComposerEvent};
use crate::state::customization::FontChoice;
use crate::Message;

/// Preset swatches offered next to the hex field
const SWATCHES: [&str; 8] = [
    "#ffffff", "#000000", "#f5d76e", "#e74c3c", "#3498db", "#2ecc71", "#9b59b6", "#ff9ff3",
];

pub struct CustomizeScreen {
    pub composer: Composer,
    /// Which customize mount this is; stale async results are matched against it
    pub mount: u64,
    /// Last rendered preview; `None` until the background has loaded
    pub preview: Option<Handle>,
    /// Set by the composer listener whenever the preview is out of date
    dirty: Arc<AtomicBool>,
}

impl CustomizeScreen {
    pub fn new(mut composer: Composer, mount: u64) -> Self {
        let dirty = Arc::new(AtomicBool::new(false));
        let flag = dirty.clone();
        composer.subscribe(move |event| {
            if matches!(event, ComposerEvent::Customized | ComposerEvent::BackdropReady) {
                flag.store(true, Ordering::Release);
            }
        });

        Self {
            composer,
            mount,
            preview: None,
            dirty,
        }
    }

    /// Re-render the preview if anything changed since the last render
    pub fn refresh_preview(&mut self) {
        if !self.dirty.swap(false, Ordering::AcqRel) {
            return;
        }
        let Some(scene) = self.composer.preview_scene() else {
            return;
        };

        match SoftwareRasterizer.rasterize(&scene, 1) {
            Ok(bitmap) => {
                let (width, height) = bitmap.dimensions();
                self.preview = Some(Handle::from_rgba(width, height, bitmap.into_raw()));
            }
            Err(e) => tracing::error!("Preview render failed: {}", e),
        }
    }
}

/// Map a card font onto the closest system family
pub fn font_for(choice: FontChoice) -> Font {
    let family = match choice {
        FontChoice::Serif => Family::Serif,
        FontChoice::Sans => Family::SansSerif,
        FontChoice::Cursive => Family::Cursive,
        FontChoice::Mono => Family::Monospace,
    };
    Font {
        family,
        ..Font::DEFAULT
    }
}

pub fn view(screen: &CustomizeScreen) -> Element<'_, Message> {
    let composer = &screen.composer;
    let card = composer.customization();
    let item = composer.item();

    let preview: Element<Message> = match &screen.preview {
        Some(handle) => image(handle.clone())
            .width(Length::Fixed(CARD_WIDTH as f32))
            .height(Length::Fixed(CARD_HEIGHT as f32))
            .into(),
        None if composer.has_backdrop() => container(text("Rendering preview..."))
            .center_x(Length::Fixed(CARD_WIDTH as f32))
            .center_y(Length::Fixed(CARD_HEIGHT as f32))
            .style(container::rounded_box)
            .into(),
        None => container(text("Loading image..."))
            .center_x(Length::Fixed(CARD_WIDTH as f32))
            .center_y(Length::Fixed(CARD_HEIGHT as f32))
            .style(container::rounded_box)
            .into(),
    };

    let fonts = FontChoice::ALL
        .iter()
        .fold(Row::new().spacing(8), |fonts, &choice| {
            let style: fn(&Theme, button::Status) -> button::Style = if choice == card.font {
                button::primary
            } else {
                button::secondary
            };
            fonts.push(
                button(text(choice.to_string()).font(font_for(choice)))
                    .on_press(Message::FontSelected(choice))
                    .style(style)
                    .padding(8),
            )
        });

    let swatches = SWATCHES.iter().fold(Row::new().spacing(6), |swatches, &hex| {
        swatches.push(
            button(swatch(hex, 22.0))
                .on_press(Message::ColorChanged(hex.to_string()))
                .style(button::text)
                .padding(2),
        )
    });

    let label = if composer.is_exporting() {
        "Generating..."
    } else {
        "Download Card"
    };

    let options = column![
        text("Personalization Options").size(24),
        text("Your Name"),
        text_input("Enter your name", &card.name)
            .on_input(Message::NameChanged)
            .padding(10),
        text("Font Style"),
        fonts,
        text("Text Color"),
        row![
            swatch(&card.color, 32.0),
            text_input("#ffffff", &card.color)
                .on_input(Message::ColorChanged)
                .font(Font::MONOSPACE)
                .padding(8),
        ]
        .spacing(8)
        .align_y(Alignment::Center),
        swatches,
        text("Choose a color that contrasts well with your image").size(12),
        button("Reset style")
            .on_press_maybe((!card.is_default_style()).then_some(Message::StyleReset))
            .style(button::secondary),
        button(text(label))
            .on_press_maybe(composer.can_export().then_some(Message::DownloadRequested))
            .style(button::success)
            .padding(12)
            .width(Length::Fill),
        column![
            text(item.attribution()).size(13),
            text(item.author_link()).size(11),
        ]
        .spacing(2),
    ]
    .spacing(12)
    .width(Length::Fixed(360.0));

    let content = column![
        button("← Back to Gallery")
            .on_press(Message::BackToGallery)
            .style(button::text),
        text("Customize Your Card").size(36),
        row![preview, options].spacing(40),
    ]
    .spacing(20)
    .padding(40);

    container(content).center_x(Length::Fill).into()
}

/// Square filled with `hex`; invalid colors show as an empty outline
fn swatch(hex: &str, size: f32) -> Element<'static, Message> {
    let fill = parse_hex(hex).map(|c| {
        Background::Color(Color::from_rgba8(c[0], c[1], c[2], f32::from(c[3]) / 255.0))
    });

    container(Space::new(Length::Fixed(size), Length::Fixed(size)))
        .style(move |_theme| container::Style {
            background: fill,
            border: Border {
                color: Color::from_rgb8(128, 128, 128),
                width: 1.0,
                radius: 4.0.into(),
            },
            ..container::Style::default()
        })
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::background::fixtures::backdrop;
    use crate::state::data::fixtures::item;
    use crate::state::handoff::Handoff;
    use ::image::Rgba;

    fn screen() -> CustomizeScreen {
        let handoff = Handoff::new();
        handoff.put(&item("abc123")).unwrap();
        CustomizeScreen::new(Composer::mount(&handoff).unwrap(), 1)
    }

    #[test]
    fn test_preview_waits_for_backdrop() {
        let mut screen = screen();
        screen.composer.set_name("Jane");
        screen.refresh_preview();
        assert!(screen.preview.is_none());

        screen.composer.attach_backdrop(backdrop(Rgba([40, 40, 40, 255])));
        screen.refresh_preview();
        assert!(screen.preview.is_some());
    }

    #[test]
    fn test_font_families() {
        assert_eq!(font_for(FontChoice::Serif).family, Family::Serif);
        assert_eq!(font_for(FontChoice::Mono).family, Family::Monospace);
    }
}
