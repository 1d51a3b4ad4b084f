/// UI module
///
/// This module contains the screens and shared widgets:
/// - Photo gallery with search and pagination (gallery.rs)
/// - Card customization with live preview (customize.rs)
/// - Notice strip shown over both screens

pub mod customize;
pub mod gallery;

use iced::widget::{column, container, text, Column};
use iced::{Element, Length, Theme};

use crate::state::notice::{Level, Notices};
use crate::Message;

/// Stack of current notices, newest last
pub fn notices(notices: &Notices) -> Element<'_, Message> {
    let list = notices.iter().fold(Column::new().spacing(6), |list, notice| {
        let style: fn(&Theme) -> text::Style = match notice.level {
            Level::Info => text::primary,
            Level::Success => text::success,
            Level::Error => text::danger,
        };
        list.push(
            container(text(&notice.text).style(style))
                .padding(10)
                .style(container::rounded_box),
        )
    });

    container(column![list])
        .width(Length::Fill)
        .padding(12)
        .into()
}
