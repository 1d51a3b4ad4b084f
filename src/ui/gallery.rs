/// Gallery screen: search box, photo grid and pagination
use std::collections::HashMap;

use iced::widget::image::Handle;
use iced::widget::{button, column, container, image, row, scrollable, text, text_input};
use iced::{Alignment, ContentFit, Element, Length};

use crate::state::catalog::{Catalog, CatalogEvent, GridState};
use crate::state::data::GalleryItem;
use crate::Message;

const COLUMNS: usize = 4;
const TILE_WIDTH: f32 = 220.0;
const TILE_HEIGHT: f32 = 275.0;

pub fn scroll_id() -> scrollable::Id {
    scrollable::Id::new("gallery")
}

/// Everything the gallery screen owns
pub struct GalleryScreen {
    pub catalog: Catalog,
    /// Text in the search box; only read when a search is submitted
    pub query_input: String,
    /// Thumbnails for the current result set, by photo id
    pub thumbnails: HashMap<String, Handle>,
}

impl GalleryScreen {
    pub fn new() -> Self {
        let mut catalog = Catalog::new();
        catalog.subscribe(|event| match event {
            CatalogEvent::StaleDiscarded(intent) => {
                tracing::debug!("Dropped late response for {:?}", intent)
            }
            other => tracing::trace!("Catalog: {:?}", other),
        });

        Self {
            catalog,
            query_input: String::new(),
            thumbnails: HashMap::new(),
        }
    }
}

pub fn view(screen: &GalleryScreen) -> Element<'_, Message> {
    let catalog = &screen.catalog;

    let header = column![
        text("Thank You Card Generator").size(40),
        text("Create beautiful personalized cards with stunning images").size(18),
        row![
            text_input(
                "Search for images (e.g., nature, city, abstract)...",
                &screen.query_input
            )
            .on_input(Message::QueryChanged)
            .on_submit(Message::SearchSubmitted)
            .padding(12)
            .width(Length::Fixed(520.0)),
            button("Search")
                .on_press(Message::SearchSubmitted)
                .padding(12),
        ]
        .spacing(8)
        .align_y(Alignment::Center),
    ]
    .spacing(12)
    .align_x(Alignment::Center);

    let body: Element<Message> = match catalog.grid() {
        GridState::Loading { placeholders } => {
            grid((0..placeholders).map(|_| placeholder("Loading...")).collect())
        }
        GridState::Empty => container(text("No images found. Try a different search term.").size(20))
            .padding(60)
            .into(),
        GridState::Items(items) => grid(
            items
                .iter()
                .map(|item| tile(item, screen.thumbnails.get(&item.id)))
                .collect(),
        ),
    };

    let mut content = column![header]
        .spacing(32)
        .padding(40)
        .align_x(Alignment::Center);
    if let Some(query) = &catalog.search_state().query {
        content = content.push(text(format!("Results for \"{}\"", query)).size(20));
    }
    content = content.push(body);

    if let Some(pages) = catalog.pagination() {
        content = content.push(
            row![
                button("Previous")
                    .on_press_maybe(pages.can_previous.then_some(Message::PreviousPage))
                    .padding(10),
                text(format!("Page {} of {}", pages.page, pages.last)),
                button("Next")
                    .on_press_maybe(pages.can_next.then_some(Message::NextPage))
                    .padding(10),
            ]
            .spacing(16)
            .align_y(Alignment::Center),
        );
    }

    if catalog.can_return_to_random() {
        content = content.push(
            button("Load Random Images")
                .on_press(Message::RandomRequested)
                .style(button::secondary)
                .padding(10),
        );
    }

    scrollable(container(content).center_x(Length::Fill))
        .id(scroll_id())
        .height(Length::Fill)
        .into()
}

/// Lay tiles out in rows of `COLUMNS`
fn grid(tiles: Vec<Element<'_, Message>>) -> Element<'_, Message> {
    let mut rows = column![].spacing(24);
    let mut current = row![].spacing(24);
    let mut in_row = 0;

    for tile in tiles {
        current = current.push(tile);
        in_row += 1;
        if in_row == COLUMNS {
            rows = rows.push(current);
            current = row![].spacing(24);
            in_row = 0;
        }
    }
    if in_row > 0 {
        rows = rows.push(current);
    }

    rows.into()
}

fn tile<'a>(item: &'a GalleryItem, thumbnail: Option<&Handle>) -> Element<'a, Message> {
    let picture: Element<Message> = match thumbnail {
        Some(handle) => image(handle.clone())
            .content_fit(ContentFit::Cover)
            .width(Length::Fixed(TILE_WIDTH))
            .height(Length::Fixed(TILE_HEIGHT))
            .into(),
        None => placeholder(item.alt_text()),
    };

    button(
        column![
            picture,
            text(format!("Photo by {}", item.user.name)).size(13),
            text("Click to customize").size(11),
        ]
        .spacing(4),
    )
    .on_press(Message::PhotoSelected(item.id.clone()))
    .style(button::text)
    .into()
}

fn placeholder(label: &str) -> Element<'_, Message> {
    container(text(label).size(12))
        .center_x(Length::Fixed(TILE_WIDTH))
        .center_y(Length::Fixed(TILE_HEIGHT))
        .style(container::rounded_box)
        .into()
}
