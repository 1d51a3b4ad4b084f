use std::path::PathBuf;
use std::time::{Duration, Instant};

use chrono::Utc;
use iced::widget::image::Handle;
use iced::widget::{column, scrollable};
use iced::{Element, Subscription, Task, Theme};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod card;
mod color;
mod config;
mod error;
mod source;
mod state;
mod ui;

use card::background::{prepare_backdrop, Backdrop};
use card::export::export_card;
use config::Config;
use error::{CardError, SourceError};
use source::{UnsplashClient, RANDOM_BATCH_SIZE, SEARCH_PAGE_SIZE};
use state::catalog::{Completion, Fetched, Intent, Ticket};
use state::composer::{refusal_notice, Composer};
use state::customization::FontChoice;
use state::handoff::Handoff;
use state::notice::{Notice, Notices};
use state::route::Route;
use ui::customize::CustomizeScreen;
use ui::gallery::GalleryScreen;

/// The screen currently mounted
enum Screen {
    Gallery(GalleryScreen),
    Customize(CustomizeScreen),
}

/// Main application state
struct ThanksCard {
    config: Config,
    client: UnsplashClient,
    /// Selection passed from the gallery to the customize screen
    handoff: Handoff,
    screen: Screen,
    /// Bumped on every customize mount; async results carry the mount they belong to
    mounts: u64,
    notices: Notices,
}

/// Application messages (events)
#[derive(Debug, Clone)]
enum Message {
    // Gallery
    QueryChanged(String),
    SearchSubmitted,
    RandomRequested,
    PreviousPage,
    NextPage,
    /// A catalog fetch finished
    Fetched(Ticket, Result<Fetched, SourceError>),
    /// A grid thumbnail finished downloading
    ThumbnailLoaded {
        generation: u64,
        id: String,
        result: Result<Vec<u8>, SourceError>,
    },
    PhotoSelected(String),

    // Customize
    NameChanged(String),
    FontSelected(FontChoice),
    ColorChanged(String),
    StyleReset,
    BackdropLoaded {
        mount: u64,
        result: Result<Backdrop, SourceError>,
    },
    DownloadRequested,
    ExportFinished {
        mount: u64,
        /// Tracking URL of the photo that was exported
        download_location: String,
        result: Result<PathBuf, CardError>,
    },
    DownloadTracked,
    BackToGallery,

    /// Periodic tick used to expire notices
    Tick(Instant),
}

impl ThanksCard {
    fn new(config: Config, client: UnsplashClient, start: Route) -> (Self, Task<Message>) {
        let mut app = ThanksCard {
            config,
            client,
            handoff: Handoff::new(),
            screen: Screen::Gallery(GalleryScreen::new()),
            mounts: 0,
            notices: Notices::default(),
        };
        let task = app.navigate(start);
        (app, task)
    }

    /// Mount the screen for `route` and start whatever it loads
    fn navigate(&mut self, route: Route) -> Task<Message> {
        tracing::debug!("Navigating to {}", route.path());
        match route {
            Route::Gallery => {
                let mut screen = GalleryScreen::new();
                let ticket = screen.catalog.start();
                self.screen = Screen::Gallery(screen);
                fetch(&self.client, ticket)
            }
            Route::Customize => match Composer::mount(&self.handoff) {
                Ok(composer) => {
                    self.mounts += 1;
                    let mount = self.mounts;
                    let url = composer.customization().image_url.clone();
                    self.screen = Screen::Customize(CustomizeScreen::new(composer, mount));
                    Task::perform(load_backdrop(self.client.clone(), url), move |result| {
                        Message::BackdropLoaded { mount, result }
                    })
                }
                Err(e) => {
                    self.notices.extend(refusal_notice(&e));
                    self.navigate(Route::Gallery)
                }
            },
        }
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        let task = match self.screen {
            Screen::Gallery(_) => self.update_gallery(message),
            Screen::Customize(_) => self.update_customize(message),
        };

        if let Screen::Customize(screen) = &mut self.screen {
            screen.refresh_preview();
        }
        task
    }

    fn update_gallery(&mut self, message: Message) -> Task<Message> {
        let Screen::Gallery(screen) = &mut self.screen else {
            return Task::none();
        };

        match message {
            Message::QueryChanged(query) => {
                screen.query_input = query;
                Task::none()
            }
            Message::SearchSubmitted => {
                let ticket = screen.catalog.submit_search(&screen.query_input);
                fetch(&self.client, ticket)
            }
            Message::RandomRequested => {
                screen.query_input.clear();
                let ticket = screen.catalog.show_random();
                fetch(&self.client, ticket)
            }
            Message::NextPage => match screen.catalog.next_page() {
                Some(ticket) => fetch(&self.client, ticket),
                None => Task::none(),
            },
            Message::PreviousPage => match screen.catalog.previous_page() {
                Some(ticket) => fetch(&self.client, ticket),
                None => Task::none(),
            },
            Message::Fetched(ticket, result) => {
                let completion = screen.catalog.complete(ticket, result);
                if let Completion::Failed { error, .. } = &completion {
                    tracing::error!("Fetch failed: {}", error);
                }
                self.notices.extend(completion.notice());

                if matches!(completion, Completion::Stale | Completion::Failed { .. }) {
                    return Task::none();
                }

                screen.thumbnails.clear();
                let generation = screen.catalog.results_generation();
                let thumbnails = Task::batch(screen.catalog.results().iter().map(|item| {
                    let client = self.client.clone();
                    let id = item.id.clone();
                    let url = item.thumbnail_url().to_string();
                    Task::perform(
                        async move { client.fetch_image(&url).await },
                        move |result| Message::ThumbnailLoaded {
                            generation,
                            id: id.clone(),
                            result,
                        },
                    )
                }));

                if completion.scrolls_to_top() {
                    Task::batch([
                        thumbnails,
                        scrollable::snap_to(ui::gallery::scroll_id(), scrollable::RelativeOffset::START),
                    ])
                } else {
                    thumbnails
                }
            }
            Message::ThumbnailLoaded {
                generation,
                id,
                result,
            } => {
                // Thumbnails for a result set that has since been replaced
                if generation != screen.catalog.results_generation() {
                    return Task::none();
                }
                match result {
                    Ok(bytes) => {
                        screen.thumbnails.insert(id, Handle::from_bytes(bytes));
                    }
                    Err(e) => tracing::warn!("Thumbnail for {} failed: {}", id, e),
                }
                Task::none()
            }
            Message::PhotoSelected(id) => match screen.catalog.select(&id, &self.handoff) {
                Some(route) => self.navigate(route),
                None => Task::none(),
            },
            Message::ExportFinished {
                download_location,
                result,
                ..
            } => self.export_finished_elsewhere(download_location, result),
            Message::Tick(now) => {
                self.notices.prune(now);
                Task::none()
            }
            other => {
                tracing::trace!("Ignoring {:?} on the gallery screen", other);
                Task::none()
            }
        }
    }

    fn update_customize(&mut self, message: Message) -> Task<Message> {
        let Screen::Customize(screen) = &mut self.screen else {
            return Task::none();
        };
        let current = screen.mount;
        let composer = &mut screen.composer;

        match message {
            Message::NameChanged(name) => {
                composer.set_name(name);
                Task::none()
            }
            Message::FontSelected(font) => {
                composer.set_font(font);
                Task::none()
            }
            Message::ColorChanged(color) => {
                composer.set_color(color);
                Task::none()
            }
            Message::StyleReset => {
                composer.reset_style();
                Task::none()
            }
            Message::BackdropLoaded { mount, result } => {
                if mount != current {
                    tracing::debug!("Dropped background from customize mount {}", mount);
                    return Task::none();
                }
                match result {
                    Ok(backdrop) => composer.attach_backdrop(backdrop),
                    Err(e) => {
                        tracing::error!("Failed to load card background: {}", e);
                        self.notices
                            .push(Notice::error("Failed to load image. Please try again."));
                    }
                }
                Task::none()
            }
            Message::DownloadRequested => {
                let timestamp_ms = Utc::now().timestamp_millis();
                match composer.begin_export(&self.config.download_dir, timestamp_ms) {
                    Ok(job) => {
                        self.notices.push(Notice::info("Generating your card..."));
                        let download_location = composer.item().links.download_location.clone();
                        Task::perform(export_card(job), move |result| Message::ExportFinished {
                            mount: current,
                            download_location: download_location.clone(),
                            result,
                        })
                    }
                    Err(e) => {
                        self.notices.extend(refusal_notice(&e));
                        Task::none()
                    }
                }
            }
            Message::ExportFinished {
                mount,
                download_location,
                result,
            } => {
                if mount != current {
                    // Started on an earlier mount; leave this mount's export guard alone
                    return self.export_finished_elsewhere(download_location, result);
                }
                self.notices.push(composer.finish_export(&result));
                if result.is_err() {
                    return Task::none();
                }
                track_download(&self.client, download_location)
            }
            Message::DownloadTracked => Task::none(),
            Message::BackToGallery => self.navigate(Route::Gallery),
            Message::Tick(now) => {
                self.notices.prune(now);
                Task::none()
            }
            other => {
                tracing::trace!("Ignoring {:?} on the customize screen", other);
                Task::none()
            }
        }
    }

    /// An export that outlived its screen still reports its outcome
    fn export_finished_elsewhere(
        &mut self,
        download_location: String,
        result: Result<PathBuf, CardError>,
    ) -> Task<Message> {
        match result {
            Ok(path) => {
                tracing::info!("Card saved to {} after leaving the editor", path.display());
                self.notices.push(Notice::success("Card downloaded successfully!"));
                track_download(&self.client, download_location)
            }
            Err(e) => {
                tracing::error!("Download error: {}", e);
                self.notices
                    .push(Notice::error("Failed to download card. Please try again."));
                Task::none()
            }
        }
    }

    /// Build the user interface
    fn view(&self) -> Element<'_, Message> {
        let screen = match &self.screen {
            Screen::Gallery(screen) => ui::gallery::view(screen),
            Screen::Customize(screen) => ui::customize::view(screen),
        };

        if self.notices.is_empty() {
            screen
        } else {
            column![ui::notices(&self.notices), screen].into()
        }
    }

    fn subscription(&self) -> Subscription<Message> {
        if self.notices.is_empty() {
            Subscription::none()
        } else {
            iced::time::every(Duration::from_secs(1)).map(Message::Tick)
        }
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

fn main() -> iced::Result {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "thanks_card=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            std::process::exit(2);
        }
    };
    let client = match UnsplashClient::new(&config) {
        Ok(client) => client,
        Err(e) => {
            tracing::error!("Failed to build HTTP client: {}", e);
            std::process::exit(1);
        }
    };

    // Optional start path, e.g. `thanks-card /customize`
    let start = std::env::args()
        .nth(1)
        .map(|path| Route::from_path(&path))
        .unwrap_or_default();

    tracing::info!(
        "Starting at {} (cards saved to {})",
        start.path(),
        config.download_dir.display()
    );

    iced::application("Thank You Card Generator", ThanksCard::update, ThanksCard::view)
        .theme(ThanksCard::theme)
        .subscription(ThanksCard::subscription)
        .window_size((1200.0, 860.0))
        .centered()
        .run_with(move || ThanksCard::new(config, client, start))
}

/// Run the fetch a catalog ticket asks for
fn fetch(client: &UnsplashClient, ticket: Ticket) -> Task<Message> {
    let client = client.clone();
    let intent = ticket.intent.clone();
    tracing::debug!("Fetch #{} for {:?}", ticket.generation(), intent);

    Task::perform(
        async move {
            match intent {
                Intent::Random => client
                    .fetch_random_batch(RANDOM_BATCH_SIZE)
                    .await
                    .map(Fetched::Random),
                Intent::Search { query } => client
                    .search(&query, 1, SEARCH_PAGE_SIZE)
                    .await
                    .map(Fetched::Page),
                Intent::Page { query, page } => client
                    .search(&query, page, SEARCH_PAGE_SIZE)
                    .await
                    .map(Fetched::Page),
            }
        },
        move |result| Message::Fetched(ticket.clone(), result),
    )
}

/// Detached download-tracking ping for an exported photo
fn track_download(client: &UnsplashClient, download_location: String) -> Task<Message> {
    let client = client.clone();
    Task::perform(
        async move { client.notify_download(&download_location).await },
        |()| Message::DownloadTracked,
    )
}

/// Download and decode the card background
async fn load_backdrop(client: UnsplashClient, url: String) -> Result<Backdrop, SourceError> {
    let bytes = client.fetch_image(&url).await?;
    prepare_backdrop(bytes).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::background::fixtures::backdrop;
    use crate::state::data::fixtures::item;
    use ::image::Rgba;
    use std::collections::HashMap;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
    const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);

    /// App with an unreachable source; returned tasks are never run
    fn app(start: Route) -> ThanksCard {
        let vars: HashMap<String, String> = [
            ("UNSPLASH_ACCESS_KEY", "test-key"),
            ("UNSPLASH_API_URL", "http://127.0.0.1:9"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .chain([(
            "CARD_DOWNLOAD_DIR".to_string(),
            std::env::temp_dir().display().to_string(),
        )])
        .collect();
        let config = Config::from_vars(&vars).unwrap();
        let client = UnsplashClient::new(&config).unwrap();
        ThanksCard::new(config, client, start).0
    }

    /// Hand off `id` and open the customize screen; returns the new mount
    fn open(app: &mut ThanksCard, id: &str) -> u64 {
        app.handoff.put(&item(id)).unwrap();
        let _ = app.navigate(Route::Customize);
        customize(app).mount
    }

    fn customize(app: &ThanksCard) -> &CustomizeScreen {
        match &app.screen {
            Screen::Customize(screen) => screen,
            Screen::Gallery(_) => panic!("gallery is mounted"),
        }
    }

    fn notice_texts(app: &ThanksCard) -> Vec<String> {
        app.notices.iter().map(|n| n.text.clone()).collect()
    }

    fn finished(mount: u64, id: &str) -> Message {
        Message::ExportFinished {
            mount,
            download_location: item(id).links.download_location,
            result: Ok(PathBuf::from(format!("/tmp/thank-you-card-{}.png", id))),
        }
    }

    #[test]
    fn test_customize_without_selection_redirects() {
        let app = app(Route::Customize);
        assert!(matches!(app.screen, Screen::Gallery(_)));
        assert!(notice_texts(&app).contains(&"No image selected. Redirecting...".to_string()));
    }

    #[test]
    fn test_selection_opens_customize() {
        let mut app = app(Route::Gallery);
        open(&mut app, "abc123");
        let screen = customize(&app);
        assert_eq!(screen.composer.item().id, "abc123");
        assert!(!app.handoff.is_pending());
    }

    #[test]
    fn test_late_background_from_previous_mount_is_dropped() {
        let mut app = app(Route::Gallery);
        let first = open(&mut app, "A");
        let _ = app.update(Message::BackToGallery);
        let second = open(&mut app, "B");
        assert_ne!(first, second);

        let _ = app.update(Message::BackdropLoaded {
            mount: second,
            result: Ok(backdrop(BLUE)),
        });
        let _ = app.update(Message::BackdropLoaded {
            mount: first,
            result: Ok(backdrop(RED)),
        });

        let screen = customize(&app);
        assert_eq!(screen.composer.item().id, "B");
        let scene = screen.composer.preview_scene().unwrap();
        let pixel = *scene.background.get_pixel(0, 0);
        assert!(pixel[2] > pixel[0], "card for B shows {:?}", pixel);
        assert!(screen.preview.is_some());
    }

    #[test]
    fn test_late_export_from_previous_mount_keeps_guard() {
        let mut app = app(Route::Gallery);
        let first = open(&mut app, "A");
        let _ = app.update(Message::BackdropLoaded {
            mount: first,
            result: Ok(backdrop(RED)),
        });
        let _ = app.update(Message::NameChanged("Jane".to_string()));
        let _ = app.update(Message::DownloadRequested);
        assert!(customize(&app).composer.is_exporting());

        let _ = app.update(Message::BackToGallery);
        let second = open(&mut app, "B");
        let _ = app.update(Message::BackdropLoaded {
            mount: second,
            result: Ok(backdrop(BLUE)),
        });
        let _ = app.update(Message::NameChanged("Sam".to_string()));
        let _ = app.update(Message::DownloadRequested);
        assert!(customize(&app).composer.is_exporting());

        // A's result is reported but B's export is still running
        let _ = app.update(finished(first, "A"));
        assert!(customize(&app).composer.is_exporting());
        assert_eq!(
            notice_texts(&app).last().map(String::as_str),
            Some("Card downloaded successfully!")
        );

        // A second trigger is still refused
        let _ = app.update(Message::DownloadRequested);
        assert!(customize(&app).composer.is_exporting());

        let _ = app.update(finished(second, "B"));
        assert!(!customize(&app).composer.is_exporting());
    }

    #[test]
    fn test_export_finishing_on_gallery_reports_outcome() {
        let mut app = app(Route::Gallery);
        let mount = open(&mut app, "A");
        let _ = app.update(Message::BackToGallery);

        let _ = app.update(Message::ExportFinished {
            mount,
            download_location: item("A").links.download_location,
            result: Err(CardError::ExportFailed("disk full".to_string())),
        });
        assert!(matches!(app.screen, Screen::Gallery(_)));
        assert_eq!(
            notice_texts(&app).last().map(String::as_str),
            Some("Failed to download card. Please try again.")
        );
    }
}
