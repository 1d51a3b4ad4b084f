/// Gallery browsing and search state
///
/// `Catalog` never performs I/O itself. Each action that needs data returns
/// a [`Ticket`] describing the fetch to run; the caller runs it and hands
/// the result back through [`Catalog::complete`]. Tickets carry a
/// generation number, and only the newest ticket may change the result
/// set, so a slow response for an abandoned page can never overwrite a
/// newer one.
use crate::error::SourceError;
use crate::state::data::{GalleryItem, SearchPage};
use crate::state::handoff::Handoff;
use crate::state::notice::Notice;
use crate::state::observer::Listeners;
use crate::state::route::Route;

/// Deepest page the pagination will offer, whatever the source reports
pub const MAX_PAGES: u32 = 10;

/// Placeholder tiles while a random batch loads
const RANDOM_PLACEHOLDERS: usize = 4;
/// Placeholder tiles while a search page loads
const SEARCH_PLACEHOLDERS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Browsing,
    Searching,
}

/// What a fetch was issued for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Random portrait batch
    Random,
    /// First page of a new search
    Search { query: String },
    /// Another page of the current search
    Page { query: String, page: u32 },
}

/// A fetch the caller must run, tagged with the intent it was issued for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    generation: u64,
    pub intent: Intent,
}

impl Ticket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Payload of a finished fetch
#[derive(Debug, Clone)]
pub enum Fetched {
    Random(Vec<GalleryItem>),
    Page(SearchPage),
}

/// What `complete` did with a response
#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    /// Superseded by a newer request, ignored
    Stale,
    RandomLoaded { count: usize },
    SearchLoaded { total: u64 },
    PageLoaded { page: u32 },
    Failed { intent: Intent, error: SourceError },
}

impl Completion {
    /// Notice to show for this outcome, if any
    pub fn notice(&self) -> Option<Notice> {
        match self {
            Completion::Stale => None,
            Completion::RandomLoaded { .. } => {
                Some(Notice::success("Welcome to the Thank You Card Generator!"))
            }
            Completion::SearchLoaded { total } => Some(Notice::success(format!(
                "Found {} images for your search",
                total
            ))),
            Completion::PageLoaded { .. } => None,
            Completion::Failed { intent, .. } => Some(Notice::error(match intent {
                Intent::Random => "Failed to load images. Please try again.",
                Intent::Search { .. } => "Search failed. Please try again.",
                Intent::Page { .. } => "Failed to load page. Please try again.",
            })),
        }
    }

    /// Page changes bring the grid back to the top
    pub fn scrolls_to_top(&self) -> bool {
        matches!(self, Completion::PageLoaded { .. })
    }
}

/// Observable changes to the catalog
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogEvent {
    FetchStarted(Intent),
    ResultsReplaced { generation: u64, count: usize },
    FetchFailed(Intent),
    StaleDiscarded(Intent),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchState {
    /// Query of the search currently shown; `None` while browsing
    pub query: Option<String>,
    /// 1-based
    pub page: u32,
    pub total_pages: u32,
    pub total: u64,
    pub mode: Mode,
}

impl Default for SearchState {
    fn default() -> Self {
        Self {
            query: None,
            page: 1,
            total_pages: 1,
            total: 0,
            mode: Mode::Browsing,
        }
    }
}

/// What the grid area should show
#[derive(Debug, PartialEq)]
pub enum GridState<'a> {
    Loading { placeholders: usize },
    /// Finished, nothing to show
    Empty,
    Items(&'a [GalleryItem]),
}

/// Pagination controls, present only for multi-page searches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub last: u32,
    pub can_previous: bool,
    pub can_next: bool,
}

#[derive(Debug, Default)]
pub struct Catalog {
    search: SearchState,
    results: Vec<GalleryItem>,
    /// Generation of the request that produced `results`
    results_generation: u64,
    next_generation: u64,
    in_flight: Option<Ticket>,
    listeners: Listeners<CatalogEvent>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: impl Fn(&CatalogEvent) + Send + 'static) {
        self.listeners.subscribe(listener);
    }

    /// First display: load a random batch
    pub fn start(&mut self) -> Ticket {
        self.issue(Intent::Random)
    }

    /// Go back to random browsing
    pub fn show_random(&mut self) -> Ticket {
        self.issue(Intent::Random)
    }

    /// Search action from the search box. Blank text means random browsing.
    pub fn submit_search(&mut self, text: &str) -> Ticket {
        let query = text.trim();
        if query.is_empty() {
            return self.show_random();
        }
        self.issue(Intent::Search {
            query: query.to_string(),
        })
    }

    /// Request page `page` of the current search.
    ///
    /// Returns `None` (and changes nothing) unless searching and
    /// `page` is a different page within `1..=page_cap()`.
    pub fn go_to_page(&mut self, page: u32) -> Option<Ticket> {
        if self.search.mode != Mode::Searching {
            return None;
        }
        if page < 1 || page > self.page_cap() || page == self.search.page {
            tracing::debug!("Ignoring request for page {}", page);
            return None;
        }
        let query = self.search.query.clone()?;
        Some(self.issue(Intent::Page { query, page }))
    }

    pub fn next_page(&mut self) -> Option<Ticket> {
        self.go_to_page(self.search.page.saturating_add(1))
    }

    pub fn previous_page(&mut self) -> Option<Ticket> {
        self.go_to_page(self.search.page.saturating_sub(1))
    }

    /// Apply the result of a fetch issued by this catalog
    pub fn complete(&mut self, ticket: Ticket, result: Result<Fetched, SourceError>) -> Completion {
        let is_current = self
            .in_flight
            .as_ref()
            .is_some_and(|t| t.generation == ticket.generation);
        if !is_current {
            tracing::debug!("Discarding stale response for {:?}", ticket.intent);
            self.listeners
                .notify(&CatalogEvent::StaleDiscarded(ticket.intent.clone()));
            return Completion::Stale;
        }
        self.in_flight = None;

        let Ticket { generation, intent } = ticket;
        let completion = match (intent, result) {
            (intent, Err(error)) => {
                tracing::warn!("Fetch for {:?} failed: {}", intent, error);
                self.listeners.notify(&CatalogEvent::FetchFailed(intent.clone()));
                return Completion::Failed { intent, error };
            }
            (Intent::Random, Ok(Fetched::Random(items))) => {
                self.search = SearchState::default();
                self.results = items;
                Completion::RandomLoaded {
                    count: self.results.len(),
                }
            }
            (Intent::Search { query }, Ok(Fetched::Page(page))) => {
                self.search = SearchState {
                    query: Some(query),
                    page: 1,
                    total_pages: page.total_pages,
                    total: page.total,
                    mode: Mode::Searching,
                };
                self.results = page.results;
                Completion::SearchLoaded { total: page.total }
            }
            (Intent::Page { query, page: number }, Ok(Fetched::Page(page))) => {
                self.search.query = Some(query);
                self.search.page = number;
                self.results = page.results;
                Completion::PageLoaded { page: number }
            }
            (intent, Ok(_)) => {
                tracing::error!("Response shape does not match {:?}", intent);
                let error = SourceError::decode("response does not match request");
                self.listeners.notify(&CatalogEvent::FetchFailed(intent.clone()));
                return Completion::Failed { intent, error };
            }
        };

        self.results_generation = generation;
        self.listeners.notify(&CatalogEvent::ResultsReplaced {
            generation,
            count: self.results.len(),
        });
        completion
    }

    /// Put the chosen photo into the handoff slot and move to the
    /// customize screen
    pub fn select(&self, id: &str, handoff: &Handoff) -> Option<Route> {
        let item = self.results.iter().find(|item| item.id == id)?;
        match handoff.put(item) {
            Ok(()) => {
                tracing::info!("Selected photo {}", item.id);
                Some(Route::Customize)
            }
            Err(e) => {
                tracing::error!("Could not hand off photo {}: {}", item.id, e);
                None
            }
        }
    }

    /// Highest page the user may reach
    pub fn page_cap(&self) -> u32 {
        self.search.total_pages.min(MAX_PAGES).max(1)
    }

    pub fn pagination(&self) -> Option<Pagination> {
        if self.search.mode != Mode::Searching || self.search.total_pages <= 1 {
            return None;
        }
        let last = self.page_cap();
        let idle = !self.is_loading();
        Some(Pagination {
            page: self.search.page,
            last,
            can_previous: idle && self.search.page > 1,
            can_next: idle && self.search.page < last,
        })
    }

    pub fn grid(&self) -> GridState<'_> {
        match &self.in_flight {
            Some(ticket) => GridState::Loading {
                placeholders: match ticket.intent {
                    Intent::Random => RANDOM_PLACEHOLDERS,
                    _ => SEARCH_PLACEHOLDERS,
                },
            },
            None if self.results.is_empty() => GridState::Empty,
            None => GridState::Items(&self.results),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    /// "Load random images" is offered while a search is shown
    pub fn can_return_to_random(&self) -> bool {
        self.search.mode == Mode::Searching
    }

    pub fn search_state(&self) -> &SearchState {
        &self.search
    }

    pub fn results(&self) -> &[GalleryItem] {
        &self.results
    }

    pub fn results_generation(&self) -> u64 {
        self.results_generation
    }

    fn issue(&mut self, intent: Intent) -> Ticket {
        self.next_generation += 1;
        let ticket = Ticket {
            generation: self.next_generation,
            intent,
        };
        if let Some(previous) = self.in_flight.replace(ticket.clone()) {
            tracing::debug!("Superseding in-flight {:?}", previous.intent);
        }
        self.listeners
            .notify(&CatalogEvent::FetchStarted(ticket.intent.clone()));
        ticket
    }
}
