/// Photo source module
///
/// This module handles:
/// - Fetching random portrait photos for the landing grid
/// - Paginated portrait search
/// - The download-tracking ping the source requires when a photo is used
/// - Fetching image bytes for thumbnails and card backgrounds

pub mod client;

pub use client::UnsplashClient;

/// Photos requested on the landing grid
pub const RANDOM_BATCH_SIZE: u32 = 4;

/// Photos per search page
pub const SEARCH_PAGE_SIZE: u32 = 8;
