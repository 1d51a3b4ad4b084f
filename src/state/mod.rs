/// State management module
///
/// This module handles all application state, including:
/// - Photo records shared between screens (data.rs)
/// - Gallery browsing, search and pagination (catalog.rs)
/// - The selection handoff between screens (handoff.rs)
/// - Card customization and export guarding (customization.rs, composer.rs)
/// - Transient notices and screen routes (notice.rs, route.rs)

pub mod catalog;
pub mod composer;
pub mod customization;
pub mod data;
pub mod handoff;
pub mod notice;
pub mod observer;
pub mod route;
