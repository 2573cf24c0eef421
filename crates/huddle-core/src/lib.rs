// Library root: the roster, draw and grouping engines plus their
// configuration, persistence and export collaborators.

pub mod config;
pub mod db;
pub mod decorate;
pub mod draw;
pub mod export;
pub mod grouping;
pub mod ingest;
pub mod model;
pub mod roster;
