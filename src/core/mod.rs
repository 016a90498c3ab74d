// src/core/mod.rs

pub mod html;
pub mod locator;
pub mod net;
pub mod sanitize;

pub use html::Tree;
pub use locator::{Item, Locator, LocatorError};
