#[allow(clippy::module_inception)]
mod component;
pub mod dashboard;
pub mod fetch;
pub mod logs;
pub mod nav_tabs;

pub use component::Component;
