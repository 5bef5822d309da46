//! HTML templates and styling for the notes application.
//!
//! ## Module Structure
//!
//! - `styles` - CSS constants and theme definitions
//! - `components` - Shared HTML components (base page, sidebar, tab bar, dialogs)
//! - `app` - The main page with editor, preview and assistant panel
//! - `script` - Client-side behavior for the main page

mod app;
mod components;
mod script;
mod styles;

pub use app::{render_app, ViewMode};
pub use components::base_html;
