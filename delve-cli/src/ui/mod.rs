pub mod bar_chart;
mod confirm_remove;
mod footer;
mod header;
mod help;
mod layout;
mod progress;
mod removal_progress;
mod results_view;
mod theme;

pub use confirm_remove::ConfirmRemoveView;
pub use footer::Footer;
pub use header::Header;
pub use help::HelpView;
pub use layout::{AppLayout, truncate_left};
pub use progress::ProgressView;
pub use removal_progress::RemovalProgressView;
pub use results_view::ResultsView;
pub use theme::{Theme, kind_icon};
