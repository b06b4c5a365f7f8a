//! The components module contains the widget's Dioxus components.

mod add_to_menu;
mod app;
mod audio_manager;
mod like_button;
mod player;
mod track_list;

pub use add_to_menu::*;
pub use app::*;
pub use audio_manager::*;
pub use like_button::*;
pub use player::*;
pub use track_list::*;
