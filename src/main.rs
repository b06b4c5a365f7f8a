use dioxus::prelude::*;

mod actions;
mod api;
mod bootstrap;
mod components;
mod db;
mod player;
mod utils;

use components::AppShell;

const PLAYER_CSS: Asset = asset!("/assets/styling/player.css");
const FONT_AWESOME: &str = "https://cdnjs.cloudflare.com/ajax/libs/font-awesome/6.5.1/css/all.min.css";

fn main() {
    let settings = db::load_settings();
    dioxus::logger::init(settings.log_level()).expect("failed to initialize logger");
    dioxus::launch(App);
}

#[component]
fn App() -> Element {
    rsx! {
        document::Meta { name: "theme-color", content: "#a38449" }
        document::Stylesheet { href: FONT_AWESOME }
        document::Stylesheet { href: PLAYER_CSS }

        AppShell {}
    }
}
