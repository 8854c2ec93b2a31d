fn main() {
    // A local .env (desktop dev) wins over the bundled config.
    #[cfg(not(target_arch = "wasm32"))]
    let _ = dotenvy::dotenv();

    chatdesk::logging::init();
    dioxus::launch(chatdesk::ui::App);
}
