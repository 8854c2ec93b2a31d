use crate::ui::Services;
use dioxus::prelude::*;
use std::time::Duration;

pub fn use_services() -> Services {
    use_context::<Services>()
}

/// Blocking browser alert.
pub fn alert(message: &str) {
    let script = format!("alert({});", serde_json::Value::from(message));
    let _ = document::eval(&script);
}

/// Timer that works in the browser as well as on native targets.
pub async fn sleep(duration: Duration) {
    #[cfg(target_arch = "wasm32")]
    {
        let script = format!(
            "await new Promise(resolve => setTimeout(resolve, {})); return null;",
            duration.as_millis()
        );
        let _ = document::eval(&script).await;
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        tokio::time::sleep(duration).await;
    }
}

#[component]
pub fn LoadingDots() -> Element {
    rsx! {
        div { class: "message assistant loading",
            div { class: "loading-dot" }
            div { class: "loading-dot" }
            div { class: "loading-dot" }
        }
    }
}
