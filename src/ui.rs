use crate::api::ApiClient;
use crate::auth::{CognitoProvider, IdentityGateway, Surface, enforce_route};
use crate::config::AppConfig;
use crate::token_store::platform_store;
use crate::views::{ChatView, FeedbackView, LoginView};
use dioxus::prelude::*;
use std::sync::Arc;

const APP_CSS: Asset = asset!("/assets/chatdesk.css");

/// Long-lived collaborators shared by every surface.
#[derive(Clone)]
pub struct Services {
    pub api: ApiClient,
    pub identity: Arc<IdentityGateway>,
}

impl Services {
    pub fn new(config: AppConfig) -> Self {
        let provider = CognitoProvider::new(&config.cognito);
        Self {
            api: ApiClient::new(config.endpoints),
            identity: Arc::new(IdentityGateway::new(Box::new(provider), platform_store())),
        }
    }
}

impl PartialEq for Services {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.identity, &other.identity)
    }
}

#[component]
pub fn App() -> Element {
    let services = use_hook(|| {
        AppConfig::from_env().map(Services::new).map_err(|err| {
            tracing::error!("invalid configuration: {err:#}");
            err.to_string()
        })
    });

    rsx! {
        document::Link { rel: "stylesheet", href: APP_CSS }
        match services {
            Ok(services) => rsx! { Shell { services } },
            Err(_) => rsx! {
                div { class: "config-error",
                    h2 { "Configuration error" }
                    p { "The application is not configured. Check the environment settings and reload." }
                }
            },
        }
    }
}

#[component]
fn Shell(services: Services) -> Element {
    use_context_provider(|| services.clone());

    let identity = services.identity.clone();
    // Checked once on load; afterwards only on navigation.
    let mut surface = use_signal(move || {
        let requested = Surface::Chat;
        let resolved = enforce_route(requested, identity.current_session().is_some());
        if resolved != requested {
            tracing::info!("redirecting to {resolved:?}");
        }
        resolved
    });

    let identity = services.identity.clone();
    let navigate = use_callback(move |target: Surface| {
        let resolved = enforce_route(target, identity.current_session().is_some());
        if resolved != target {
            tracing::warn!("navigation to {target:?} redirected to {resolved:?}");
        }
        surface.set(resolved);
    });

    let identity = services.identity.clone();
    let logout = move |_| {
        let identity = identity.clone();
        spawn(async move {
            identity.logout().await;
            navigate.call(Surface::Login);
        });
    };

    let current = surface();
    rsx! {
        if current != Surface::Login {
            AppHeader {
                user_name: services.identity.display_name(),
                surface: current,
                on_navigate: navigate,
                on_logout: logout,
            }
        }
        match current {
            Surface::Login => rsx! { LoginView { on_login: move |_| navigate.call(Surface::Chat) } },
            Surface::Chat => rsx! { ChatView { on_auth_required: move |_| navigate.call(Surface::Login) } },
            Surface::Feedback => rsx! {
                FeedbackView { on_auth_required: move |_| navigate.call(Surface::Login) }
            },
        }
    }
}

#[component]
fn AppHeader(
    user_name: String,
    surface: Surface,
    on_navigate: EventHandler<Surface>,
    on_logout: EventHandler<()>,
) -> Element {
    rsx! {
        div { class: "header",
            div { class: "header-content",
                h1 { class: "header-title", "Chat Assistant" }
                div { class: "header-actions",
                    span { id: "user-name", class: "user-name", "{user_name}" }
                    if surface == Surface::Chat {
                        button {
                            class: "btn btn-ghost", r#type: "button",
                            onclick: move |_| on_navigate.call(Surface::Feedback),
                            "Feedback"
                        }
                    } else {
                        button {
                            class: "btn btn-ghost", r#type: "button",
                            onclick: move |_| on_navigate.call(Surface::Chat),
                            "Back to Chat"
                        }
                    }
                    button {
                        class: "btn", r#type: "button",
                        onclick: move |_| on_logout.call(()),
                        "Logout"
                    }
                }
            }
        }
    }
}
