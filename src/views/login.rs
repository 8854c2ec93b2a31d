use crate::views::shared::use_services;
use dioxus::prelude::*;

const LOGIN_ERROR: &str = "Invalid email or password. Please try again.";

#[component]
pub fn LoginView(on_login: EventHandler<()>) -> Element {
    let services = use_services();
    let mut email = use_signal(String::new);
    let mut password = use_signal(String::new);
    let mut show_error = use_signal(|| false);
    let mut busy = use_signal(|| false);

    let submit = move |ev: FormEvent| {
        ev.prevent_default();
        if busy() {
            return;
        }
        show_error.set(false);
        busy.set(true);
        let identity = services.identity.clone();
        let username = email();
        let secret = password();
        spawn(async move {
            let result = identity.authenticate(&username, &secret).await;
            busy.set(false);
            match result {
                Ok(_) => on_login.call(()),
                Err(_) => show_error.set(true),
            }
        });
    };

    rsx! {
        div { class: "login-container",
            h2 { "Sign in" }
            form { id: "login-form", onsubmit: submit,
                label { r#for: "email", "Email" }
                input {
                    id: "email", r#type: "email", required: true, autofocus: true,
                    value: "{email}", oninput: move |ev| email.set(ev.value()),
                }
                label { r#for: "password", "Password" }
                input {
                    id: "password", r#type: "password", required: true,
                    value: "{password}", oninput: move |ev| password.set(ev.value()),
                }
                button { class: "btn btn-primary", r#type: "submit", disabled: busy(), "Login" }
            }
            if show_error() {
                div { id: "error-message", class: "error-message", "{LOGIN_ERROR}" }
            }
        }
    }
}
