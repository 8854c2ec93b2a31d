pub mod chat;
pub mod feedback;
pub mod login;
pub mod shared;

pub use chat::ChatView;
pub use feedback::FeedbackView;
pub use login::LoginView;
