pub(crate) mod client;
pub(crate) mod event;
pub(crate) mod issue;

pub use client::GithubClient;
pub use event::*;
pub use issue::*;
