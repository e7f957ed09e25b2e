pub mod json_file;
mod credential_store;
mod task_store;
mod session;

pub use credential_store::CredentialStore;
pub use task_store::TaskStore;
pub use session::AuthSession;
