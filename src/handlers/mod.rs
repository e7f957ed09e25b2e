mod auth;
mod task;
mod dashboard;
mod pages;

pub use auth::{serve_login_page, handle_login, serve_register_page, handle_register, handle_logout};
pub use task::{list_tasks, create_task, get_task, update_task, delete_task};
pub use dashboard::serve_home;
