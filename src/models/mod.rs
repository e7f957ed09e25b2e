mod user;
mod forms;
mod task;

pub use user::{User, UserId};
pub use forms::{LoginForm, RegisterForm, TaskForm, FlashQuery};
pub use task::{Task, TaskId, TaskUpdate};
