use serde::Deserialize;
use super::TaskUpdate;

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    pub confirm_password: Option<String>,
}

/// Body of `POST /tasks` and `PUT|POST /tasks/:id`; every field is optional.
#[derive(Debug, Deserialize, Default)]
pub struct TaskForm {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
}

impl From<TaskForm> for TaskUpdate {
    fn from(form: TaskForm) -> Self {
        TaskUpdate {
            title: form.title,
            description: form.description,
            status: form.status,
        }
    }
}

// `?error=...` flash message on the login and register pages
#[derive(Debug, Deserialize, Default)]
pub struct FlashQuery {
    pub error: Option<String>,
}
