use axum::{
    routing::{get, post},
    Router,
    middleware::from_fn,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};
use tower_sessions::{cookie::{Key, SameSite}, MemoryStore, SessionManagerLayer};
use crate::{
    config::Config,
    errors::StorageResult,
    handlers,
    middleware,
    services::{CredentialStore, TaskStore},
};

// Application state shared between handlers
#[derive(Clone)]
pub struct AppState {
    pub credentials: Arc<CredentialStore>,
    pub tasks: Arc<TaskStore>,
}

impl AppState {
    pub async fn open(config: &Config) -> StorageResult<Self> {
        let credentials = CredentialStore::open(config.storage.users_path(), &config.auth).await?;
        let tasks = TaskStore::open(config.storage.tasks_path()).await?;
        Ok(Self {
            credentials: Arc::new(credentials),
            tasks: Arc::new(tasks),
        })
    }
}

/// Builds the full application. `key` signs the session cookie.
pub fn build_router(state: AppState, config: &Config, key: Key) -> Router {
    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_secure(config.auth.secure_cookie)
        .with_same_site(SameSite::Lax)
        .with_http_only(true)
        .with_name(config.auth.cookie_name.clone())
        .with_signed(key);

    Router::new()
        // Auth routes
        .route("/login", get(handlers::serve_login_page).post(handlers::handle_login))
        .route("/register", get(handlers::serve_register_page).post(handlers::handle_register))
        .route("/logout", get(handlers::handle_logout))

        // Task routes
        .route("/", get(handlers::serve_home))
        .route("/tasks", get(handlers::list_tasks).post(handlers::create_task))
        .route(
            "/tasks/:task_id",
            get(handlers::get_task)
                .put(handlers::update_task)
                .post(handlers::update_task),
        )
        .route("/tasks/:task_id/delete", post(handlers::delete_task))

        .layer(from_fn(middleware::require_auth))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(RequestBodyLimitLayer::new(config.server.max_body_size))
                .layer(session_layer),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request, StatusCode},
        response::Response,
    };
    use serde_json::Value;
    use tempfile::TempDir;
    use tower::ServiceExt;

    struct TestApp {
        router: Router,
        state: AppState,
        _dir: TempDir,
    }

    impl TestApp {
        async fn new() -> Self {
            let dir = TempDir::new().unwrap();
            let config = Config::for_tests(dir.path());
            let state = AppState::open(&config).await.unwrap();
            let router = build_router(state.clone(), &config, Key::generate());
            Self { router, state, _dir: dir }
        }

        async fn send(&self, req: Request<Body>) -> Response {
            self.router.clone().oneshot(req).await.unwrap()
        }

        async fn get(&self, uri: &str, cookie: Option<&str>) -> Response {
            let mut req = Request::builder().method(Method::GET).uri(uri);
            if let Some(cookie) = cookie {
                req = req.header(header::COOKIE, cookie);
            }
            self.send(req.body(Body::empty()).unwrap()).await
        }

        async fn form(&self, method: Method, uri: &str, body: &str, cookie: Option<&str>) -> Response {
            let mut req = Request::builder()
                .method(method)
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
            if let Some(cookie) = cookie {
                req = req.header(header::COOKIE, cookie);
            }
            self.send(req.body(Body::from(body.to_string())).unwrap()).await
        }

        /// Registers and returns the session cookie to send back.
        async fn register(&self, username: &str, password: &str) -> String {
            let body = format!("username={}&password={}", username, password);
            let response = self.form(Method::POST, "/register", &body, None).await;
            assert_eq!(location(&response), "/");
            session_cookie(&response)
        }
    }

    fn location(response: &Response) -> &str {
        response.headers()[header::LOCATION].to_str().unwrap()
    }

    fn session_cookie(response: &Response) -> String {
        let set_cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
        set_cookie.split(';').next().unwrap().to_string()
    }

    async fn json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn anonymous_requests_are_turned_away() {
        let app = TestApp::new().await;

        let home = app.get("/", None).await;
        assert_eq!(home.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&home), "/login");

        let list = app.get("/tasks", None).await;
        assert_eq!(list.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json(list).await["error"], "Unauthorized");

        let one = app.get("/tasks/whatever", None).await;
        assert_eq!(one.status(), StatusCode::UNAUTHORIZED);

        let create = app.form(Method::POST, "/tasks", "title=x", None).await;
        assert_eq!(location(&create), "/login");

        let login_page = app.get("/login", None).await;
        assert_eq!(login_page.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn full_task_lifecycle() {
        let app = TestApp::new().await;
        app.register("alice", "pw1").await;

        // fresh login gets its own session
        let login = app.form(Method::POST, "/login", "username=alice&password=pw1", None).await;
        assert_eq!(location(&login), "/");
        let cookie = session_cookie(&login);

        let created = app
            .form(Method::POST, "/tasks", "title=buy+milk", Some(&cookie))
            .await;
        assert_eq!(location(&created), "/");

        let tasks = json(app.get("/tasks", Some(&cookie)).await).await;
        let tasks = tasks.as_array().unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0]["status"], "pending");
        assert_eq!(tasks[0]["title"], "buy milk");
        let id = tasks[0]["id"].as_str().unwrap().to_string();

        let updated = app
            .form(Method::PUT, &format!("/tasks/{}", id), "status=done", Some(&cookie))
            .await;
        assert_eq!(location(&updated), "/");

        let task = json(app.get(&format!("/tasks/{}", id), Some(&cookie)).await).await;
        assert_eq!(task["status"], "done");
        assert_eq!(task["title"], "buy milk");

        let home = text(app.get("/", Some(&cookie)).await).await;
        assert!(home.contains("buy milk"));
        assert!(home.contains("alice"));

        let deleted = app
            .form(Method::POST, &format!("/tasks/{}/delete", id), "", Some(&cookie))
            .await;
        assert_eq!(location(&deleted), "/");

        let gone = app.get(&format!("/tasks/{}", id), Some(&cookie)).await;
        assert_eq!(gone.status(), StatusCode::NOT_FOUND);
        assert_eq!(json(gone).await["error"], "Task not found");

        let again = app
            .form(Method::POST, &format!("/tasks/{}/delete", id), "", Some(&cookie))
            .await;
        assert_eq!(again.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn users_only_see_their_own_tasks() {
        let app = TestApp::new().await;
        let alice = app.register("alice", "pw1").await;
        let bob = app.register("bob", "pw2").await;

        app.form(Method::POST, "/tasks", "title=alice+only", Some(&alice)).await;
        let id = app.state.tasks.list_all().await[0].id.clone();

        let bobs = json(app.get("/tasks", Some(&bob)).await).await;
        assert!(bobs.as_array().unwrap().is_empty());

        let peek = app.get(&format!("/tasks/{}", id), Some(&bob)).await;
        assert_eq!(peek.status(), StatusCode::NOT_FOUND);

        let edit = app
            .form(Method::POST, &format!("/tasks/{}", id), "title=hacked", Some(&bob))
            .await;
        assert_eq!(edit.status(), StatusCode::NOT_FOUND);

        let delete = app
            .form(Method::POST, &format!("/tasks/{}/delete", id), "", Some(&bob))
            .await;
        assert_eq!(delete.status(), StatusCode::NOT_FOUND);

        let task = json(app.get(&format!("/tasks/{}", id), Some(&alice)).await).await;
        assert_eq!(task["title"], "alice only");
    }

    #[tokio::test]
    async fn bad_credentials_flash_back_to_the_form() {
        let app = TestApp::new().await;
        app.register("alice", "pw1").await;

        let wrong = app.form(Method::POST, "/login", "username=alice&password=nope", None).await;
        assert!(location(&wrong).starts_with("/login?error="));
        assert!(wrong.headers().get(header::SET_COOKIE).is_none());

        let page = text(app.get(location(&wrong), None).await).await;
        assert!(page.contains("Invalid username or password"));

        let duplicate = app
            .form(Method::POST, "/register", "username=alice&password=pw9", None)
            .await;
        assert!(location(&duplicate).starts_with("/register?error="));

        let mismatch = app
            .form(
                Method::POST,
                "/register",
                "username=carol&password=a&confirm_password=b",
                None,
            )
            .await;
        assert!(location(&mismatch).starts_with("/register?error="));
        assert_eq!(app.state.credentials.len().await, 1);
    }

    #[tokio::test]
    async fn incomplete_or_unhashable_credentials_flash_instead_of_failing() {
        let app = TestApp::new().await;
        app.register("alice", "pw1").await;

        let no_password = app.form(Method::POST, "/login", "username=alice", None).await;
        assert_eq!(no_password.status(), StatusCode::SEE_OTHER);
        assert!(location(&no_password).starts_with("/login?error="));

        let no_username = app.form(Method::POST, "/register", "password=pw", None).await;
        assert_eq!(no_username.status(), StatusCode::SEE_OTHER);
        assert!(location(&no_username).starts_with("/register?error="));

        let nul_login = app
            .form(Method::POST, "/login", "username=alice&password=a%00b", None)
            .await;
        assert!(location(&nul_login).starts_with("/login?error="));

        let nul_register = app
            .form(Method::POST, "/register", "username=bob&password=a%00b", None)
            .await;
        assert!(location(&nul_register).starts_with("/register?error="));

        assert_eq!(app.state.credentials.len().await, 1);
    }

    #[tokio::test]
    async fn logout_ends_the_session() {
        let app = TestApp::new().await;
        let cookie = app.register("alice", "pw1").await;

        assert_eq!(app.get("/tasks", Some(&cookie)).await.status(), StatusCode::OK);

        let logout = app.get("/logout", Some(&cookie)).await;
        assert_eq!(location(&logout), "/login");

        assert_eq!(
            app.get("/tasks", Some(&cookie)).await.status(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[tokio::test]
    async fn logged_in_users_skip_the_login_page() {
        let app = TestApp::new().await;
        let cookie = app.register("alice", "pw1").await;

        let login = app.get("/login", Some(&cookie)).await;
        assert_eq!(location(&login), "/");
        let register = app.get("/register", Some(&cookie)).await;
        assert_eq!(location(&register), "/");
    }

    #[tokio::test]
    async fn tampered_cookie_is_anonymous() {
        let app = TestApp::new().await;
        let cookie = app.register("alice", "pw1").await;

        let mut forged = cookie.clone();
        forged.pop();
        forged.push(if cookie.ends_with('A') { 'B' } else { 'A' });

        assert_eq!(
            app.get("/tasks", Some(&forged)).await.status(),
            StatusCode::UNAUTHORIZED
        );
    }
}
