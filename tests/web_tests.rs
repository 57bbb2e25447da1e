use axum::{
    Router,
    body::Body,
    http::{Request, Response, StatusCode, header},
};
use http_body_util::BodyExt;
use learning_log::config::Config;
use learning_log::db::Store;
use learning_log::web::SESSION_COOKIE;
use tower::ServiceExt;

const PASSWORD: &str = "correct-horse-battery";

struct TestApp {
    app: Router,
    store: Store,
    config: Config,
}

fn test_config() -> Config {
    let db_file = std::env::temp_dir().join(format!(
        "learning-log-test-{}.db",
        uuid::Uuid::new_v4()
    ));

    let mut config = Config::default();
    config.general.database_path = format!("sqlite:{}", db_file.display());
    config.server.secure_cookies = false;
    config.security.argon2_memory_cost_kib = 64;
    config.security.argon2_time_cost = 1;
    config
}

async fn spawn_app() -> TestApp {
    let config = test_config();

    let state = learning_log::web::create_app_state(config.clone(), None)
        .await
        .expect("Failed to create app state");
    let store = state.store.clone();
    let app = learning_log::web::router(state)
        .await
        .expect("Failed to build router");

    TestApp { app, store, config }
}

impl TestApp {
    async fn get(&self, uri: &str, cookie: Option<&str>) -> Response<Body> {
        let mut request = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }
        self.app
            .clone()
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn post_form(&self, uri: &str, body: &str, cookie: Option<&str>) -> Response<Body> {
        let mut request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }
        self.app
            .clone()
            .oneshot(request.body(Body::from(body.to_string())).unwrap())
            .await
            .unwrap()
    }

    /// Registers `username` through the form and returns the session cookie.
    async fn register(&self, username: &str) -> String {
        let response = self
            .post_form(
                "/accounts/register/",
                &format!("username={username}&password1={PASSWORD}&password2={PASSWORD}"),
                None,
            )
            .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/");
        session_cookie(&response)
    }

    async fn user_id(&self, username: &str) -> i32 {
        self.store
            .get_user_by_username(username)
            .await
            .unwrap()
            .expect("user exists")
            .id
    }

    async fn add_topic(&self, cookie: &str, text: &str) -> i32 {
        let response = self
            .post_form("/new_topic/", &format!("text={}", urlencoding::encode(text)), Some(cookie))
            .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/topics/");

        let mut stored = Vec::new();
        for user in self.store.list_users().await.unwrap() {
            stored.extend(self.store.list_topics_for_owner(user.id).await.unwrap());
        }
        stored
            .into_iter()
            .filter(|t| t.text == text)
            .map(|t| t.id)
            .max()
            .expect("topic stored")
    }

    async fn add_entry(&self, cookie: &str, topic_id: i32, text: &str) -> i32 {
        let response = self
            .post_form(
                &format!("/new_entry/{topic_id}/"),
                &format!("text={}", urlencoding::encode(text)),
                Some(cookie),
            )
            .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), format!("/topics/{topic_id}/"));

        self.store
            .list_entries_for_topic(topic_id)
            .await
            .unwrap()
            .into_iter()
            .find(|e| e.text == text)
            .expect("entry stored")
            .id
    }
}

fn location(response: &Response<Body>) -> String {
    response.headers()[header::LOCATION]
        .to_str()
        .unwrap()
        .to_string()
}

fn session_cookie(response: &Response<Body>) -> String {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with(&format!("{SESSION_COOKIE}=")))
        .and_then(|v| v.split(';').next())
        .expect("session cookie set")
        .to_string()
}

async fn body_text(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

// ============================================================================
// Public pages and routing
// ============================================================================

#[tokio::test]
async fn test_index_is_public() {
    let app = spawn_app().await;

    let response = app.get("/", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["x-frame-options"], "DENY");

    let body = body_text(response).await;
    assert!(body.contains("Learning Log helps you keep track of your learning"));
    assert!(body.contains("/accounts/register/"));
}

#[tokio::test]
async fn test_guarded_pages_redirect_to_login() {
    let app = spawn_app().await;

    for uri in ["/topics/", "/topics/1/", "/new_topic/", "/new_entry/1/", "/edit_entry/1/"] {
        let response = app.get(uri, None).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{uri}");
        assert_eq!(
            location(&response),
            format!("/accounts/login/?next={}", urlencoding::encode(uri))
        );
    }

    let response = app.post_form("/new_topic/", "text=Chess", None).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(app.store.count_topics().await.unwrap(), 0);
}

#[tokio::test]
async fn test_missing_trailing_slash_redirects() {
    let app = spawn_app().await;

    let response = app.get("/topics", None).await;
    assert_eq!(response.status(), StatusCode::PERMANENT_REDIRECT);
    assert_eq!(location(&response), "/topics/");

    let response = app.get("/accounts/login?next=/topics/", None).await;
    assert_eq!(location(&response), "/accounts/login/?next=/topics/");
}

#[tokio::test]
async fn test_unknown_path_is_404() {
    let app = spawn_app().await;

    let response = app.get("/no-such-page/", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(body_text(response).await.contains("Not Found"));
}

// ============================================================================
// Accounts
// ============================================================================

#[tokio::test]
async fn test_register_logs_user_in() {
    let app = spawn_app().await;

    let cookie = app.register("ada").await;
    assert!(app.store.get_user_by_username("ada").await.unwrap().is_some());

    let response = app.get("/topics/", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("Hello, ada."));
    assert!(body.contains("No topics have been added yet."));
}

#[tokio::test]
async fn test_register_rejects_mismatched_passwords() {
    let app = spawn_app().await;

    let response = app
        .post_form(
            "/accounts/register/",
            "username=ada&password1=correct-horse-battery&password2=wrong-horse-battery",
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get(header::SET_COOKIE).is_none());

    let body = body_text(response).await;
    assert!(body.contains("The two password fields didn't match."));
    assert!(body.contains("value=\"ada\""));
    assert!(app.store.list_users().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_register_rejects_taken_username() {
    let app = spawn_app().await;
    app.register("ada").await;

    let response = app
        .post_form(
            "/accounts/register/",
            &format!("username=ada&password1={PASSWORD}&password2={PASSWORD}"),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        body_text(response)
            .await
            .contains("A user with that username already exists.")
    );
    assert_eq!(app.store.list_users().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_login_and_logout() {
    let app = spawn_app().await;
    app.store
        .create_user("grace", PASSWORD, &app.config.security)
        .await
        .unwrap();

    let response = app.get("/accounts/login/?next=/topics/", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        body_text(response)
            .await
            .contains("name=\"next\" value=\"/topics/\"")
    );

    let response = app
        .post_form(
            "/accounts/login/",
            "username=grace&password=not-the-password",
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        body_text(response)
            .await
            .contains("Please enter a correct username and password.")
    );

    let response = app
        .post_form(
            "/accounts/login/",
            &format!("username=grace&password={PASSWORD}&next=%2Ftopics%2F"),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/topics/");
    let cookie = session_cookie(&response);

    let user = app.store.get_user_by_username("grace").await.unwrap().unwrap();
    assert!(user.last_login.is_some());

    let response = app.get("/topics/", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.post_form("/accounts/logout/", "", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("You have been logged out."));

    let response = app.get("/topics/", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn test_login_ignores_offsite_next() {
    let app = spawn_app().await;
    app.store
        .create_user("grace", PASSWORD, &app.config.security)
        .await
        .unwrap();

    let response = app
        .post_form(
            "/accounts/login/",
            &format!("username=grace&password={PASSWORD}&next=%2F%2Fevil.example%2F"),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
}

// ============================================================================
// Topics and entries
// ============================================================================

#[tokio::test]
async fn test_topics_are_isolated_per_owner() {
    let app = spawn_app().await;
    let ada = app.register("ada").await;
    let grace = app.register("grace").await;

    app.add_topic(&ada, "Chess").await;
    app.add_topic(&ada, "Rock Climbing").await;
    app.add_topic(&grace, "Compilers").await;

    let body = body_text(app.get("/topics/", Some(&ada)).await).await;
    let chess = body.find("Chess").expect("Chess listed");
    let climbing = body.find("Rock Climbing").expect("Rock Climbing listed");
    assert!(chess < climbing);
    assert!(!body.contains("Compilers"));

    let body = body_text(app.get("/topics/", Some(&grace)).await).await;
    assert!(body.contains("Compilers"));
    assert!(!body.contains("Chess"));
}

#[tokio::test]
async fn test_topic_owner_comes_from_session() {
    let app = spawn_app().await;
    let _ada = app.register("ada").await;
    let grace = app.register("grace").await;
    let ada_id = app.user_id("ada").await;
    let grace_id = app.user_id("grace").await;

    let response = app
        .post_form(
            "/new_topic/",
            &format!("text=Spoofed&owner={ada_id}&owner_id={ada_id}"),
            Some(&grace),
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    assert!(app.store.list_topics_for_owner(ada_id).await.unwrap().is_empty());
    let topics = app.store.list_topics_for_owner(grace_id).await.unwrap();
    assert_eq!(topics.len(), 1);
    assert_eq!(topics[0].text, "Spoofed");
}

#[tokio::test]
async fn test_empty_topic_is_rejected() {
    let app = spawn_app().await;
    let ada = app.register("ada").await;

    let response = app.get("/new_topic/", Some(&ada)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.post_form("/new_topic/", "text=+++", Some(&ada)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("This field is required."));
    assert_eq!(app.store.count_topics().await.unwrap(), 0);
}

#[tokio::test]
async fn test_overlong_topic_is_rejected() {
    let app = spawn_app().await;
    let ada = app.register("ada").await;

    let response = app
        .post_form("/new_topic/", &format!("text={}", "a".repeat(201)), Some(&ada))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        body_text(response)
            .await
            .contains("Ensure this value has at most 200 characters (it has 201).")
    );
    assert_eq!(app.store.count_topics().await.unwrap(), 0);
}

#[tokio::test]
async fn test_empty_entry_is_rejected() {
    let app = spawn_app().await;
    let ada = app.register("ada").await;
    let topic_id = app.add_topic(&ada, "Chess").await;

    let response = app
        .post_form(&format!("/new_entry/{topic_id}/"), "text=+%0A", Some(&ada))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_text(response).await;
    assert!(body.contains("This field is required."));
    assert!(body.contains(&format!("action=\"/new_entry/{topic_id}/\"")));
    assert_eq!(app.store.count_entries().await.unwrap(), 0);
}

#[tokio::test]
async fn test_unrouted_file_paths_are_not_redirected() {
    let app = spawn_app().await;

    let response = app.get("/favicon.ico", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(response.headers().get(header::LOCATION).is_none());

    let response = app.get("/topics/7", None).await;
    assert_eq!(response.status(), StatusCode::PERMANENT_REDIRECT);
    assert_eq!(location(&response), "/topics/7/");
}

#[tokio::test]
async fn test_other_users_records_are_not_found() {
    let app = spawn_app().await;
    let ada = app.register("ada").await;
    let grace = app.register("grace").await;

    let topic_id = app.add_topic(&ada, "Chess").await;
    let entry_id = app.add_entry(&ada, topic_id, "Learned the Sicilian.").await;

    let response = app.get(&format!("/topics/{topic_id}/"), Some(&grace)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.get(&format!("/new_entry/{topic_id}/"), Some(&grace)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .post_form(&format!("/new_entry/{topic_id}/"), "text=Intruder", Some(&grace))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(app.store.count_entries().await.unwrap(), 1);

    let response = app.get(&format!("/edit_entry/{entry_id}/"), Some(&grace)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .post_form(&format!("/edit_entry/{entry_id}/"), "text=Defaced", Some(&grace))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let entry = app.store.get_entry(entry_id).await.unwrap().unwrap();
    assert_eq!(entry.text, "Learned the Sicilian.");
}

#[tokio::test]
async fn test_missing_and_malformed_ids_are_not_found() {
    let app = spawn_app().await;
    let ada = app.register("ada").await;

    for uri in ["/topics/999/", "/topics/abc/", "/new_entry/999/", "/edit_entry/-1/"] {
        let response = app.get(uri, Some(&ada)).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");
    }
}

#[tokio::test]
async fn test_entries_are_listed_newest_first() {
    let app = spawn_app().await;
    let ada = app.register("ada").await;
    let topic_id = app.add_topic(&ada, "Chess").await;

    app.add_entry(&ada, topic_id, "Opening principles").await;
    app.add_entry(&ada, topic_id, "Endgame technique").await;

    let response = app.get(&format!("/topics/{topic_id}/"), Some(&ada)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_text(response).await;
    assert!(body.contains("Topic: Chess"));
    let newer = body.find("Endgame technique").unwrap();
    let older = body.find("Opening principles").unwrap();
    assert!(newer < older);
}

#[tokio::test]
async fn test_new_entry_ignores_submitted_topic() {
    let app = spawn_app().await;
    let ada = app.register("ada").await;
    let chess = app.add_topic(&ada, "Chess").await;
    let go = app.add_topic(&ada, "Go").await;

    let response = app
        .post_form(
            &format!("/new_entry/{chess}/"),
            &format!("text=Forks&topic={go}&topic_id={go}"),
            Some(&ada),
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), format!("/topics/{chess}/"));

    assert_eq!(app.store.list_entries_for_topic(chess).await.unwrap().len(), 1);
    assert!(app.store.list_entries_for_topic(go).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_edit_entry_changes_only_text() {
    let app = spawn_app().await;
    let ada = app.register("ada").await;
    let chess = app.add_topic(&ada, "Chess").await;
    let go = app.add_topic(&ada, "Go").await;
    let entry_id = app.add_entry(&ada, chess, "Forks win material").await;
    let before = app.store.get_entry(entry_id).await.unwrap().unwrap();

    let response = app.get(&format!("/edit_entry/{entry_id}/"), Some(&ada)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Forks win material"));

    let response = app
        .post_form(
            &format!("/edit_entry/{entry_id}/"),
            &format!("text=Pins+win+material&topic={go}&id=77&date_added=2001-01-01"),
            Some(&ada),
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), format!("/topics/{chess}/"));

    let after = app.store.get_entry(entry_id).await.unwrap().unwrap();
    assert_eq!(after.text, "Pins win material");
    assert_eq!(after.topic_id, chess);
    assert_eq!(after.date_added, before.date_added);
}

#[tokio::test]
async fn test_edit_entry_rejects_empty_text() {
    let app = spawn_app().await;
    let ada = app.register("ada").await;
    let chess = app.add_topic(&ada, "Chess").await;
    let entry_id = app.add_entry(&ada, chess, "Forks win material").await;

    let response = app
        .post_form(&format!("/edit_entry/{entry_id}/"), "text=", Some(&ada))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("This field is required."));

    let entry = app.store.get_entry(entry_id).await.unwrap().unwrap();
    assert_eq!(entry.text, "Forks win material");
}
