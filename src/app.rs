use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware::from_fn_with_state,
    routing::{get, post, MethodRouter},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::handlers::{protected, public};
use crate::middleware::{auth_middleware, AuthGate};
use crate::services::AuthPolicy;
use crate::state::AppState;

/// Build the full router for `state`.
pub fn app(state: AppState) -> Router {
    let images = ServeDir::new(state.config.storage.image_dir.clone());

    let router = Router::new()
        // Public
        .route("/health", get(public::health))
        .route("/admin/login", post(public::login))
        .nest_service("/images", images)
        // Protected
        .merge(admin_routes(&state))
        .merge(student_routes(&state))
        .merge(university_routes(&state))
        .merge(study_program_routes(&state))
        .merge(knowledge_routes(&state))
        .layer(
            ServiceBuilder::new()
                .layer(cors_layer(&state.config.security.cors_origins))
                .layer(DefaultBodyLimit::max(state.config.api.max_request_size_bytes)),
        );

    let router = if state.config.api.enable_request_logging {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    };

    router.with_state(state)
}

/// Wrap `route` in the auth middleware with `policy`.
fn guarded(state: &AppState, policy: AuthPolicy, route: MethodRouter<AppState>) -> MethodRouter<AppState> {
    let gate = AuthGate::new(state.admins.clone(), policy);
    route.route_layer(from_fn_with_state(gate, auth_middleware))
}

fn admin_routes(state: &AppState) -> Router<AppState> {
    use protected::admin;

    Router::new()
        // Creating admins only checks the token signature
        .route("/admin/create", guarded(state, AuthPolicy::LOCAL, post(admin::create)))
        .route("/admin/profil", guarded(state, AuthPolicy::DATABASE, post(admin::profile)))
        .route("/admin/logout", guarded(state, AuthPolicy::DATABASE, post(admin::logout)))
}

fn student_routes(state: &AppState) -> Router<AppState> {
    use protected::{student, upload};

    let db = |route| guarded(state, AuthPolicy::DATABASE, route);
    Router::new()
        .route("/student/create", db(post(student::create)))
        .route("/student/all", db(post(student::list)))
        .route("/student/id", db(post(student::get)))
        .route("/student/delete", db(post(student::delete)))
        .route("/student/deactivate", db(post(student::deactivate)))
        .route("/student/update", db(post(student::update)))
        .route("/student/add-service", db(post(student::add_service)))
        .route("/student/update-service", db(post(student::update_service)))
        .route("/student/delete-service", db(post(student::delete_service)))
        .route("/student/add-lobby", db(post(student::add_lobby)))
        .route("/student/activated-all", db(post(student::activate_all)))
        .route("/student/upload", db(post(upload::image)))
        .route("/student/upload-excel", db(post(upload::import_students)))
}

fn university_routes(state: &AppState) -> Router<AppState> {
    use protected::university;

    let db = |route| guarded(state, AuthPolicy::DATABASE, route);
    Router::new()
        .route("/university/create", db(post(university::create)))
        .route("/university/update", db(post(university::update)))
        .route("/university/delete", db(post(university::delete)))
        .route("/university/id", db(post(university::get)))
        .route("/university/all", db(post(university::list)))
        .route("/university/name", db(post(university::by_name)))
}

fn study_program_routes(state: &AppState) -> Router<AppState> {
    use protected::{study_program, upload};

    let db = |route| guarded(state, AuthPolicy::DATABASE, route);
    Router::new()
        .route("/study-program/create", db(post(study_program::create)))
        .route("/study-program/update", db(post(study_program::update)))
        .route("/study-program/delete", db(post(study_program::delete)))
        .route("/study-program/id", db(post(study_program::get)))
        .route("/study-program/all", db(post(study_program::list)))
        .route("/study-program/upload", db(post(upload::import_programs)))
}

fn knowledge_routes(state: &AppState) -> Router<AppState> {
    use protected::knowledge_base;

    let db = |route| guarded(state, AuthPolicy::DATABASE, route);
    Router::new()
        .route("/knowledge-base/create", db(post(knowledge_base::create)))
        .route("/knowledge-base/update", db(post(knowledge_base::update)))
        .route("/knowledge-base/delete", db(post(knowledge_base::delete)))
        .route("/knowledge-base/all", db(post(knowledge_base::list)))
        .route("/knowledge-programs/add", db(post(knowledge_base::add_program)))
        .route("/knowledge-programs/update", db(post(knowledge_base::update_program)))
        .route("/knowledge-programs/delete", db(post(knowledge_base::remove_program)))
        .route("/knowledge-programs/get", db(post(knowledge_base::programs)))
}

/// An empty origin list allows any origin.
fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods(Any)
        .allow_headers(Any)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::services::NewAdmin;
    use crate::testing::TestContext;

    fn post_json(uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    async fn read_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn protected_route_requires_header() {
        let ctx = TestContext::new();
        let response = app(ctx.state.clone())
            .oneshot(post_json("/student/all", None, json!({})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = read_json(response).await;
        assert_eq!(body["data"]["status"]["pesan"], "No Authorization header provided");
    }

    #[tokio::test]
    async fn login_then_list_students() {
        let ctx = TestContext::new();
        ctx.state
            .admins
            .register(NewAdmin {
                username: "root".into(),
                password: "secret".into(),
                ..Default::default()
            })
            .await
            .unwrap();

        let response = app(ctx.state.clone())
            .oneshot(post_json(
                "/admin/login",
                None,
                json!({"username": "root", "password": "secret"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json(response).await;
        let token = body["data"]["results"]["token"].as_str().unwrap().to_string();
        assert_eq!(body["data"]["results"]["admin"]["Username"], "root");

        let response = app(ctx.state.clone())
            .oneshot(post_json("/student/all", Some(&token), json!({"page": "1"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json(response).await;
        assert_eq!(body["data"]["results"]["TotalRecords"], 0);
        assert_eq!(body["data"]["results"]["CurrentPage"], 1);
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let ctx = TestContext::new();
        let response = app(ctx.state.clone())
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
