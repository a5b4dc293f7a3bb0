use std::time::Duration;

use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::{
    handlers::{
        applications::{
            create_application, list_applications_by_company, list_applications_by_service,
            list_my_applications,
        },
        health::livez,
        services::{create_service_with_form, get_service_with_form, list_services_by_company},
    },
    state::AppState,
};

/// Router-level settings that do not belong to the shared state.
#[derive(Debug, Clone)]
pub struct AppOptions {
    pub request_timeout: Duration,
    /// `*` allows any origin.
    pub cors_allowed_origins: Vec<String>,
}

impl Default for AppOptions {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(10),
            cors_allowed_origins: vec!["*".to_string()],
        }
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.iter().any(|origin| origin == "*") {
        AllowOrigin::from(Any)
    } else {
        AllowOrigin::list(
            origins
                .iter()
                .filter_map(|origin| HeaderValue::from_str(origin).ok()),
        )
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

/// Create the application router with all routes and middleware.
pub fn create_app(state: AppState, options: AppOptions) -> Router {
    // API routes with CORS
    let api_routes = Router::new()
        // Service routes
        .route("/service/with-form", post(create_service_with_form))
        .route(
            "/services/company/{company_id}",
            get(list_services_by_company),
        )
        .route(
            "/company/{company_id}/services/{service_id}/form",
            get(get_service_with_form),
        )
        // Application routes
        .route(
            "/company/{company_id}/service/{service_id}/form/{form_id}/applications",
            post(create_application),
        )
        .route(
            "/company/{company_id}/applications",
            get(list_applications_by_company),
        )
        .route(
            "/service/{service_id}/applications",
            get(list_applications_by_service),
        )
        .route("/me/applications", get(list_my_applications))
        .layer(cors_layer(&options.cors_allowed_origins));

    // Main application router
    Router::new()
        .route("/livez", get(livez))
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            options.request_timeout,
        ))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::tests::token_for;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        response::Response,
    };
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn app() -> Router {
        create_app(AppState::default(), AppOptions::default())
    }

    fn form_field(title: &str, number: Value) -> Value {
        json!({
            "fieldTitle": title,
            "fieldDescription": format!("{title} description"),
            "fieldCategory": "TEXT",
            "fieldType": "SHORT",
            "fieldDataType": "TEXT",
            "fieldRequired": true,
            "fieldNumber": number,
        })
    }

    fn service_payload(company_id: Value, name: &str, form: Vec<Value>) -> Value {
        json!({
            "companyId": company_id,
            "service": { "name": name, "description": "Weekly sessions" },
            "form": form,
        })
    }

    fn post_json(uri: &str, body: &Value, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header("Content-Type", "application/json");
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let body = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&body).unwrap()
    }

    /// Creates a service through the API and returns `(service_id, form_id)`.
    async fn create_service(
        app: &Router,
        company_id: Value,
        name: &str,
        form: Vec<Value>,
    ) -> (String, String) {
        let response = app
            .clone()
            .oneshot(post_json(
                "/api/service/with-form",
                &service_payload(company_id, name, form),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let json = json_body(response).await;
        (
            json["serviceId"].as_str().unwrap().to_string(),
            json["formId"].as_str().unwrap().to_string(),
        )
    }

    #[tokio::test]
    async fn test_livez() {
        let response = app().oneshot(get_request("/livez", None)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_create_service_with_form() {
        let response = app()
            .oneshot(post_json(
                "/api/service/with-form",
                &service_payload(json!(7), "Pilates", vec![form_field("Name", json!(1))]),
                None,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let json = json_body(response).await;
        assert_eq!(json["code"], "SUCCESS");
        assert_eq!(json["message"], "SUCCESS");
        assert!(json["serviceId"].as_str().unwrap().starts_with("SVC"));
        assert!(json["formId"].as_str().unwrap().starts_with("FRM"));
    }

    #[tokio::test]
    async fn test_create_service_rejects_unknown_category() {
        let app = app();
        let mut field = form_field("Name", json!(1));
        field["fieldCategory"] = json!("CHOICE");

        let response = app
            .clone()
            .oneshot(post_json(
                "/api/service/with-form",
                &service_payload(json!(7), "Pilates", vec![field]),
                None,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = json_body(response).await;
        assert_eq!(json["code"], "VALIDATION_ERROR");
        assert!(json["errors"]["form.0.fieldCategory"].is_string());

        // Nothing was written.
        let token = token_for("admin");
        let response = app
            .oneshot(get_request("/api/services/company/7", Some(&token)))
            .await
            .unwrap();
        assert_eq!(json_body(response).await["total"], 0);
    }

    #[tokio::test]
    async fn test_create_service_rejects_malformed_json() {
        let response = app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/service/with-form")
                    .header("Content-Type", "application/json")
                    .body(Body::from("{not json"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = json_body(response).await;
        assert_eq!(json["code"], "VALIDATION_ERROR");
        assert!(json["errors"]["_schema"].is_string());
    }

    #[tokio::test]
    async fn test_get_service_with_form_sorts_fields() {
        let app = app();
        let (service_id, _) = create_service(
            &app,
            json!("7"),
            "Pilates",
            vec![form_field("Second", json!(2)), form_field("First", json!(1))],
        )
        .await;

        let response = app
            .oneshot(get_request(
                &format!("/api/company/7/services/{service_id}/form"),
                None,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["service"]["name"], "Pilates");
        assert_eq!(json["service"]["description"], "Weekly sessions");
        let titles: Vec<&str> = json["form"]
            .as_array()
            .unwrap()
            .iter()
            .map(|f| f["fieldTitle"].as_str().unwrap())
            .collect();
        assert_eq!(titles, vec!["First", "Second"]);
        assert_eq!(json["form"][0]["fieldNumber"], 1);
        assert!(json["form"][0]["fieldId"].is_string());
    }

    #[tokio::test]
    async fn test_get_service_with_form_not_found() {
        let response = app()
            .oneshot(get_request("/api/company/7/services/SVC404/form", None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_body(response).await["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_get_service_with_form_wrong_company() {
        let app = app();
        let (service_id, _) = create_service(&app, json!("7"), "Pilates", vec![]).await;

        let response = app
            .oneshot(get_request(
                &format!("/api/company/8/services/{service_id}/form"),
                None,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_list_services_by_company() {
        let app = app();
        for name in ["A1", "A2", "A3"] {
            create_service(&app, json!("A"), name, vec![]).await;
        }
        create_service(&app, json!("B"), "B1", vec![]).await;
        let token = token_for("admin");

        let response = app
            .oneshot(get_request("/api/services/company/A", Some(&token)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["total"], 3);
        for service in json["services"].as_array().unwrap() {
            let mut keys: Vec<&str> =
                service.as_object().unwrap().keys().map(String::as_str).collect();
            keys.sort_unstable();
            assert_eq!(keys, vec!["PK", "createdAt", "description", "name"]);
        }
    }

    #[tokio::test]
    async fn test_list_services_requires_token() {
        let response = app()
            .oneshot(get_request("/api/services/company/A", None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json_body(response).await["code"], "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn test_list_services_rejects_bad_token() {
        let response = app()
            .oneshot(get_request("/api/services/company/A", Some("not-a-jwt")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    fn application_payload(field_value: &str) -> Value {
        let mut field = form_field("Age", json!(1));
        field["fieldId"] = json!("f-1");
        field["fieldDataType"] = json!("NUM");
        field["fieldValue"] = json!(field_value);
        json!({
            "name": "Kim",
            "phoneNumber": "01012345678",
            "fieldData": [field],
        })
    }

    #[tokio::test]
    async fn test_create_application() {
        let app = app();
        let token = token_for("user-1");

        let response = app
            .clone()
            .oneshot(post_json(
                "/api/company/7/service/SVC1/form/FRM1/applications",
                &application_payload("34"),
                Some(&token),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let json = json_body(response).await;
        assert_eq!(json["name"], "Kim");
        assert_eq!(json["phoneNumber"], "01012345678");
        assert!(json["applicationId"].as_str().unwrap().starts_with("APP"));

        let response = app
            .oneshot(get_request("/api/me/applications", Some(&token)))
            .await
            .unwrap();
        let mine = json_body(response).await;
        assert_eq!(mine.as_array().unwrap().len(), 1);
        assert_eq!(mine[0]["userId"], "user-1");
        assert_eq!(mine[0]["status"], "SUBMITTED");
        assert_eq!(mine[0]["fieldData"][0]["fieldValue"], "34");
    }

    #[tokio::test]
    async fn test_create_application_accepts_non_numeric_num_value() {
        let token = token_for("user-1");

        let response = app()
            .oneshot(post_json(
                "/api/company/7/service/SVC1/form/FRM1/applications",
                &application_payload("thirty four"),
                Some(&token),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_create_application_requires_token() {
        let response = app()
            .oneshot(post_json(
                "/api/company/7/service/SVC1/form/FRM1/applications",
                &application_payload("34"),
                None,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_create_application_rejects_missing_fields() {
        let token = token_for("user-1");

        let response = app()
            .oneshot(post_json(
                "/api/company/7/service/SVC1/form/FRM1/applications",
                &json!({ "name": "Kim", "fieldData": [{ "fieldId": "f-1" }] }),
                Some(&token),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = json_body(response).await;
        assert!(json["errors"]["phoneNumber"].is_string());
        assert!(json["errors"]["fieldData.0.fieldValue"].is_string());
    }

    #[tokio::test]
    async fn test_list_applications_by_company_and_service() {
        let app = app();
        let token = token_for("user-1");
        for (company, service) in [("7", "SVC1"), ("7", "SVC2"), ("8", "SVC3")] {
            let response = app
                .clone()
                .oneshot(post_json(
                    &format!("/api/company/{company}/service/{service}/form/FRM1/applications"),
                    &application_payload("1"),
                    Some(&token),
                ))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::CREATED);
        }

        let by_company = app
            .clone()
            .oneshot(get_request("/api/company/7/applications", Some(&token)))
            .await
            .unwrap();
        assert_eq!(json_body(by_company).await.as_array().unwrap().len(), 2);

        let by_service = app
            .oneshot(get_request("/api/service/SVC3/applications", Some(&token)))
            .await
            .unwrap();
        let by_service = json_body(by_service).await;
        assert_eq!(by_service.as_array().unwrap().len(), 1);
        assert_eq!(by_service[0]["companyId"], "8");
    }
}
