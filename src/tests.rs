#[cfg(test)]
mod integration_tests {
    use crate::handlers::auth::RegisterRequest;
    use crate::handlers::orders::{CreateOrderRequest, OrderLineRequest};
    use crate::handlers::shipping::wilaya_cache_key;
    use crate::router::create_router;
    use crate::schemas::{ApiResponse, CachedData, ErrorResponse};
    use crate::test_utils::test_utils::{
        ADMIN_EMAIL, CUSTOMER_EMAIL, EMPLOYEE_EMAIL, insert_book, insert_wilaya, setup_test_app,
        setup_test_server, sign_in,
    };
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use rust_decimal::Decimal;
    use serde_json::{Value, json};

    fn decimal(value: &Value) -> Decimal {
        value
            .as_str()
            .expect("decimal fields are serialized as strings")
            .parse()
            .expect("valid decimal")
    }

    fn checkout(wilaya_code: Option<i32>, items: Vec<(i32, i32)>) -> CreateOrderRequest {
        CreateOrderRequest {
            customer_name: "Yasmina Khadra".to_string(),
            phone: "0661234567".to_string(),
            address: "12 Rue Larbi Ben M'hidi".to_string(),
            city: "Oran".to_string(),
            wilaya_code,
            wilaya_name: None,
            baladiya: Some("Es Senia".to_string()),
            notes: None,
            items: items
                .into_iter()
                .map(|(book_id, quantity)| OrderLineRequest { book_id, quantity })
                .collect(),
        }
    }

    #[tokio::test]
    async fn test_health_check() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let response = server.get("/health").await;

        response.assert_status(StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["database"], "connected");
    }

    #[tokio::test]
    async fn test_register_signs_in_and_hides_password() {
        let (server, _state) = setup_test_server().await;

        let request = RegisterRequest {
            email: "New.Reader@Example.com".to_string(),
            password: "pass1234".to_string(),
            name: "New Reader".to_string(),
            phone: None,
        };
        let response = server.post("/api/v1/register").json(&request).await;

        response.assert_status(StatusCode::CREATED);
        let body: ApiResponse<Value> = response.json();
        assert!(body.success);
        assert_eq!(body.data["email"], "new.reader@example.com");
        assert_eq!(body.data["role"], "user");
        assert_eq!(body.data["points"], 0);
        assert!(body.data.get("password").is_none());

        let current: ApiResponse<Value> = server.get("/api/v1/user").await.json();
        assert_eq!(current.data["email"], "new.reader@example.com");

        let duplicate = server.post("/api/v1/register").json(&request).await;
        duplicate.assert_status(StatusCode::BAD_REQUEST);
        let error: ErrorResponse = duplicate.json();
        assert_eq!(error.code, "EMAIL_ALREADY_REGISTERED");
        assert!(!error.success);
    }

    #[tokio::test]
    async fn test_register_validates_payload() {
        let (server, _state) = setup_test_server().await;

        let response = server
            .post("/api/v1/register")
            .json(&json!({ "email": "short@example.com", "password": "123", "name": "Al" }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_login_logout_cycle() {
        let (server, _state) = setup_test_server().await;

        let wrong = server
            .post("/api/v1/login")
            .json(&json!({ "username": CUSTOMER_EMAIL, "password": "not-the-password" }))
            .await;
        wrong.assert_status(StatusCode::UNAUTHORIZED);
        let error: ErrorResponse = wrong.json();
        assert_eq!(error.code, "INVALID_CREDENTIALS");

        let anonymous: ApiResponse<Value> = server.get("/api/v1/user").await.json();
        assert!(anonymous.data.is_null());

        sign_in(&server, CUSTOMER_EMAIL).await;
        let current: ApiResponse<Value> = server.get("/api/v1/user").await.json();
        assert_eq!(current.data["email"], CUSTOMER_EMAIL);

        server.post("/api/v1/logout").await.assert_status_ok();
        let after: ApiResponse<Value> = server.get("/api/v1/user").await.json();
        assert!(after.data.is_null());
        server.get("/api/v1/profile").await.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_disabled_account_is_signed_out_immediately() {
        let (customer, state) = setup_test_server().await;
        let mut admin = TestServer::new(create_router(state.clone())).unwrap();
        admin.do_save_cookies();

        sign_in(&customer, CUSTOMER_EMAIL).await;
        sign_in(&admin, ADMIN_EMAIL).await;
        customer.get("/api/v1/profile").await.assert_status_ok();

        let reader = storage::users::find_by_email(&state.db, CUSTOMER_EMAIL)
            .await
            .unwrap()
            .unwrap();
        admin
            .put(&format!("/api/v1/admin/customers/{}", reader.id))
            .json(&json!({ "enabled": false }))
            .await
            .assert_status_ok();

        customer.get("/api/v1/profile").await.assert_status(StatusCode::UNAUTHORIZED);
        let relogin = customer
            .post("/api/v1/login")
            .json(&json!({ "username": CUSTOMER_EMAIL, "password": crate::test_utils::test_utils::PASSWORD }))
            .await;
        relogin.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_book_catalogue_visibility_and_staff_gate() {
        let (server, state) = setup_test_server().await;
        insert_book(&state.db, "La Soif", 1200, 7).await;

        let create = json!({
            "title_ar": "العطش",
            "title_en": "Hidden Draft",
            "author": "Assia Djebar",
            "price": "1500",
            "category": "Fiction",
            "published": false,
            "stock": 2
        });

        // Anonymous and customer callers cannot mutate the catalogue
        server.post("/api/v1/books").json(&create).await.assert_status(StatusCode::UNAUTHORIZED);
        sign_in(&server, CUSTOMER_EMAIL).await;
        let forbidden = server.post("/api/v1/books").json(&create).await;
        forbidden.assert_status(StatusCode::UNAUTHORIZED);
        let error: ErrorResponse = forbidden.json();
        assert_eq!(error.code, "UNAUTHORIZED");

        sign_in(&server, EMPLOYEE_EMAIL).await;
        let created = server.post("/api/v1/books").json(&create).await;
        created.assert_status(StatusCode::CREATED);
        let body: ApiResponse<Value> = created.json();
        assert_eq!(body.message, "Book created successfully");
        assert_eq!(decimal(&body.data["price"]), Decimal::from(1500));
        let book_id = body.data["id"].as_i64().unwrap();

        let staff_view: ApiResponse<Vec<Value>> = server.get("/api/v1/books").await.json();
        assert_eq!(staff_view.data.len(), 2);

        server.post("/api/v1/logout").await.assert_status_ok();
        let public_view: ApiResponse<Vec<Value>> = server.get("/api/v1/books").await.json();
        assert_eq!(public_view.data.len(), 1);
        assert_eq!(public_view.data[0]["title_en"], "La Soif");

        let search: ApiResponse<Vec<Value>> = server
            .get("/api/v1/books")
            .add_query_param("search", "soif")
            .await
            .json();
        assert_eq!(search.data.len(), 1);

        server.get("/api/v1/books/9999").await.assert_status(StatusCode::NOT_FOUND);

        // Unpublished books stay hidden everywhere outside the back office
        server
            .get(&format!("/api/v1/books/{}", book_id))
            .await
            .assert_status(StatusCode::NOT_FOUND);
        sign_in(&server, CUSTOMER_EMAIL).await;
        let hidden = server
            .post("/api/v1/orders")
            .json(&checkout(None, vec![(book_id as i32, 1)]))
            .await;
        hidden.assert_status(StatusCode::BAD_REQUEST);
        let error: ErrorResponse = hidden.json();
        assert_eq!(error.code, "BOOK_NOT_FOUND");

        sign_in(&server, EMPLOYEE_EMAIL).await;
        server
            .get(&format!("/api/v1/books/{}", book_id))
            .await
            .assert_status_ok();
    }

    #[tokio::test]
    async fn test_book_validation_rejects_negative_values() {
        let (server, _state) = setup_test_server().await;
        sign_in(&server, ADMIN_EMAIL).await;

        let response = server
            .post("/api/v1/books")
            .json(&json!({
                "title_ar": "x",
                "title_en": "x",
                "author": "x",
                "price": "-5",
                "category": "Fiction"
            }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);

        let response = server
            .post("/api/v1/books")
            .json(&json!({
                "title_ar": "x",
                "title_en": "x",
                "author": "x",
                "price": "5",
                "category": "Fiction",
                "stock": -1
            }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_oversized_amounts_are_rejected() {
        let (server, state) = setup_test_server().await;
        let book = insert_book(&state.db, "Nedjma", 2500, 4).await;
        let rare = insert_book(&state.db, "Incunable", 9_000_000_000, 1).await;

        sign_in(&server, ADMIN_EMAIL).await;
        server
            .put(&format!("/api/v1/books/{}", book.id))
            .json(&json!({ "price": "10000000000000000000000" }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
        server
            .put("/api/v1/admin/shipping/wilayas")
            .json(&json!({ "default_price": "10000000000" }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);

        sign_in(&server, CUSTOMER_EMAIL).await;
        server
            .post("/api/v1/orders")
            .json(&checkout(None, vec![(book.id, 2_000_000_000)]))
            .await
            .assert_status(StatusCode::BAD_REQUEST);

        let overflow = server
            .post("/api/v1/orders")
            .json(&checkout(None, vec![(rare.id, 2)]))
            .await;
        overflow.assert_status(StatusCode::BAD_REQUEST);
        let error: ErrorResponse = overflow.json();
        assert_eq!(error.code, "INVALID_REQUEST");

        let mine: ApiResponse<Vec<Value>> = server.get("/api/v1/profile/orders").await.json();
        assert!(mine.data.is_empty());
    }

    #[tokio::test]
    async fn test_category_slug_conflict() {
        let (server, _state) = setup_test_server().await;
        sign_in(&server, ADMIN_EMAIL).await;

        let category = json!({ "name_ar": "تاريخ", "name_en": "History", "slug": "history" });
        server.post("/api/v1/categories").json(&category).await.assert_status(StatusCode::CREATED);

        let duplicate = server.post("/api/v1/categories").json(&category).await;
        duplicate.assert_status(StatusCode::CONFLICT);
        let error: ErrorResponse = duplicate.json();
        assert_eq!(error.code, "SLUG_ALREADY_EXISTS");

        let listed: ApiResponse<Vec<Value>> = server.get("/api/v1/categories").await.json();
        assert_eq!(listed.data.len(), 1);
    }

    #[tokio::test]
    async fn test_checkout_totals_and_price_snapshot() {
        let (server, state) = setup_test_server().await;
        let first = insert_book(&state.db, "Nedjma", 2500, 4).await;
        let second = insert_book(&state.db, "Le Quai aux fleurs", 1800, 4).await;
        insert_wilaya(&state.db, 31, "Oran", 600, true).await;
        insert_wilaya(&state.db, 11, "Tamanrasset", 1600, false).await;

        let anonymous = server
            .post("/api/v1/orders")
            .json(&checkout(Some(31), vec![(first.id, 1)]))
            .await;
        anonymous.assert_status(StatusCode::UNAUTHORIZED);
        let error: ErrorResponse = anonymous.json();
        assert_eq!(error.code, "LOGIN_REQUIRED");

        sign_in(&server, CUSTOMER_EMAIL).await;
        let placed = server
            .post("/api/v1/orders")
            .json(&checkout(Some(31), vec![(first.id, 2), (second.id, 1)]))
            .await;
        placed.assert_status(StatusCode::CREATED);
        let order: ApiResponse<Value> = placed.json();
        assert_eq!(order.data["status"], "pending");
        assert_eq!(decimal(&order.data["shipping_price"]), Decimal::from(600));
        assert_eq!(decimal(&order.data["total"]), Decimal::from(7400));
        assert_eq!(order.data["wilaya_name"], "Oran");
        assert_eq!(order.data["items"].as_array().unwrap().len(), 2);
        assert_eq!(decimal(&order.data["items"][0]["unit_price"]), Decimal::from(2500));

        // Inactive zone ships free
        let free: ApiResponse<Value> = server
            .post("/api/v1/orders")
            .json(&checkout(Some(11), vec![(second.id, 1)]))
            .await
            .json();
        assert_eq!(decimal(&free.data["shipping_price"]), Decimal::ZERO);
        assert_eq!(decimal(&free.data["total"]), Decimal::from(1800));

        let missing = server
            .post("/api/v1/orders")
            .json(&checkout(Some(31), vec![(first.id, 1), (4040, 1)]))
            .await;
        missing.assert_status(StatusCode::BAD_REQUEST);
        let error: ErrorResponse = missing.json();
        assert_eq!(error.code, "BOOK_NOT_FOUND");

        let empty = server.post("/api/v1/orders").json(&checkout(None, vec![])).await;
        empty.assert_status(StatusCode::BAD_REQUEST);

        let mine: ApiResponse<Vec<Value>> = server.get("/api/v1/profile/orders").await.json();
        assert_eq!(mine.data.len(), 2);
    }

    #[tokio::test]
    async fn test_order_visibility() {
        let (server, state) = setup_test_server().await;
        let book = insert_book(&state.db, "Nedjma", 1000, 4).await;

        sign_in(&server, CUSTOMER_EMAIL).await;
        let order: ApiResponse<Value> = server
            .post("/api/v1/orders")
            .json(&checkout(None, vec![(book.id, 1)]))
            .await
            .json();
        let order_id = order.data["id"].as_i64().unwrap();
        server
            .get(&format!("/api/v1/orders/{}", order_id))
            .await
            .assert_status_ok();

        let other = RegisterRequest {
            email: "other@example.com".to_string(),
            password: "other123".to_string(),
            name: "Other Reader".to_string(),
            phone: None,
        };
        server.post("/api/v1/register").json(&other).await.assert_status(StatusCode::CREATED);
        server
            .get(&format!("/api/v1/orders/{}", order_id))
            .await
            .assert_status(StatusCode::NOT_FOUND);
        let own: ApiResponse<Vec<Value>> = server.get("/api/v1/orders").await.json();
        assert!(own.data.is_empty());

        sign_in(&server, EMPLOYEE_EMAIL).await;
        let all: ApiResponse<Vec<Value>> = server.get("/api/v1/orders").await.json();
        assert_eq!(all.data.len(), 1);
    }

    #[tokio::test]
    async fn test_confirmation_awards_points_once_and_is_logged() {
        let (server, state) = setup_test_server().await;
        let book = insert_book(&state.db, "L'Amour, la fantasia", 2500, 4).await;
        insert_wilaya(&state.db, 16, "Algiers", 400, true).await;

        sign_in(&server, CUSTOMER_EMAIL).await;
        let order: ApiResponse<Value> = server
            .post("/api/v1/orders")
            .json(&checkout(Some(16), vec![(book.id, 2)]))
            .await
            .json();
        let order_id = order.data["id"].as_i64().unwrap();

        // Customers cannot change statuses
        server
            .put(&format!("/api/v1/orders/{}/status", order_id))
            .json(&json!({ "status": "confirmed" }))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);

        sign_in(&server, ADMIN_EMAIL).await;
        let invalid = server
            .put(&format!("/api/v1/orders/{}/status", order_id))
            .json(&json!({ "status": "teleported" }))
            .await;
        invalid.assert_status(StatusCode::BAD_REQUEST);

        let confirmed = server
            .put(&format!("/api/v1/orders/{}/status", order_id))
            .json(&json!({ "status": "confirmed" }))
            .await;
        confirmed.assert_status_ok();
        let body: ApiResponse<Value> = confirmed.json();
        assert_eq!(body.data["status"], "confirmed");
        assert_eq!(body.data["points_awarded"], true);
        assert!(body.message.contains("14 points awarded"));

        for status in ["pending", "confirmed"] {
            server
                .put(&format!("/api/v1/orders/{}/status", order_id))
                .json(&json!({ "status": status }))
                .await
                .assert_status_ok();
        }

        let reader = storage::users::find_by_email(&state.db, CUSTOMER_EMAIL)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(reader.points, 14);

        let activity: ApiResponse<Vec<Value>> = server.get("/api/v1/admin/activity").await.json();
        let actions: Vec<&str> = activity.data.iter().filter_map(|entry| entry["action"].as_str()).collect();
        assert_eq!(actions.iter().filter(|action| **action == "Awarded 14 points").count(), 1);
        let award = activity
            .data
            .iter()
            .find(|entry| entry["action"] == "Awarded 14 points")
            .unwrap();
        assert_eq!(award["entity_type"], "order");
        assert_eq!(award["entity_id"], order_id);
        assert_eq!(award["details"], format!("Customer #{}", reader.id));
        assert_eq!(
            actions.iter().filter(|action| **action == "Updated order status to confirmed").count(),
            2
        );
        assert_eq!(activity.data[0]["admin_email"], ADMIN_EMAIL);
    }

    #[tokio::test]
    async fn test_points_redemption() {
        let (server, state) = setup_test_server().await;
        let book = insert_book(&state.db, "Les Alouettes naïves", 1800, 4).await;
        let reader = storage::users::find_by_email(&state.db, CUSTOMER_EMAIL)
            .await
            .unwrap()
            .unwrap();

        sign_in(&server, CUSTOMER_EMAIL).await;
        let poor = server
            .post("/api/v1/points/redeem")
            .json(&json!({ "book_id": book.id }))
            .await;
        poor.assert_status(StatusCode::BAD_REQUEST);
        let error: ErrorResponse = poor.json();
        assert_eq!(error.code, "INSUFFICIENT_POINTS");

        sign_in(&server, ADMIN_EMAIL).await;
        server
            .put(&format!("/api/v1/admin/customers/{}/points", reader.id))
            .json(&json!({ "points": -4 }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
        let set: ApiResponse<Value> = server
            .put(&format!("/api/v1/admin/customers/{}/points", reader.id))
            .json(&json!({ "points": 20 }))
            .await
            .json();
        assert_eq!(set.data["points"], 20);

        sign_in(&server, CUSTOMER_EMAIL).await;
        let redeemed = server
            .post("/api/v1/points/redeem")
            .json(&json!({ "book_id": book.id, "quantity": 2 }))
            .await;
        redeemed.assert_status_ok();
        let body: ApiResponse<Value> = redeemed.json();
        assert_eq!(body.data["points_used"], 12);
        assert_eq!(body.data["remaining_points"], 8);
        assert_eq!(decimal(&body.data["order"]["total"]), Decimal::ZERO);
        assert_eq!(body.data["order"]["points_used"], 12);
        assert_eq!(body.data["order"]["notes"], "Points redemption: 12 points used");

        let profile: ApiResponse<Value> = server.get("/api/v1/profile").await.json();
        assert_eq!(profile.data["points"], 8);
    }

    #[tokio::test]
    async fn test_customer_management() {
        let (server, state) = setup_test_server().await;
        sign_in(&server, ADMIN_EMAIL).await;

        let created = server
            .post("/api/v1/admin/customers")
            .json(&json!({
                "email": "walkin@example.com",
                "password": "walkin1",
                "name": "Walk In",
                "city": "Bejaia"
            }))
            .await;
        created.assert_status(StatusCode::CREATED);
        let body: ApiResponse<Value> = created.json();
        let customer_id = body.data["id"].as_i64().unwrap();
        assert_eq!(body.data["role"], "user");

        let updated: ApiResponse<Value> = server
            .put(&format!("/api/v1/admin/customers/{}", customer_id))
            .json(&json!({ "role": "overlord", "name": "Walk In Customer" }))
            .await
            .json();
        assert_eq!(updated.data["role"], "user");
        assert_eq!(updated.data["name"], "Walk In Customer");

        let admin = storage::users::find_by_email(&state.db, ADMIN_EMAIL)
            .await
            .unwrap()
            .unwrap();
        let protected = server
            .delete(&format!("/api/v1/admin/customers/{}", admin.id))
            .await;
        protected.assert_status(StatusCode::BAD_REQUEST);
        let error: ErrorResponse = protected.json();
        assert_eq!(error.code, "CANNOT_DELETE_ADMIN");

        server
            .delete(&format!("/api/v1/admin/customers/{}", customer_id))
            .await
            .assert_status(StatusCode::NO_CONTENT);
        server
            .get(&format!("/api/v1/admin/customers/{}", customer_id))
            .await
            .assert_status(StatusCode::NOT_FOUND);

        let listed: ApiResponse<Vec<Value>> = server.get("/api/v1/admin/customers").await.json();
        assert_eq!(listed.data.len(), 3);
        assert!(listed.data.iter().all(|user| user.get("password").is_none()));
    }

    #[tokio::test]
    async fn test_profile_update() {
        let (server, _state) = setup_test_server().await;
        sign_in(&server, CUSTOMER_EMAIL).await;

        let updated: ApiResponse<Value> = server
            .put("/api/v1/profile")
            .json(&json!({ "city": "Annaba", "password": "newpass1" }))
            .await
            .json();
        assert_eq!(updated.data["city"], "Annaba");

        server.post("/api/v1/logout").await.assert_status_ok();
        server
            .post("/api/v1/login")
            .json(&json!({ "username": CUSTOMER_EMAIL, "password": "newpass1" }))
            .await
            .assert_status_ok();
    }

    #[tokio::test]
    async fn test_shipping_list_cache_is_invalidated_on_update() {
        let (server, state) = setup_test_server().await;
        let oran = insert_wilaya(&state.db, 31, "Oran", 700, true).await;
        insert_wilaya(&state.db, 16, "Algiers", 400, true).await;
        insert_wilaya(&state.db, 1, "Adrar", 1400, false).await;

        let all: ApiResponse<Vec<Value>> = server.get("/api/v1/shipping/wilayas").await.json();
        let codes: Vec<i64> = all.data.iter().map(|w| w["code"].as_i64().unwrap()).collect();
        assert_eq!(codes, vec![1, 16, 31]);

        let active: ApiResponse<Vec<Value>> = server
            .get("/api/v1/shipping/wilayas")
            .add_query_param("active", "true")
            .await
            .json();
        assert_eq!(active.data.len(), 2);
        let cached: ApiResponse<Vec<Value>> = server
            .get("/api/v1/shipping/wilayas")
            .add_query_param("active", "true")
            .await
            .json();
        assert_eq!(cached.message, "Wilayas retrieved from cache");

        sign_in(&server, ADMIN_EMAIL).await;
        server
            .put(&format!("/api/v1/admin/shipping/wilayas/{}", oran.id))
            .json(&json!({ "is_active": false }))
            .await
            .assert_status_ok();

        let refreshed: ApiResponse<Vec<Value>> = server
            .get("/api/v1/shipping/wilayas")
            .add_query_param("active", "true")
            .await
            .json();
        assert_eq!(refreshed.data.len(), 1);
        assert_eq!(refreshed.data[0]["code"], 16);

        let bulk: ApiResponse<Value> = server
            .put("/api/v1/admin/shipping/wilayas")
            .json(&json!({ "default_price": "550" }))
            .await
            .json();
        assert_eq!(bulk.data["updated"], 3);

        let algiers: ApiResponse<Value> = server.get("/api/v1/shipping/wilayas/16").await.json();
        assert_eq!(decimal(&algiers.data["shipping_price"]), Decimal::from(550));
        server
            .get("/api/v1/shipping/wilayas/77")
            .await
            .assert_status(StatusCode::NOT_FOUND);

        let activity: ApiResponse<Vec<Value>> = server.get("/api/v1/admin/activity").await.json();
        assert!(activity.data.iter().any(|entry| {
            entry["action"] == "Updated shipping"
                && entry["details"].as_str().is_some_and(|details| details.starts_with("Oran: "))
        }));
    }

    #[tokio::test]
    async fn test_late_cache_fill_cannot_resurrect_old_prices() {
        let (server, state) = setup_test_server().await;
        let oran = insert_wilaya(&state.db, 31, 700, true).await;

        // A reader that loaded the list before the update finishes after it
        let stale_key = wilaya_cache_key(&state, true);
        let stale = storage::wilayas::list_wilayas(&state.db, true).await.unwrap();

        sign_in(&server, ADMIN_EMAIL).await;
        server
            .put(&format!("/api/v1/admin/shipping/wilayas/{}", oran.id))
            .json(&json!({ "shipping_price": "900" }))
            .await
            .assert_status_ok();
        state.cache.insert(stale_key, CachedData::Wilayas(stale)).await;

        let listed: ApiResponse<Vec<Value>> = server
            .get("/api/v1/shipping/wilayas")
            .add_query_param("active", "true")
            .await
            .json();
        assert_eq!(listed.message, "Wilayas retrieved successfully");
        assert_eq!(decimal(&listed.data[0]["shipping_price"]), Decimal::from(900));
    }

    #[tokio::test]
    async fn test_activity_limit_is_validated() {
        let (server, _state) = setup_test_server().await;
        sign_in(&server, ADMIN_EMAIL).await;

        server
            .get("/api/v1/admin/activity")
            .add_query_param("limit", "0")
            .await
            .assert_status(StatusCode::BAD_REQUEST);
        server
            .get("/api/v1/admin/activity")
            .add_query_param("limit", "1001")
            .await
            .assert_status(StatusCode::BAD_REQUEST);
        server
            .get("/api/v1/admin/activity")
            .add_query_param("limit", "10")
            .await
            .assert_status_ok();
    }

    #[tokio::test]
    async fn test_dashboard_stats() {
        let (server, state) = setup_test_server().await;
        let book = insert_book(&state.db, "Nedjma", 1000, 2).await;
        insert_book(&state.db, "La Grande Maison", 1500, 30).await;

        sign_in(&server, CUSTOMER_EMAIL).await;
        server
            .get("/api/v1/admin/stats")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
        server
            .post("/api/v1/orders")
            .json(&checkout(None, vec![(book.id, 3)]))
            .await
            .assert_status(StatusCode::CREATED);

        sign_in(&server, EMPLOYEE_EMAIL).await;
        let stats: ApiResponse<Value> = server.get("/api/v1/admin/stats").await.json();
        assert_eq!(stats.data["total_books"], 2);
        assert_eq!(stats.data["total_orders"], 1);
        assert_eq!(stats.data["total_customers"], 1);
        assert_eq!(stats.data["low_stock_books"], 1);
        assert_eq!(decimal(&stats.data["revenue"]), Decimal::from(3000));
    }

    #[tokio::test]
    async fn test_deleting_a_book_keeps_order_history() {
        let (server, state) = setup_test_server().await;
        let book = insert_book(&state.db, "Nedjma", 1000, 4).await;

        sign_in(&server, CUSTOMER_EMAIL).await;
        let order: ApiResponse<Value> = server
            .post("/api/v1/orders")
            .json(&checkout(None, vec![(book.id, 2)]))
            .await
            .json();
        let order_id = order.data["id"].as_i64().unwrap();

        sign_in(&server, ADMIN_EMAIL).await;
        server
            .delete(&format!("/api/v1/books/{}", book.id))
            .await
            .assert_status(StatusCode::NO_CONTENT);

        let kept: ApiResponse<Value> = server
            .get(&format!("/api/v1/orders/{}", order_id))
            .await
            .json();
        assert!(kept.data["items"][0]["book_id"].is_null());
        assert!(kept.data["items"][0]["book"].is_null());
        assert_eq!(decimal(&kept.data["items"][0]["unit_price"]), Decimal::from(1000));

        server
            .delete(&format!("/api/v1/orders/{}", order_id))
            .await
            .assert_status(StatusCode::NO_CONTENT);
        server
            .get(&format!("/api/v1/orders/{}", order_id))
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }
}
