//! HTTP-level integration tests for the device endpoints.
//!
//! Uses Axum's tower::ServiceExt to send requests directly to the router
//! without an actual TCP listener.

mod common;

use axum::http::StatusCode;
use common::{
    admin_token, body_json, build_test_app, build_test_app_with_config, create_device, delete,
    get, get_auth, post_json, post_raw_json, put_json, test_config, token, OTHER_ORG, TEST_ORG,
};
use sensordash_db::models::device::CreateDevice;
use sensordash_db::repositories::DeviceRepo;
use serde_json::json;
use sqlx::PgPool;

fn new_device(name: &str) -> CreateDevice {
    CreateDevice {
        name: name.to_string(),
        serial_number: String::new(),
        location_gps: None,
        location_text: None,
        floor: None,
        activation_code: None,
    }
}

// ---------------------------------------------------------------------------
// Authentication
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn missing_token_returns_401(pool: PgPool) {
    let response = get(build_test_app(pool), "/api/devices").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["code"], "UNAUTHORIZED");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn token_with_wrong_signature_returns_401(pool: PgPool) {
    let mut config = test_config();
    config.jwt.secret = "another-secret-entirely-different".to_string();
    let app = build_test_app_with_config(pool, config);

    let response = get_auth(app, "/api/devices", &admin_token()).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_device_returns_201(pool: PgPool) {
    let app = build_test_app(pool);
    let response = post_json(
        app,
        "/api/devices",
        &token(7, TEST_ORG, "editor"),
        json!({
            "name": "Boiler room",
            "serialNumber": "SN-100",
            "locationGps": {"latitude": 59.33, "longitude": 18.06},
            "locationText": "Basement",
            "floor": "-1",
            "activationCode": 4321
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    let device = &json["data"];
    assert!(device["id"].is_number());
    assert_eq!(device["orgId"], TEST_ORG);
    assert_eq!(device["name"], "Boiler room");
    assert_eq!(device["serialNumber"], "SN-100");
    assert_eq!(device["locationGps"]["latitude"], 59.33);
    assert_eq!(device["locationGps"]["longitude"], 18.06);
    assert_eq!(device["createdBy"], 7);
    assert!(device.get("activationCode").is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_accepts_coordinates_as_strings(pool: PgPool) {
    let app = build_test_app(pool);
    let response = post_json(
        app,
        "/api/devices",
        &admin_token(),
        json!({
            "name": "Roof",
            "locationGps": {"latitude": "48.85", "longitude": "2.35"}
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["locationGps"]["latitude"], 48.85);
    assert_eq!(json["data"]["serialNumber"], "");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn viewer_cannot_create(pool: PgPool) {
    let app = build_test_app(pool.clone());
    let response = post_json(
        app,
        "/api/devices",
        &token(3, TEST_ORG, "viewer"),
        json!({"name": "Nope"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM device")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn blank_name_returns_400(pool: PgPool) {
    let app = build_test_app(pool);
    let response = post_json(app, "/api/devices", &admin_token(), json!({"name": "   "})).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn out_of_range_coordinates_return_400(pool: PgPool) {
    let app = build_test_app(pool);
    let response = post_json(
        app,
        "/api/devices",
        &admin_token(),
        json!({"name": "Pole", "locationGps": {"latitude": 91.0, "longitude": 0.0}}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn duplicate_name_returns_409(pool: PgPool) {
    create_device(&pool, json!({"name": "Twin"})).await;

    let app = build_test_app(pool);
    let response = post_json(app, "/api/devices", &admin_token(), json!({"name": "Twin"})).await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = body_json(response).await;
    assert_eq!(json["code"], "CONFLICT");
    assert_eq!(json["error"], "Device name is taken");
}

// ---------------------------------------------------------------------------
// Read
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn get_device_by_id(pool: PgPool) {
    let id = create_device(&pool, json!({"name": "Lobby", "floor": "0"})).await;

    let app = build_test_app(pool);
    let response = get_auth(app, &format!("/api/devices/{id}"), &token(9, TEST_ORG, "viewer")).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["id"], id);
    assert_eq!(json["data"]["name"], "Lobby");
    assert_eq!(json["data"]["floor"], "0");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn device_of_other_org_is_not_found(pool: PgPool) {
    let id = create_device(&pool, json!({"name": "Private"})).await;

    let app = build_test_app(pool);
    let response = get_auth(
        app,
        &format!("/api/devices/{id}"),
        &token(1, OTHER_ORG, "admin"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Device not found");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn non_numeric_id_returns_400(pool: PgPool) {
    let app = build_test_app(pool);
    let response = get_auth(app, "/api/devices/abc", &admin_token()).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["code"], "BAD_REQUEST");
    assert!(json["error"].as_str().unwrap().contains("abc"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn malformed_body_returns_json_error(pool: PgPool) {
    let response = post_raw_json(
        build_test_app(pool.clone()),
        "/api/devices",
        &admin_token(),
        r#"{"name": "Half"#,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "BAD_REQUEST");

    let response = post_raw_json(
        build_test_app(pool),
        "/api/devices",
        &admin_token(),
        r#"{"name": 42}"#,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "BAD_REQUEST");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn list_devices_is_org_scoped_and_sorted(pool: PgPool) {
    create_device(&pool, json!({"name": "Bravo"})).await;
    create_device(&pool, json!({"name": "Alpha"})).await;
    DeviceRepo::create(&pool, OTHER_ORG, None, &new_device("Elsewhere"))
        .await
        .unwrap();

    let app = build_test_app(pool);
    let response = get_auth(app, "/api/devices", &admin_token()).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let names: Vec<&str> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["Alpha", "Bravo"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn lookup_by_serial_number_and_activation_code(pool: PgPool) {
    let id = create_device(
        &pool,
        json!({"name": "Gateway", "serialNumber": "GW-1", "activationCode": 1234}),
    )
    .await;
    let user = token(4, TEST_ORG, "viewer");

    let response = get_auth(build_test_app(pool.clone()), "/api/devices/serial-number/GW-1", &user).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["id"], id);

    let response = get_auth(
        build_test_app(pool.clone()),
        "/api/devices/serial-number/GW-1/code/1234",
        &user,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["id"], id);

    let response = get_auth(
        build_test_app(pool.clone()),
        "/api/devices/serial-number/GW-1/code/9999",
        &user,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = get_auth(build_test_app(pool), "/api/devices/serial-number/GW-2", &user).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Update / delete
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn admin_updates_device(pool: PgPool) {
    let id = create_device(&pool, json!({"name": "Old name"})).await;

    let response = put_json(
        build_test_app(pool.clone()),
        &format!("/api/devices/{id}"),
        &admin_token(),
        json!({"name": "New name", "serialNumber": "SN-9", "locationText": "Attic"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({"message": "Device updated"}));

    let response = get_auth(build_test_app(pool), &format!("/api/devices/{id}"), &admin_token()).await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["name"], "New name");
    assert_eq!(json["data"]["serialNumber"], "SN-9");
    assert_eq!(json["data"]["locationText"], "Attic");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn editor_cannot_update_or_delete(pool: PgPool) {
    let id = create_device(&pool, json!({"name": "Guarded"})).await;
    let editor = token(2, TEST_ORG, "editor");

    let response = put_json(
        build_test_app(pool.clone()),
        &format!("/api/devices/{id}"),
        &editor,
        json!({"name": "Hijacked"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(
        body_json(response).await["error"],
        "User not allowed to update device"
    );

    let response = delete(build_test_app(pool.clone()), &format!("/api/devices/{id}"), &editor).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Access denied");
    assert_eq!(json["code"], "FORBIDDEN");

    let device = DeviceRepo::find_by_id(&pool, TEST_ORG, id).await.unwrap();
    assert_eq!(device.name, "Guarded");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn update_missing_device_returns_404(pool: PgPool) {
    let response = put_json(
        build_test_app(pool),
        "/api/devices/424242",
        &admin_token(),
        json!({"name": "Ghost"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn update_to_taken_name_returns_409(pool: PgPool) {
    create_device(&pool, json!({"name": "First"})).await;
    let id = create_device(&pool, json!({"name": "Second"})).await;

    let response = put_json(
        build_test_app(pool),
        &format!("/api/devices/{id}"),
        &admin_token(),
        json!({"name": "First"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn admin_deletes_device(pool: PgPool) {
    let id = create_device(&pool, json!({"name": "Doomed"})).await;

    let response = delete(build_test_app(pool.clone()), &format!("/api/devices/{id}"), &admin_token()).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({"message": "Device deleted"}));

    let response = get_auth(build_test_app(pool.clone()), &format!("/api/devices/{id}"), &admin_token()).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = delete(build_test_app(pool), &format!("/api/devices/{id}"), &admin_token()).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

async fn seed_numbered(pool: &PgPool, count: usize) {
    for i in 0..count {
        DeviceRepo::create(pool, TEST_ORG, Some(1), &new_device(&format!("Sensor {i:02}")))
            .await
            .unwrap();
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn search_paginates_by_name(pool: PgPool) {
    seed_numbered(&pool, 25).await;

    let response = get_auth(
        build_test_app(pool),
        "/api/devices/search?perpage=10&page=2",
        &admin_token(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let result = &json["data"];
    assert_eq!(result["totalCount"], 25);
    assert_eq!(result["page"], 2);
    assert_eq!(result["perPage"], 10);
    let devices = result["devices"].as_array().unwrap();
    assert_eq!(devices.len(), 10);
    assert_eq!(devices[0]["name"], "Sensor 10");
    assert_eq!(devices[9]["name"], "Sensor 19");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn search_applies_defaults_for_invalid_paging(pool: PgPool) {
    seed_numbered(&pool, 3).await;

    let response = get_auth(
        build_test_app(pool),
        "/api/devices/search?perpage=0&page=-4",
        &admin_token(),
    )
    .await;

    let json = body_json(response).await;
    assert_eq!(json["data"]["perPage"], 1000);
    assert_eq!(json["data"]["page"], 1);
    assert_eq!(json["data"]["devices"].as_array().unwrap().len(), 3);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn search_treats_blank_or_garbage_paging_as_defaults(pool: PgPool) {
    seed_numbered(&pool, 2).await;

    for uri in [
        "/api/devices/search?query=&name=&perpage=&page=",
        "/api/devices/search?perpage=lots&page=first",
    ] {
        let response = get_auth(build_test_app(pool.clone()), uri, &admin_token()).await;

        assert_eq!(response.status(), StatusCode::OK, "{uri}");
        let json = body_json(response).await;
        assert_eq!(json["data"]["perPage"], 1000);
        assert_eq!(json["data"]["page"], 1);
        assert_eq!(json["data"]["totalCount"], 2);
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn search_filters_by_substring_and_exact_name(pool: PgPool) {
    for name in ["Kitchen sensor", "Garage sensor", "Kitchen light"] {
        DeviceRepo::create(&pool, TEST_ORG, None, &new_device(name))
            .await
            .unwrap();
    }

    let response = get_auth(
        build_test_app(pool.clone()),
        "/api/devices/search?query=kitchen",
        &admin_token(),
    )
    .await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["totalCount"], 2);

    let response = get_auth(
        build_test_app(pool),
        "/api/devices/search?name=Garage%20sensor",
        &admin_token(),
    )
    .await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["totalCount"], 1);
    assert_eq!(json["data"]["devices"][0]["name"], "Garage sensor");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn search_restricts_non_admins_to_own_devices_when_configured(pool: PgPool) {
    DeviceRepo::create(&pool, TEST_ORG, Some(5), &new_device("Mine"))
        .await
        .unwrap();
    DeviceRepo::create(&pool, TEST_ORG, Some(6), &new_device("Theirs"))
        .await
        .unwrap();

    let mut config = test_config();
    config.editors_can_admin = true;

    let response = get_auth(
        build_test_app_with_config(pool.clone(), config.clone()),
        "/api/devices/search",
        &token(5, TEST_ORG, "editor"),
    )
    .await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["totalCount"], 1);
    assert_eq!(json["data"]["devices"][0]["name"], "Mine");

    let response = get_auth(
        build_test_app_with_config(pool.clone(), config),
        "/api/devices/search",
        &token(5, TEST_ORG, "admin"),
    )
    .await;
    assert_eq!(body_json(response).await["data"]["totalCount"], 2);

    // Without the setting every member sees the whole organisation.
    let response = get_auth(
        build_test_app(pool),
        "/api/devices/search",
        &token(5, TEST_ORG, "editor"),
    )
    .await;
    assert_eq!(body_json(response).await["data"]["totalCount"], 2);
}

// ---------------------------------------------------------------------------
// Thresholds
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn sensor_threshold_prefers_device_override(pool: PgPool) {
    let id = create_device(&pool, json!({"name": "Freezer"})).await;
    sqlx::query(
        "INSERT INTO threshold (org_id, device_id, measurement, type, data, is_default) VALUES \
         ($1, NULL, 'temperature', 1, '{\"max\": 25}', TRUE), \
         ($1, $2, 'temperature', 2, '{\"max\": -18}', FALSE)",
    )
    .bind(TEST_ORG)
    .bind(id)
    .execute(&pool)
    .await
    .unwrap();

    let response = get_auth(
        build_test_app(pool),
        &format!("/api/devices/{id}/sensors/temperature/threshold"),
        &admin_token(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let threshold = &json["data"];
    assert_eq!(threshold["deviceId"], id);
    assert_eq!(threshold["sensorType"], "temperature");
    assert_eq!(threshold["type"], 2);
    assert_eq!(threshold["data"], json!({"max": -18}));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn missing_threshold_returns_404(pool: PgPool) {
    let id = create_device(&pool, json!({"name": "Plain"})).await;

    let response = get_auth(
        build_test_app(pool),
        &format!("/api/devices/{id}/sensors/humidity/threshold"),
        &admin_token(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"], "Threshold not found");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn threshold_rejects_malformed_sensor_type(pool: PgPool) {
    let response = get_auth(
        build_test_app(pool),
        "/api/devices/1/sensors/temp%22%29/threshold",
        &admin_token(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
