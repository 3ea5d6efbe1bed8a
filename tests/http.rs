use std::net::SocketAddr;
use std::sync::Arc;

use actix_web::{App, http::StatusCode, http::header, test, web::Data};
use chrono::Utc;
use pointage::{
    attendance::stats::LatenessRule,
    auth::password,
    config::Config,
    kv::MemoryStore,
    model::{attendance::ClockInEvent, employee::Employee},
    routes,
    store::RecordStore,
};
use serde_json::{Value, json};

const SECRET: &str = "test-secret";
const ADMIN_PASSWORD: &str = "admin123";

fn peer() -> SocketAddr {
    "127.0.0.1:40000".parse().unwrap()
}

macro_rules! app {
    ($store:expr) => {
        app!($store, Config::in_memory(SECRET, ADMIN_PASSWORD).unwrap())
    };
    ($store:expr, $config:expr) => {{
        let config: Config = $config;
        let routes_config = config.clone();
        test::init_service(
            App::new()
                .app_data($store.clone())
                .app_data(Data::new(config))
                .configure(move |cfg| routes::configure(cfg, routes_config.clone())),
        )
        .await
    }};
}

fn new_store() -> Data<RecordStore> {
    Data::new(RecordStore::new(Arc::new(MemoryStore::new())))
}

macro_rules! admin_token {
    ($app:expr) => {{
        let req = test::TestRequest::post()
            .uri("/auth/login")
            .peer_addr(peer())
            .set_json(json!({"username": "admin", "password": ADMIN_PASSWORD}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&$app, req).await;
        body["access_token"].as_str().unwrap().to_string()
    }};
}

#[actix_web::test]
async fn admin_login_sets_session_flag() {
    let store = new_store();
    let app = app!(store);

    let req = test::TestRequest::post()
        .uri("/auth/login")
        .peer_addr(peer())
        .set_json(json!({"username": "admin", "password": "wrong"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(!store.admin_session_active().unwrap());

    let req = test::TestRequest::post()
        .uri("/auth/login")
        .peer_addr(peer())
        .set_json(json!({"username": "", "password": ""}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let token = admin_token!(app);
    assert!(store.admin_session_active().unwrap());

    // anonymous logout is refused and leaves the session in place
    let req = test::TestRequest::post()
        .uri("/auth/logout")
        .peer_addr(peer())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(store.admin_session_active().unwrap());

    let req = test::TestRequest::post()
        .uri("/auth/logout")
        .peer_addr(peer())
        .insert_header((header::AUTHORIZATION, "Bearer forged"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(store.admin_session_active().unwrap());

    let req = test::TestRequest::post()
        .uri("/auth/logout")
        .peer_addr(peer())
        .insert_header((header::AUTHORIZATION, format!("Bearer {token}")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(!store.admin_session_active().unwrap());
}

#[actix_web::test]
async fn admin_routes_require_token() {
    let store = new_store();
    let app = app!(store);

    let req = test::TestRequest::get()
        .uri("/api/admin/employees")
        .peer_addr(peer())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::get()
        .uri("/api/admin/attendance")
        .peer_addr(peer())
        .insert_header((header::AUTHORIZATION, "Bearer not-a-token"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn clock_in_day_end_to_end() {
    let store = new_store();
    let app = app!(store);
    let token = admin_token!(app);
    let bearer = (header::AUTHORIZATION, format!("Bearer {token}"));

    // roster entry whose reference time has always passed
    let req = test::TestRequest::post()
        .uri("/api/admin/employees")
        .peer_addr(peer())
        .insert_header(bearer.clone())
        .set_json(json!({
            "first_name": "Ana",
            "last_name": "Li",
            "position": "Cashier",
            "password": "1234",
            "reference_time": "00:00"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = test::read_body_json(resp).await;
    let id = created["id"].as_str().unwrap().to_string();
    assert!(created.get("password_hash").is_none());

    // missing position is rejected
    let req = test::TestRequest::post()
        .uri("/api/admin/employees")
        .peer_addr(peer())
        .insert_header(bearer.clone())
        .set_json(json!({
            "first_name": "Bo",
            "last_name": "Chen",
            "position": "",
            "password": "5678",
            "reference_time": null
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // picker shows the profile without credential material
    let req = test::TestRequest::get()
        .uri("/api/employees")
        .peer_addr(peer())
        .to_request();
    let picker: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(picker.as_array().unwrap().len(), 1);
    assert_eq!(picker[0]["initials"], "AL");
    assert!(picker[0].get("password_hash").is_none());

    // wrong password records nothing
    let req = test::TestRequest::post()
        .uri("/api/clock-in")
        .peer_addr(peer())
        .set_json(json!({"employee_id": id, "password": "0000"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(store.load_clock_ins().unwrap().is_empty());

    let req = test::TestRequest::post()
        .uri("/api/clock-in")
        .peer_addr(peer())
        .set_json(json!({"employee_id": "nobody", "password": "1234"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::post()
        .uri("/api/clock-in")
        .peer_addr(peer())
        .set_json(json!({"employee_id": id, "password": "1234"}))
        .to_request();
    let event: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(event["employee_name"], "Ana Li");
    assert_eq!(event["reference_time"], "00:00");
    assert!(event.get("employeeName").is_none());
    let date = event["date"].as_str().unwrap().to_string();

    // dashboard for the clock-in day
    let req = test::TestRequest::get()
        .uri(&format!("/api/admin/attendance?date={date}"))
        .peer_addr(peer())
        .insert_header(bearer.clone())
        .to_request();
    let dashboard: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(
        dashboard["stats"],
        json!({"total": 1, "present": 1, "late": 1, "absent": 0})
    );
    assert_eq!(dashboard["rows"][0]["is_late"], true);
    assert_eq!(dashboard["rows"][0]["employee"]["first_name"], "Ana");
    assert_eq!(dashboard["rows"][0]["event"]["employee_id"], id.as_str());
    assert_eq!(dashboard["rows"][0]["event"]["reference_time"], "00:00");

    // CSV export
    let req = test::TestRequest::get()
        .uri(&format!("/api/admin/attendance/export?date={date}&dialect=legacy"))
        .peer_addr(peer())
        .insert_header(bearer.clone())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let disposition = resp
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.contains(&format!("pointages_{date}.csv")));
    let body = test::read_body(resp).await;
    let csv = String::from_utf8(body.to_vec()).unwrap();
    let mut lines = csv.lines();
    assert_eq!(
        lines.next(),
        Some("Employé,Date,Heure d'arrivée,Horaire de référence,Statut")
    );
    assert!(lines.next().unwrap().ends_with(",00:00,En retard"));

    // nothing recorded on another day
    let req = test::TestRequest::get()
        .uri("/api/admin/attendance/export?date=1999-01-01")
        .peer_addr(peer())
        .insert_header(bearer.clone())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // delete cascades to history
    let req = test::TestRequest::delete()
        .uri(&format!("/api/admin/employees/{id}"))
        .peer_addr(peer())
        .insert_header(bearer.clone())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(store.load_clock_ins().unwrap().is_empty());

    let req = test::TestRequest::delete()
        .uri(&format!("/api/admin/employees/{id}"))
        .peer_addr(peer())
        .insert_header(bearer)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn dashboard_rejects_malformed_date_and_dialect() {
    let store = new_store();
    let app = app!(store);
    let token = admin_token!(app);

    let req = test::TestRequest::get()
        .uri("/api/admin/attendance?date=10-01-2024")
        .peer_addr(peer())
        .insert_header((header::AUTHORIZATION, format!("Bearer {token}")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::get()
        .uri("/api/admin/attendance/export?date=2024-01-10&dialect=excel")
        .peer_addr(peer())
        .insert_header((header::AUTHORIZATION, format!("Bearer {token}")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn corrupt_roster_is_reported_not_hidden() {
    let kv = Arc::new(MemoryStore::new());
    pointage::kv::KeyValueStore::set(kv.as_ref(), "employees", "{oops").unwrap();
    let store = Data::new(RecordStore::new(kv));
    let app = app!(store);

    let req = test::TestRequest::get()
        .uri("/api/employees")
        .peer_addr(peer())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

fn roster_entry(id: &str, reference_time: &str) -> Employee {
    Employee {
        id: id.into(),
        first_name: "Ana".into(),
        last_name: "Li".into(),
        position: "Cashier".into(),
        password_hash: password::hash("1234"),
        reference_time: reference_time.into(),
        photo_url: None,
        created_at: Utc::now(),
    }
}

fn arrival(employee_id: &str, time: &str, reference_time: &str) -> ClockInEvent {
    ClockInEvent {
        employee_id: employee_id.into(),
        employee_name: "Ana Li".into(),
        date: "2024-01-10".into(),
        time: time.into(),
        timestamp: "2024-01-10T08:05:00.000Z".into(),
        reference_time_snapshot: reference_time.into(),
    }
}

#[actix_web::test]
async fn dashboard_clamps_negative_absent_for_display() {
    let store = new_store();
    // history left behind by an employee no longer on the roster
    store.append_clock_in(arrival("gone", "08:00:00", "09:00")).unwrap();
    let app = app!(store);
    let token = admin_token!(app);

    let req = test::TestRequest::get()
        .uri("/api/admin/attendance?date=2024-01-10")
        .peer_addr(peer())
        .insert_header((header::AUTHORIZATION, format!("Bearer {token}")))
        .to_request();
    let dashboard: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(
        dashboard["stats"],
        json!({"total": 0, "present": 1, "late": 0, "absent": -1})
    );
    assert_eq!(dashboard["absent_display"], 0);
    assert_eq!(dashboard["rows"][0]["employee"], Value::Null);
    assert_eq!(dashboard["rows"][0]["event"]["employee_id"], "gone");
}

#[actix_web::test]
async fn admin_reads_and_edits_one_employee() {
    let store = new_store();
    store.add_employee(roster_entry("e1", "09:00")).unwrap();
    let app = app!(store);
    let token = admin_token!(app);
    let bearer = (header::AUTHORIZATION, format!("Bearer {token}"));

    let req = test::TestRequest::get()
        .uri("/api/admin/employees/e1")
        .peer_addr(peer())
        .insert_header(bearer.clone())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let fetched: Value = test::read_body_json(resp).await;
    assert_eq!(fetched["first_name"], "Ana");
    assert!(fetched.get("password_hash").is_none());

    let req = test::TestRequest::put()
        .uri("/api/admin/employees/e1")
        .peer_addr(peer())
        .insert_header(bearer.clone())
        .set_json(json!({
            "first_name": "Anna",
            "last_name": "Li",
            "position": "Manager",
            "reference_time": "08:30"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Value = test::read_body_json(resp).await;
    assert_eq!(updated["first_name"], "Anna");
    assert_eq!(updated["reference_time"], "08:30");
    assert_eq!(store.find_employee("e1").unwrap().position, "Manager");

    // blank name is rejected and nothing changes
    let req = test::TestRequest::put()
        .uri("/api/admin/employees/e1")
        .peer_addr(peer())
        .insert_header(bearer.clone())
        .set_json(json!({
            "first_name": "  ",
            "last_name": "Li",
            "position": "Manager"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(store.find_employee("e1").unwrap().first_name, "Anna");

    let req = test::TestRequest::get()
        .uri("/api/admin/employees/nobody")
        .peer_addr(peer())
        .insert_header(bearer.clone())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::put()
        .uri("/api/admin/employees/nobody")
        .peer_addr(peer())
        .insert_header(bearer)
        .set_json(json!({
            "first_name": "Bo",
            "last_name": "Chen",
            "position": "Cashier"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn clock_lateness_rule_reaches_dashboard_and_export() {
    let store = new_store();
    store.add_employee(roster_entry("e1", "10:00")).unwrap();
    // unpadded hour: after "10:00" as text, before it as a time of day
    store.append_clock_in(arrival("e1", "9:05:00", "10:00")).unwrap();

    let mut config = Config::in_memory(SECRET, ADMIN_PASSWORD).unwrap();
    config.lateness_rule = LatenessRule::Clock;
    let app = app!(store, config);
    let token = admin_token!(app);
    let bearer = (header::AUTHORIZATION, format!("Bearer {token}"));

    let req = test::TestRequest::get()
        .uri("/api/admin/attendance?date=2024-01-10")
        .peer_addr(peer())
        .insert_header(bearer.clone())
        .to_request();
    let dashboard: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(dashboard["stats"]["late"], 0);
    assert_eq!(dashboard["rows"][0]["is_late"], false);

    let req = test::TestRequest::get()
        .uri("/api/admin/attendance/export?date=2024-01-10&dialect=legacy")
        .peer_addr(peer())
        .insert_header(bearer)
        .to_request();
    let body = test::call_and_read_body(&app, req).await;
    let csv = String::from_utf8(body.to_vec()).unwrap();
    assert!(csv.lines().nth(1).unwrap().ends_with(",10:00,À l'heure"));

    // the default rule judges the same data late
    let app = app!(store);
    let token = admin_token!(app);
    let req = test::TestRequest::get()
        .uri("/api/admin/attendance?date=2024-01-10")
        .peer_addr(peer())
        .insert_header((header::AUTHORIZATION, format!("Bearer {token}")))
        .to_request();
    let dashboard: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(dashboard["stats"]["late"], 1);
    assert_eq!(dashboard["rows"][0]["is_late"], true);
}
