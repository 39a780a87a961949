#[cfg(test)]
mod tests {
    use rocket::http::{ContentType, Cookie, Status};
    use rocket::local::asynchronous::Client;
    use serde_json::{Value, json};

    use crate::api::{CheckInResponse, LoginResponse};
    use crate::models::{Belt, DojoClass};
    use crate::test::test_utils::{
        STANDARD_PASSWORD, create_standard_test_db, login_test_user, setup_test_client,
    };

    async fn login_sensei(client: &Client) -> Vec<Cookie<'static>> {
        login_test_user(client, "sensei@dojo.com", STANDARD_PASSWORD).await
    }

    async fn login_student(client: &Client) -> Vec<Cookie<'static>> {
        login_test_user(client, "daniel@dojo.com", STANDARD_PASSWORD).await
    }

    #[rocket::async_test]
    async fn test_login_api() {
        let test_db = create_standard_test_db().await;
        let (client, _) = setup_test_client(test_db).await;

        let response = client
            .post("/api/login")
            .header(ContentType::JSON)
            .body(json!({"email": "SENSEI@dojo.com", "password": STANDARD_PASSWORD}).to_string())
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);

        let body: LoginResponse = response.into_json().await.unwrap();
        assert!(body.success);
        assert_eq!(body.redirect_url.as_deref(), Some("/sensei"));
        let user = body.user.unwrap();
        assert_eq!(user.email, "sensei@dojo.com");
        assert_eq!(user.role, "sensei");

        let response = client
            .post("/api/login")
            .header(ContentType::JSON)
            .body(json!({"email": "sensei@dojo.com", "password": "wrong_password"}).to_string())
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);

        let body: LoginResponse = response.into_json().await.unwrap();
        assert!(!body.success);
        assert!(body.user.is_none());
        assert!(body.error.is_some());
    }

    #[rocket::async_test]
    async fn test_me_api() {
        let test_db = create_standard_test_db().await;
        let (client, _) = setup_test_client(test_db).await;

        let cookies = login_student(&client).await;
        let response = client.get("/api/me").cookies(cookies).dispatch().await;
        assert_eq!(response.status(), Status::Ok);

        let me: Value = response.into_json().await.unwrap();
        assert_eq!(me["email"], "daniel@dojo.com");
        assert_eq!(me["role"], "student");
        assert_eq!(me["current_belt_id"], "10th-kyu");
    }

    #[rocket::async_test]
    async fn test_register_logs_in_at_lowest_belt() {
        let test_db = create_standard_test_db().await;
        let (client, _) = setup_test_client(test_db).await;

        let response = client
            .post("/api/register")
            .header(ContentType::JSON)
            .body(
                json!({"name": "Ali Mills", "email": "Ali@Dojo.com", "password": "wax-on-wax-off"})
                    .to_string(),
            )
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);

        let cookies: Vec<Cookie<'static>> = response
            .cookies()
            .iter()
            .map(|c| Cookie::new(c.name().to_string(), c.value().to_string()))
            .collect();
        let body: LoginResponse = response.into_json().await.unwrap();
        assert!(body.success);
        let user = body.user.unwrap();
        assert_eq!(user.email, "ali@dojo.com");
        assert_eq!(user.role, "student");
        assert_eq!(user.current_belt_id, "10th-kyu");

        let response = client.get("/api/me").cookies(cookies).dispatch().await;
        assert_eq!(response.status(), Status::Ok);
    }

    #[rocket::async_test]
    async fn test_register_duplicate_email_conflicts() {
        let test_db = create_standard_test_db().await;
        let (client, _) = setup_test_client(test_db).await;

        for (email, expected) in [
            ("new@dojo.com", Status::Ok),
            ("NEW@Dojo.com", Status::Conflict),
        ] {
            let response = client
                .post("/api/register")
                .header(ContentType::JSON)
                .body(json!({"name": "New", "email": email, "password": "password"}).to_string())
                .dispatch()
                .await;
            assert_eq!(response.status(), expected, "registering {}", email);
        }
    }

    #[rocket::async_test]
    async fn test_register_rejects_invalid_payload() {
        let test_db = create_standard_test_db().await;
        let (client, _) = setup_test_client(test_db).await;

        let response = client
            .post("/api/register")
            .header(ContentType::JSON)
            .body(json!({"name": "", "email": "not-an-email", "password": "123"}).to_string())
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::UnprocessableEntity);

        let body: Value = response.into_json().await.unwrap();
        assert_eq!(body["status"], "error");
        assert!(body["errors"]["email"].is_array());
        assert!(body["errors"]["password"].is_array());
        assert!(body["errors"]["name"].is_array());

        let response = client
            .post("/api/register")
            .header(ContentType::JSON)
            .body("{not json")
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::BadRequest);
    }

    #[rocket::async_test]
    async fn test_student_cannot_manage_regardless_of_payload() {
        let test_db = create_standard_test_db().await;
        let johnny = test_db.user_id("johnny@dojo.com").unwrap();
        let (client, _) = setup_test_client(test_db).await;
        let cookies = login_student(&client).await;

        let valid_belt = json!({"name": "Purple", "color": "#6f42c1", "order": 6}).to_string();
        let valid_class =
            json!({"name": "Kids", "day": "Monday", "time": "16:00", "duration": 60}).to_string();

        for body in [valid_belt.as_str(), "{}", "garbage"] {
            let response = client
                .post("/api/belts")
                .header(ContentType::JSON)
                .cookies(cookies.clone())
                .body(body)
                .dispatch()
                .await;
            assert_eq!(response.status(), Status::Forbidden, "create belt with {}", body);
        }

        for body in [valid_class.as_str(), "{}"] {
            let response = client
                .post("/api/classes")
                .header(ContentType::JSON)
                .cookies(cookies.clone())
                .body(body)
                .dispatch()
                .await;
            assert_eq!(response.status(), Status::Forbidden, "create class with {}", body);
        }

        let response = client
            .delete("/api/belts/10th-kyu")
            .cookies(cookies.clone())
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Forbidden);

        let response = client
            .delete("/api/classes/1")
            .cookies(cookies.clone())
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Forbidden);

        let assign = format!("/api/classes/1/students/{}", johnny);
        let response = client.put(assign.as_str()).cookies(cookies.clone()).dispatch().await;
        assert_eq!(response.status(), Status::Forbidden);
        let response = client.delete(assign.as_str()).cookies(cookies.clone()).dispatch().await;
        assert_eq!(response.status(), Status::Forbidden);

        let response = client
            .put(format!("/api/users/{}/belt", johnny))
            .header(ContentType::JSON)
            .cookies(cookies)
            .body(json!({"belt_id": "8th-kyu"}).to_string())
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Forbidden);
    }

    #[rocket::async_test]
    async fn test_belt_order_is_taken_as_given() {
        let test_db = create_standard_test_db().await;
        let (client, _) = setup_test_client(test_db).await;
        let cookies = login_sensei(&client).await;

        let response = client
            .post("/api/belts")
            .header(ContentType::JSON)
            .cookies(cookies.clone())
            .body(json!({"name": "White", "color": "#ffffff", "order": -1}).to_string())
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);
        let white: Belt = response.into_json().await.unwrap();
        assert_eq!(white.order, -1);

        let response = client
            .put("/api/belts/9th-kyu")
            .header(ContentType::JSON)
            .cookies(cookies.clone())
            .body(json!({"order": -5}).to_string())
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);

        let response = client.get("/api/belts").cookies(cookies).dispatch().await;
        let belts: Vec<Belt> = response.into_json().await.unwrap();
        let ids: Vec<&str> = belts.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["9th-kyu", "white", "10th-kyu", "8th-kyu"]);
    }

    #[rocket::async_test]
    async fn test_belt_deletion_scenario() {
        let test_db = create_standard_test_db().await;
        let (client, test_db) = setup_test_client(test_db).await;
        let cookies = login_sensei(&client).await;

        let response = client
            .post("/api/belts")
            .header(ContentType::JSON)
            .cookies(cookies.clone())
            .body(json!({"name": "Shodan", "color": "#000000", "order": 15}).to_string())
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);
        let shodan: Belt = response.into_json().await.unwrap();
        assert_eq!(shodan.id, "shodan");

        let response = client
            .delete("/api/belts/10th-kyu")
            .cookies(cookies.clone())
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Conflict);

        let response = client
            .get("/api/belts")
            .cookies(cookies.clone())
            .dispatch()
            .await;
        let belts: Vec<Belt> = response.into_json().await.unwrap();
        let ids: Vec<&str> = belts.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["10th-kyu", "9th-kyu", "8th-kyu", "shodan"]);

        let holders = [
            test_db.user_id("sensei@dojo.com").unwrap(),
            test_db.user_id("daniel@dojo.com").unwrap(),
            test_db.user_id("johnny@dojo.com").unwrap(),
        ];
        for id in holders {
            let response = client
                .put(format!("/api/users/{}/belt", id))
                .header(ContentType::JSON)
                .cookies(cookies.clone())
                .body(json!({"belt_id": "9th-kyu"}).to_string())
                .dispatch()
                .await;
            assert_eq!(response.status(), Status::Ok);
        }

        let response = client
            .delete("/api/belts/10th-kyu")
            .cookies(cookies.clone())
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);

        let response = client
            .delete("/api/belts/10th-kyu")
            .cookies(cookies)
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::NotFound);
    }

    #[rocket::async_test]
    async fn test_check_in_twice_reports_already_checked_in() {
        let test_db = create_standard_test_db().await;
        let daniel = test_db.user_id("daniel@dojo.com").unwrap();
        let johnny = test_db.user_id("johnny@dojo.com").unwrap();
        let (client, _) = setup_test_client(test_db).await;
        let cookies = login_student(&client).await;

        let path = format!("/api/users/{}/attendance", daniel);
        let response = client
            .post(&path)
            .header(ContentType::JSON)
            .cookies(cookies.clone())
            .body("{}")
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);
        let first: CheckInResponse = response.into_json().await.unwrap();
        assert!(first.success);
        assert!(first.attendance.is_some());

        let response = client
            .post(&path)
            .header(ContentType::JSON)
            .cookies(cookies.clone())
            .body(json!({"notes": "back again"}).to_string())
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);
        let second: CheckInResponse = response.into_json().await.unwrap();
        assert!(!second.success);
        assert_eq!(second.message, "Student already checked in today.");

        let response = client.get(path.as_str()).cookies(cookies.clone()).dispatch().await;
        let stats: Value = response.into_json().await.unwrap();
        assert_eq!(stats["total"], 1);

        let response = client
            .post(format!("/api/users/{}/attendance", johnny))
            .header(ContentType::JSON)
            .cookies(cookies)
            .body("{}")
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Forbidden);
    }

    #[rocket::async_test]
    async fn test_sensei_checks_in_students() {
        let test_db = create_standard_test_db().await;
        let johnny = test_db.user_id("johnny@dojo.com").unwrap();
        let (client, _) = setup_test_client(test_db).await;
        let cookies = login_sensei(&client).await;

        let response = client
            .post(format!("/api/users/{}/attendance", johnny))
            .header(ContentType::JSON)
            .cookies(cookies.clone())
            .body(json!({"notes": "Brought a friend"}).to_string())
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);

        let response = client
            .get("/api/attendance/today")
            .cookies(cookies)
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);
        let entries: Value = response.into_json().await.unwrap();
        assert_eq!(entries[0]["user_name"], "Johnny Lawrence");
        assert_eq!(entries[0]["notes"], "Brought a friend");
    }

    #[rocket::async_test]
    async fn test_class_roster_api() {
        let test_db = create_standard_test_db().await;
        let daniel = test_db.user_id("daniel@dojo.com").unwrap();
        let (client, _) = setup_test_client(test_db).await;
        let cookies = login_sensei(&client).await;

        let response = client
            .post("/api/classes")
            .header(ContentType::JSON)
            .cookies(cookies.clone())
            .body(json!({"name": "Kids", "day": "wednesday", "time": "16:00"}).to_string())
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);
        let class: DojoClass = response.into_json().await.unwrap();
        assert_eq!(class.duration, 60);

        let roster = format!("/api/classes/{}/students/{}", class.id, daniel);
        for _ in 0..2 {
            let response = client.put(roster.as_str()).cookies(cookies.clone()).dispatch().await;
            assert_eq!(response.status(), Status::Ok);
        }

        let student_cookies = login_student(&client).await;
        let response = client
            .get("/api/classes")
            .cookies(student_cookies)
            .dispatch()
            .await;
        let classes: Vec<DojoClass> = response.into_json().await.unwrap();
        assert_eq!(classes.len(), 1);
        assert_eq!(classes[0].students.len(), 1);
        assert_eq!(classes[0].students[0].id, daniel);

        let response = client.delete(roster.as_str()).cookies(cookies.clone()).dispatch().await;
        let class: DojoClass = response.into_json().await.unwrap();
        assert!(class.students.is_empty());

        let response = client
            .post("/api/classes")
            .header(ContentType::JSON)
            .cookies(cookies.clone())
            .body(json!({"name": "Late", "day": "Funday", "time": "25:00"}).to_string())
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::BadRequest);

        let response = client
            .delete(format!("/api/classes/{}", class.id))
            .cookies(cookies)
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);
    }

    #[rocket::async_test]
    async fn test_student_profile_access() {
        let test_db = create_standard_test_db().await;
        let daniel = test_db.user_id("daniel@dojo.com").unwrap();
        let johnny = test_db.user_id("johnny@dojo.com").unwrap();
        let (client, _) = setup_test_client(test_db).await;

        let cookies = login_student(&client).await;
        let response = client
            .get(format!("/api/users/{}", daniel))
            .cookies(cookies.clone())
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);

        let response = client
            .get(format!("/api/users/{}", johnny))
            .cookies(cookies.clone())
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Forbidden);

        let response = client
            .put(format!("/api/users/{}", daniel))
            .header(ContentType::JSON)
            .cookies(cookies)
            .body(json!({"name": "Daniel San"}).to_string())
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Forbidden);

        let sensei = login_sensei(&client).await;
        let response = client
            .get(format!("/api/users/{}", johnny))
            .cookies(sensei)
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);
    }

    #[rocket::async_test]
    async fn test_sensei_manages_students() {
        let test_db = create_standard_test_db().await;
        let (client, _) = setup_test_client(test_db).await;
        let cookies = login_sensei(&client).await;

        let response = client
            .post("/api/students")
            .header(ContentType::JSON)
            .cookies(cookies.clone())
            .body(
                json!({
                    "name": "Robby Keene",
                    "email": "robby@dojo.com",
                    "contract_start_date": "2025-01-15",
                    "contract_renewal": "six_months",
                    "address": "5 Reseda Blvd"
                })
                .to_string(),
            )
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);
        let robby: Value = response.into_json().await.unwrap();
        assert_eq!(robby["current_belt_id"], "10th-kyu");
        assert_eq!(robby["contract_renewal"], "six_months");

        let response = client
            .put(format!("/api/users/{}", robby["id"]))
            .header(ContentType::JSON)
            .cookies(cookies.clone())
            .body(json!({"sensei_notes": "Good balance", "role": "sensei"}).to_string())
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);
        let robby: Value = response.into_json().await.unwrap();
        assert_eq!(robby["sensei_notes"], "Good balance");
        assert_eq!(robby["role"], "student");

        let response = client
            .get("/api/students?search=robby&belt=all")
            .cookies(cookies.clone())
            .dispatch()
            .await;
        let students: Value = response.into_json().await.unwrap();
        assert_eq!(students.as_array().unwrap().len(), 1);

        let response = client
            .post("/api/students")
            .header(ContentType::JSON)
            .cookies(cookies)
            .body(json!({"name": "Bad", "email": "nope"}).to_string())
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::UnprocessableEntity);
    }

    #[rocket::async_test]
    async fn test_events_api() {
        let test_db = create_standard_test_db().await;
        let (client, _) = setup_test_client(test_db).await;
        let cookies = login_sensei(&client).await;

        for (title, date) in [("Holiday Party", "2025-12-20"), ("Grading", "2025-12-15")] {
            let response = client
                .post("/api/events")
                .header(ContentType::JSON)
                .cookies(cookies.clone())
                .body(json!({"title": title, "date": date}).to_string())
                .dispatch()
                .await;
            assert_eq!(response.status(), Status::Ok);
        }

        let response = client
            .get("/api/events")
            .cookies(cookies.clone())
            .dispatch()
            .await;
        let events: Value = response.into_json().await.unwrap();
        assert_eq!(events[0]["title"], "Grading");
        assert_eq!(events[1]["title"], "Holiday Party");

        let id = events[0]["id"].as_i64().unwrap();
        let response = client
            .delete(format!("/api/events/{}", id))
            .cookies(cookies.clone())
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);

        let response = client
            .delete(format!("/api/events/{}", id))
            .cookies(cookies)
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::NotFound);
    }

    #[rocket::async_test]
    async fn test_dashboard_pages() {
        let test_db = create_standard_test_db().await;
        let (client, _) = setup_test_client(test_db).await;

        for page in ["/student", "/sensei"] {
            let response = client.get(page).dispatch().await;
            assert_eq!(response.status(), Status::SeeOther);
            assert_eq!(response.headers().get_one("Location"), Some("/login"));
        }

        let student = login_student(&client).await;
        let response = client.get("/sensei").cookies(student.clone()).dispatch().await;
        assert_eq!(response.status(), Status::SeeOther);

        let response = client.get("/student").cookies(student).dispatch().await;
        assert_eq!(response.status(), Status::Ok);
        let dashboard: Value = response.into_json().await.unwrap();
        assert_eq!(dashboard["current_belt"]["id"], "10th-kyu");
        assert_eq!(dashboard["attendance_total"], 0);
        let progress = dashboard["progress"].as_f64().unwrap();
        assert!((progress - 100.0 / 3.0).abs() < 1e-9);

        let sensei = login_sensei(&client).await;
        let response = client.get("/sensei").cookies(sensei).dispatch().await;
        assert_eq!(response.status(), Status::Ok);
        let dashboard: Value = response.into_json().await.unwrap();
        assert_eq!(dashboard["students"].as_array().unwrap().len(), 2);
        assert_eq!(dashboard["belts"].as_array().unwrap().len(), 3);
    }
}
