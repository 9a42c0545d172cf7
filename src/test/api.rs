#[cfg(test)]
mod tests {
    use crate::api::{AttendanceRateResponse, CoachStatsResponse, PasswordResetResponse, SweepResponse};
    use crate::models::{EnrolledStudent, PaymentStatus};
    use crate::stats::{DashboardSummary, PaymentSummary};
    use crate::test::test_utils::{create_standard_test_store, setup_test_client};
    use crate::validation::ValidationResponse;
    use rocket::http::{ContentType, Status};
    use serde_json::{Value, json};

    fn enrollment_body(key: &str, category_id: &str) -> String {
        json!({
            "email": format!("{}@students.test", key),
            "first_name": key,
            "last_name": "Student",
            "date_of_birth": "2012-01-10",
            "category_id": category_id,
            "enrollment_date": "2024-09-02",
            "parent": {
                "new": {
                    "email": format!("{}.parent@families.test", key),
                    "first_name": "Parent",
                    "last_name": key
                }
            }
        })
        .to_string()
    }

    #[rocket::async_test]
    async fn test_health_check() {
        let (client, _, _) = setup_test_client(create_standard_test_store()).await;

        let response = client.get("/api/health").dispatch().await;

        assert_eq!(response.status(), Status::Ok);
        assert_eq!(response.into_string().await.unwrap(), "OK");
    }

    #[rocket::async_test]
    async fn test_enroll_student_api() {
        let (client, store, _) = setup_test_client(create_standard_test_store()).await;

        let response = client
            .post("/api/students")
            .header(ContentType::JSON)
            .body(enrollment_body("valeria", "cat_infantil"))
            .dispatch()
            .await;

        assert_eq!(response.status(), Status::Ok);

        let body = response.into_string().await.unwrap();
        let enrolled: EnrolledStudent = serde_json::from_str(&body).unwrap();

        assert_eq!(enrolled.age_at_enrollment, 12);
        assert!(enrolled.parent_credentials.is_some());
        assert!(enrolled.student_credentials.password.starts_with("Student"));

        let store = store.read().await;
        assert_eq!(store.students().len(), 4);
        assert!(
            store
                .verify_credentials(
                    &enrolled.student_credentials.email,
                    &enrolled.student_credentials.password
                )
                .is_some()
        );
    }

    #[rocket::async_test]
    async fn test_invalid_body_returns_field_errors() {
        let (client, store, _) = setup_test_client(create_standard_test_store()).await;

        let mut body: Value = serde_json::from_str(&enrollment_body("valeria", "cat_infantil")).unwrap();
        body["email"] = json!("not-an-email");

        let response = client
            .post("/api/students")
            .header(ContentType::JSON)
            .body(body.to_string())
            .dispatch()
            .await;

        assert_eq!(response.status(), Status::BadRequest);

        let body = response.into_string().await.unwrap();
        let errors: ValidationResponse = serde_json::from_str(&body).unwrap();
        assert_eq!(errors.status, "error");
        assert_eq!(
            errors.errors.get("email"),
            Some(&vec!["Invalid email address".to_string()])
        );

        assert_eq!(store.read().await.students().len(), 3);
    }

    #[rocket::async_test]
    async fn test_nested_body_errors_are_keyed_by_path() {
        let (client, store, test_store) = setup_test_client(create_standard_test_store()).await;

        let section = |minutes: u32| json!({"description": "Drills", "duration_minutes": minutes});
        let class_plan = json!({
            "category": "Infantil",
            "coach_id": test_store.id("laura"),
            "date": "2024-10-07",
            "title": "Serve receive",
            "warm_up": section(0),
            "main": section(60),
            "cool_down": section(10)
        });

        let response = client
            .post("/api/class-plans")
            .header(ContentType::JSON)
            .body(class_plan.to_string())
            .dispatch()
            .await;

        assert_eq!(response.status(), Status::BadRequest);
        let errors: ValidationResponse =
            serde_json::from_str(&response.into_string().await.unwrap()).unwrap();
        assert_eq!(
            errors.errors.get("warm_up.duration_minutes"),
            Some(&vec!["Duration must be between 1 and 180 minutes".to_string()])
        );
        assert_eq!(errors.errors.len(), 1);

        let training_plan = json!({
            "category_id": "cat_infantil",
            "coach_id": test_store.id("laura"),
            "title": "Autumn block",
            "start_date": "2024-09-02",
            "end_date": "2024-12-20",
            "exercises": [
                {"name": "Pepper", "duration_minutes": 15},
                {"name": "", "duration_minutes": 20}
            ]
        });

        let response = client
            .post("/api/training-plans")
            .header(ContentType::JSON)
            .body(training_plan.to_string())
            .dispatch()
            .await;

        assert_eq!(response.status(), Status::BadRequest);
        let errors: ValidationResponse =
            serde_json::from_str(&response.into_string().await.unwrap()).unwrap();
        assert_eq!(
            errors.errors.get("exercises[1].name"),
            Some(&vec!["Exercise name is required".to_string()])
        );

        let store = store.read().await;
        assert!(store.list_class_plans(None, None).is_empty());
        assert!(store.list_training_plans(None, None).is_empty());
    }

    #[rocket::async_test]
    async fn test_store_errors_map_to_status_codes() {
        let (client, _, _) = setup_test_client(create_standard_test_store()).await;

        let response = client
            .post("/api/students")
            .header(ContentType::JSON)
            .body(enrollment_body("hugo", "cat_cadete"))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);

        let response = client
            .post("/api/students")
            .header(ContentType::JSON)
            .body(enrollment_body("irene", "cat_cadete"))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::BadRequest);
        let errors: ValidationResponse =
            serde_json::from_str(&response.into_string().await.unwrap()).unwrap();
        assert!(errors.errors["validation"][0].contains("is full"));

        let response = client
            .post("/api/students")
            .header(ContentType::JSON)
            .body(enrollment_body("lucia", "cat_infantil"))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Conflict);

        let response = client
            .post("/api/students")
            .header(ContentType::JSON)
            .body(enrollment_body("nadia", "cat_missing"))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::UnprocessableEntity);
        let errors: ValidationResponse =
            serde_json::from_str(&response.into_string().await.unwrap()).unwrap();
        assert!(errors.errors.contains_key("reference"));
    }

    #[rocket::async_test]
    async fn test_unknown_student_is_not_found() {
        let (client, _, _) = setup_test_client(create_standard_test_store()).await;

        let response = client.get("/api/students/student99").dispatch().await;

        assert_eq!(response.status(), Status::NotFound);
        let errors: ValidationResponse =
            serde_json::from_str(&response.into_string().await.unwrap()).unwrap();
        assert!(errors.errors.contains_key("resource"));
    }

    #[rocket::async_test]
    async fn test_unknown_route_uses_json_catcher() {
        let (client, _, _) = setup_test_client(create_standard_test_store()).await;

        let response = client.get("/api/nothing-here").dispatch().await;

        assert_eq!(response.status(), Status::NotFound);
        let errors: ValidationResponse =
            serde_json::from_str(&response.into_string().await.unwrap()).unwrap();
        assert_eq!(errors.status, "error");
    }

    #[rocket::async_test]
    async fn test_list_students_filters() {
        let (client, _, test_store) = setup_test_client(create_standard_test_store()).await;

        let response = client
            .get("/api/students?category_id=cat_infantil")
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);
        let students: Vec<Value> =
            serde_json::from_str(&response.into_string().await.unwrap()).unwrap();
        assert_eq!(students.len(), 2);

        let uri = format!("/api/parents/{}/students", test_store.id("lucia_parent"));
        let response = client.get(uri).dispatch().await;
        let children: Vec<Value> =
            serde_json::from_str(&response.into_string().await.unwrap()).unwrap();
        assert_eq!(children.len(), 2);
    }

    #[rocket::async_test]
    async fn test_attendance_api() {
        let (client, _, test_store) = setup_test_client(create_standard_test_store()).await;
        let lucia = test_store.id("lucia");

        let record = |date: &str, present: bool| {
            json!({
                "student_id": lucia,
                "schedule_id": test_store.id("infantil_mon"),
                "date": date,
                "present": present,
                "checked_by": test_store.id("laura")
            })
            .to_string()
        };

        for (date, present) in [("2024-10-07", true), ("2024-10-14", false)] {
            let response = client
                .post("/api/attendance")
                .header(ContentType::JSON)
                .body(record(date, present))
                .dispatch()
                .await;
            assert_eq!(response.status(), Status::Ok);
        }

        let response = client
            .post("/api/attendance")
            .header(ContentType::JSON)
            .body(record("2024-10-08", true))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::BadRequest);

        let response = client
            .get(format!("/api/students/{}/attendance-rate", lucia))
            .dispatch()
            .await;
        let rate: AttendanceRateResponse =
            serde_json::from_str(&response.into_string().await.unwrap()).unwrap();
        assert_eq!(rate.rate, 50.0);

        let uri = format!(
            "/api/schedules/{}/attendance?date=2024-10-07",
            test_store.id("infantil_mon")
        );
        let response = client.get(uri).dispatch().await;
        let records: Vec<Value> =
            serde_json::from_str(&response.into_string().await.unwrap()).unwrap();
        assert_eq!(records.len(), 1);

        let uri = format!(
            "/api/schedules/{}/attendance?date=07-10-2024",
            test_store.id("infantil_mon")
        );
        let response = client.get(uri).dispatch().await;
        assert_eq!(response.status(), Status::BadRequest);
    }

    #[rocket::async_test]
    async fn test_reset_password_api() {
        let (client, store, test_store) = setup_test_client(create_standard_test_store()).await;
        let parent_id = test_store.id("lucia_parent");

        let response = client
            .post(format!("/api/users/{}/reset-password", parent_id))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);

        let reset: PasswordResetResponse =
            serde_json::from_str(&response.into_string().await.unwrap()).unwrap();
        assert!(reset.credentials.password.starts_with("Parent"));
        assert!(!reset.notice.body.contains(&reset.credentials.password));
        assert!(!reset.links.mailto.contains(&reset.credentials.password));

        let store = store.read().await;
        assert!(
            store
                .verify_credentials(&reset.credentials.email, &test_store.password("lucia_parent"))
                .is_none()
        );
        assert!(
            store
                .verify_credentials(&reset.credentials.email, &reset.credentials.password)
                .is_some()
        );
    }

    #[rocket::async_test]
    async fn test_payments_api() {
        let (client, _, test_store) = setup_test_client(create_standard_test_store()).await;
        let lucia = test_store.id("lucia");

        let response = client
            .post("/api/payments")
            .header(ContentType::JSON)
            .body(
                json!({
                    "student_id": lucia,
                    "amount": "45.00",
                    "concept": "October fee",
                    "due_date": "2020-10-05",
                    "method": "transfer"
                })
                .to_string(),
            )
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);

        let response = client.post("/api/payments/mark-overdue").dispatch().await;
        let sweep: SweepResponse =
            serde_json::from_str(&response.into_string().await.unwrap()).unwrap();
        assert_eq!(sweep.moved, 1);

        let response = client.get("/api/payments?status=overdue").dispatch().await;
        let overdue: Vec<Value> =
            serde_json::from_str(&response.into_string().await.unwrap()).unwrap();
        assert_eq!(overdue.len(), 1);

        let response = client.get("/api/payments?status=lost").dispatch().await;
        assert_eq!(response.status(), Status::BadRequest);

        let response = client
            .put("/api/payments/pay1/status")
            .header(ContentType::JSON)
            .body(json!({ "status": "paid", "paid_on": "2020-10-20" }).to_string())
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);
        let paid: Value = serde_json::from_str(&response.into_string().await.unwrap()).unwrap();
        assert_eq!(paid["status"], json!(PaymentStatus::Paid.as_str()));
        assert_eq!(paid["paid_on"], json!("2020-10-20"));

        let response = client
            .get(format!("/api/payments/summary?student_id={}", lucia))
            .dispatch()
            .await;
        let summary: PaymentSummary =
            serde_json::from_str(&response.into_string().await.unwrap()).unwrap();
        assert_eq!(summary.collected_count, 1);
        assert_eq!(summary.overdue_count, 0);
    }

    #[rocket::async_test]
    async fn test_expense_summary_rejects_bad_month() {
        let (client, _, _) = setup_test_client(create_standard_test_store()).await;

        let response = client
            .get("/api/expenses/summary?year=2024&month=13")
            .dispatch()
            .await;

        assert_eq!(response.status(), Status::BadRequest);
    }

    #[rocket::async_test]
    async fn test_categories_report_occupancy() {
        let (client, _, _) = setup_test_client(create_standard_test_store()).await;

        let response = client.get("/api/categories/cat_infantil").dispatch().await;
        assert_eq!(response.status(), Status::Ok);

        let category: Value = serde_json::from_str(&response.into_string().await.unwrap()).unwrap();
        assert_eq!(category["name"], json!("Infantil"));
        assert_eq!(category["current_students"], json!(2));

        let occupancy = category["occupancy"].as_f64().unwrap();
        assert!((occupancy - 200.0 / 3.0).abs() < 1e-9);
    }

    #[rocket::async_test]
    async fn test_students_csv_export() {
        let (client, _, _) = setup_test_client(create_standard_test_store()).await;

        let response = client.get("/api/export/students.csv").dispatch().await;

        assert_eq!(response.status(), Status::Ok);
        assert_eq!(response.content_type(), Some(ContentType::CSV));

        let body = response.into_string().await.unwrap();
        let mut lines = body.lines();
        assert_eq!(
            lines.next(),
            Some(
                "id,full_name,email,category,coach,parent,parent_email,parent_phone,date_of_birth,enrollment_date,active"
            )
        );
        assert_eq!(lines.count(), 3);
    }

    #[rocket::async_test]
    async fn test_dashboard_and_coach_stats() {
        let (client, _, _) = setup_test_client(create_standard_test_store()).await;

        let response = client.get("/api/dashboard").dispatch().await;
        let summary: DashboardSummary =
            serde_json::from_str(&response.into_string().await.unwrap()).unwrap();
        assert_eq!(summary.active_students, 3);
        assert_eq!(summary.categories, 2);

        let response = client.get("/api/stats/coaches").dispatch().await;
        let stats: CoachStatsResponse =
            serde_json::from_str(&response.into_string().await.unwrap()).unwrap();
        assert_eq!(stats.active_coaches, 3);
        assert_eq!(stats.average_experience, Some(10.0));
    }
}
