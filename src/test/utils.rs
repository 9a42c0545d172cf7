#[cfg(test)]
pub mod test_store {
    use crate::auth::Role;
    use crate::env::AcademyConfig;
    use crate::error::AppError;
    use crate::init_rocket;
    use crate::models::{
        AgeRange, Credentials, NewCategory, NewCoach, NewParent, NewSchedule, NewStudent, NewUser,
        ParentLink,
    };
    use crate::store::{SharedStore, Store};
    use chrono::{NaiveDate, Weekday};
    use rocket::local::asynchronous::Client;
    use rust_decimal::Decimal;
    use std::collections::HashMap;
    use std::sync::Once;

    static INIT: Once = Once::new();
    pub static STANDARD_PASSWORD: &str = "password123";
    pub static ADMIN_EMAIL: &str = "admin@test.local";
    /// bcrypt's minimum cost; keeps hashing out of the test runtime.
    pub const TEST_BCRYPT_COST: u32 = 4;

    pub fn init_test_logging() {
        INIT.call_once(|| {
            let _ = env_logger::builder()
                .parse_filters("debug")
                .is_test(true)
                .try_init();
        });
    }

    pub fn date(s: &str) -> NaiveDate {
        s.parse().expect("test dates are YYYY-MM-DD")
    }

    pub fn enrollment_day() -> NaiveDate {
        date("2024-09-02")
    }

    pub fn test_config() -> AcademyConfig {
        AcademyConfig {
            academy_name: "Test Academy".to_string(),
            bcrypt_cost: TEST_BCRYPT_COST,
            seed_demo_data: false,
            admin_email: ADMIN_EMAIL.to_string(),
            admin_password: Some(STANDARD_PASSWORD.to_string()),
            overdue_sweep_secs: 3600,
        }
    }

    pub struct TestCategory {
        pub id: String,
        pub name: String,
        pub ages: (u32, u32),
        pub max_students: u32,
        pub fee_cents: i64,
    }

    pub struct TestCoach {
        pub key: String,
        pub experience: Option<u32>,
        pub categories: Vec<String>,
    }

    pub struct TestStudent {
        pub key: String,
        pub date_of_birth: String,
        pub category_id: String,
        pub sibling_of: Option<String>,
    }

    pub struct TestSchedule {
        pub key: String,
        pub category_id: String,
        pub coach_key: String,
        pub day: Weekday,
        pub start: String,
        pub end: String,
    }

    #[derive(Default)]
    pub struct TestStoreBuilder {
        categories: Vec<TestCategory>,
        coaches: Vec<TestCoach>,
        students: Vec<TestStudent>,
        schedules: Vec<TestSchedule>,
    }

    impl TestStoreBuilder {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn category(
            mut self,
            id: &str,
            name: &str,
            ages: (u32, u32),
            max_students: u32,
            fee_cents: i64,
        ) -> Self {
            self.categories.push(TestCategory {
                id: id.to_string(),
                name: name.to_string(),
                ages,
                max_students,
                fee_cents,
            });
            self
        }

        pub fn coach(mut self, key: &str, experience: Option<u32>, categories: &[&str]) -> Self {
            self.coaches.push(TestCoach {
                key: key.to_string(),
                experience,
                categories: categories.iter().map(|c| c.to_string()).collect(),
            });
            self
        }

        /// Enrolled with a fresh parent account keyed `<key>_parent`.
        pub fn student(mut self, key: &str, date_of_birth: &str, category_id: &str) -> Self {
            self.students.push(TestStudent {
                key: key.to_string(),
                date_of_birth: date_of_birth.to_string(),
                category_id: category_id.to_string(),
                sibling_of: None,
            });
            self
        }

        /// Shares the parent of an earlier student.
        pub fn sibling(
            mut self,
            key: &str,
            date_of_birth: &str,
            category_id: &str,
            sibling_of: &str,
        ) -> Self {
            self.students.push(TestStudent {
                key: key.to_string(),
                date_of_birth: date_of_birth.to_string(),
                category_id: category_id.to_string(),
                sibling_of: Some(sibling_of.to_string()),
            });
            self
        }

        pub fn schedule(
            mut self,
            key: &str,
            category_id: &str,
            coach_key: &str,
            day: Weekday,
            times: (&str, &str),
        ) -> Self {
            self.schedules.push(TestSchedule {
                key: key.to_string(),
                category_id: category_id.to_string(),
                coach_key: coach_key.to_string(),
                day,
                start: times.0.to_string(),
                end: times.1.to_string(),
            });
            self
        }

        pub fn build(self) -> Result<TestStore, AppError> {
            init_test_logging();

            let mut store = Store::new(TEST_BCRYPT_COST);
            let mut ids: HashMap<String, String> = HashMap::new();
            let mut credentials: HashMap<String, Credentials> = HashMap::new();

            let admin = store.add_user(NewUser {
                email: ADMIN_EMAIL.to_string(),
                role: Role::Admin,
                first_name: "Test".to_string(),
                last_name: "Admin".to_string(),
                phone: None,
                password: Some(STANDARD_PASSWORD.to_string()),
            })?;
            ids.insert("admin".to_string(), admin.user_id.clone());
            credentials.insert("admin".to_string(), admin);

            for category in self.categories {
                store.add_category(NewCategory {
                    id: Some(category.id.clone()),
                    name: category.name,
                    description: String::new(),
                    age_range: AgeRange {
                        min: category.ages.0,
                        max: category.ages.1,
                    },
                    max_students: category.max_students,
                    monthly_fee: Decimal::new(category.fee_cents, 2),
                    coach_id: None,
                })?;
                ids.insert(category.id.clone(), category.id);
            }

            for coach in self.coaches {
                let enrolled = store.add_new_coach(NewCoach {
                    email: format!("{}@coaches.test", coach.key),
                    first_name: coach.key.clone(),
                    last_name: "Coach".to_string(),
                    phone: None,
                    specialization: Vec::new(),
                    experience: coach.experience,
                    certifications: Vec::new(),
                    assigned_categories: coach.categories,
                    bio: None,
                })?;
                ids.insert(coach.key.clone(), enrolled.coach_id);
                credentials.insert(coach.key, enrolled.credentials);
            }

            for student in self.students {
                let parent = match &student.sibling_of {
                    Some(sibling) => ParentLink::Existing {
                        parent_id: ids
                            .get(&format!("{}_parent", sibling))
                            .cloned()
                            .ok_or_else(|| AppError::not_found("Test parent", sibling))?,
                    },
                    None => ParentLink::New(NewParent {
                        email: format!("{}.parent@families.test", student.key),
                        first_name: format!("{}'s", student.key),
                        last_name: "Parent".to_string(),
                        phone: Some("+34 600 000 000".to_string()),
                    }),
                };

                let enrolled = store.add_new_student(NewStudent {
                    email: format!("{}@students.test", student.key),
                    first_name: student.key.clone(),
                    last_name: "Student".to_string(),
                    phone: None,
                    date_of_birth: date(&student.date_of_birth),
                    category_id: student.category_id,
                    parent,
                    enrollment_date: Some(enrollment_day()),
                    medical_notes: None,
                    emergency_contact: None,
                })?;

                let parent_key = match &student.sibling_of {
                    Some(sibling) => format!("{}_parent", sibling),
                    None => format!("{}_parent", student.key),
                };
                ids.insert(parent_key.clone(), enrolled.parent_id.clone());
                if let Some(parent_credentials) = enrolled.parent_credentials {
                    credentials.insert(parent_key, parent_credentials);
                }
                ids.insert(student.key.clone(), enrolled.student_id);
                credentials.insert(student.key, enrolled.student_credentials);
            }

            for schedule in self.schedules {
                let coach_id = ids
                    .get(&schedule.coach_key)
                    .cloned()
                    .ok_or_else(|| AppError::not_found("Test coach", &schedule.coach_key))?;

                let created = store.add_schedule(NewSchedule {
                    category_id: schedule.category_id,
                    coach_id,
                    day_of_week: schedule.day,
                    start_time: schedule.start,
                    end_time: schedule.end,
                    location: "Court 1".to_string(),
                })?;
                ids.insert(schedule.key, created.id);
            }

            Ok(TestStore {
                store,
                ids,
                credentials,
            })
        }
    }

    pub struct TestStore {
        pub store: Store,
        pub ids: HashMap<String, String>,
        pub credentials: HashMap<String, Credentials>,
    }

    impl TestStore {
        pub fn id(&self, key: &str) -> String {
            self.ids
                .get(key)
                .cloned()
                .unwrap_or_else(|| panic!("no test record keyed '{}'", key))
        }

        pub fn password(&self, key: &str) -> String {
            self.credentials
                .get(key)
                .map(|c| c.password.clone())
                .unwrap_or_else(|| panic!("no credentials keyed '{}'", key))
        }
    }

    /// Two categories, three coaches (one with unknown experience), two siblings and
    /// one cadete, plus a Monday and a Tuesday session.
    pub fn create_standard_test_store() -> TestStore {
        TestStoreBuilder::new()
            .category("cat_infantil", "Infantil", (8, 12), 3, 4500)
            .category("cat_cadete", "Cadete", (13, 15), 2, 5000)
            .coach("laura", Some(8), &["cat_infantil"])
            .coach("diego", Some(12), &["cat_cadete"])
            .coach("sofia", None, &[])
            .student("lucia", "2014-03-14", "cat_infantil")
            .sibling("pablo", "2013-07-02", "cat_infantil", "lucia")
            .student("martina", "2011-05-21", "cat_cadete")
            .schedule("infantil_mon", "cat_infantil", "laura", Weekday::Mon, ("17:00", "18:30"))
            .schedule("cadete_tue", "cat_cadete", "diego", Weekday::Tue, ("18:30", "20:00"))
            .build()
            .expect("standard test store builds")
    }

    pub async fn setup_test_client(test_store: TestStore) -> (Client, SharedStore, TestStore) {
        let TestStore {
            store,
            ids,
            credentials,
        } = test_store;
        let shared = store.clone().into_shared();

        let rocket = init_rocket(shared.clone(), test_config()).await;
        let client = Client::tracked(rocket)
            .await
            .expect("valid rocket instance");

        (
            client,
            shared,
            TestStore {
                store,
                ids,
                credentials,
            },
        )
    }
}
