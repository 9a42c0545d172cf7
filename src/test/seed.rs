#[cfg(test)]
mod tests {
    use crate::auth::Role;
    use crate::env::AcademyConfig;
    use crate::models::{PaymentStatus, StudentFilter};
    use crate::seed::demo_store;
    use crate::test::test_utils::{ADMIN_EMAIL, STANDARD_PASSWORD, date, init_test_logging, test_config};

    #[test]
    fn test_demo_store_builds() {
        init_test_logging();
        let (store, _) = demo_store(&test_config()).unwrap();

        assert_eq!(store.categories().len(), 4);
        assert_eq!(store.coaches().len(), 3);
        assert_eq!(store.students().len(), 5);
        assert_eq!(store.schedules().len(), 5);
        assert_eq!(store.attendances().len(), 8);
        assert_eq!(store.evaluations().len(), 2);
        assert_eq!(store.list_users(Some(Role::Parent), false).len(), 4);

        assert!(store.verify_credentials(ADMIN_EMAIL, STANDARD_PASSWORD).is_some());
    }

    #[test]
    fn test_demo_admin_without_configured_password_can_log_in() {
        let config = AcademyConfig {
            admin_password: None,
            ..test_config()
        };
        let (store, admin) = demo_store(&config).unwrap();

        assert_eq!(admin.email, ADMIN_EMAIL);
        assert!(admin.password.starts_with(Role::Admin.password_prefix()));
        let user = store.verify_credentials(&admin.email, &admin.password);
        assert_eq!(user.map(|u| u.id), Some(admin.user_id));
        assert!(store.verify_credentials(ADMIN_EMAIL, STANDARD_PASSWORD).is_none());
    }

    #[test]
    fn test_demo_students_have_one_parent_account() {
        let (store, _) = demo_store(&test_config()).unwrap();

        for student in store.students() {
            let parents: Vec<_> = store
                .users()
                .iter()
                .filter(|u| u.id == student.parent_id)
                .collect();
            assert_eq!(parents.len(), 1, "{}", student.id);
            assert_eq!(parents[0].role, Role::Parent, "{}", student.id);
        }
    }

    #[test]
    fn test_demo_counters_match_students() {
        let (store, _) = demo_store(&test_config()).unwrap();

        for category in store.categories() {
            let enrolled = store
                .list_students(&StudentFilter {
                    category_id: Some(category.id.clone()),
                    ..Default::default()
                })
                .len();
            assert_eq!(category.current_students as usize, enrolled, "{}", category.id);
            assert!(category.coach_id.is_some(), "{} has no coach", category.id);
        }
    }

    #[test]
    fn test_demo_overdue_sweep() {
        let (mut store, _) = demo_store(&test_config()).unwrap();

        assert_eq!(store.mark_overdue_payments(date("2024-10-20")), 1);
        assert_eq!(
            store
                .list_payments(None, Some(PaymentStatus::Overdue))
                .len(),
            2
        );
        assert_eq!(store.mark_overdue_payments(date("2024-11-20")), 1);
    }

    #[test]
    fn test_demo_sibling_shares_parent() {
        let (store, _) = demo_store(&test_config()).unwrap();
        let carmen = store
            .find_user_by_email("carmen.garcia@example.com")
            .map(|u| u.id);

        let children = carmen.map(|id| store.students_of_parent(&id).unwrap().len());
        assert_eq!(children, Some(2));
    }
}
