#[cfg(test)]
mod tests {
    use crate::export::{
        EmailDraft, csv_quote, expenses_csv, password_reset_notice, students_csv, welcome_email,
    };
    use crate::models::{Credentials, StudentFilter};
    use crate::test::test_utils::{create_standard_test_store, date};
    use rust_decimal::Decimal;

    #[test]
    fn test_csv_quote() {
        assert_eq!(csv_quote("plain"), "plain");
        assert_eq!(csv_quote("Garcia, Lucia"), "\"Garcia, Lucia\"");
        assert_eq!(csv_quote("the \"libero\""), "\"the \"\"libero\"\"\"");
        assert_eq!(csv_quote("line\nbreak"), "\"line\nbreak\"");
    }

    #[test]
    fn test_students_csv_rows() {
        let test_store = create_standard_test_store();
        let rows = test_store.store.list_student_details(&StudentFilter::default());

        let csv = students_csv(&rows);
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("id,full_name,email,category,coach"));
        assert!(lines[1].starts_with(&format!(
            "{},lucia Student,lucia@students.test,Infantil,laura Coach,",
            test_store.id("lucia")
        )));
        assert!(lines[1].ends_with(",2014-03-14,2024-09-02,true"));
    }

    #[test]
    fn test_empty_sheet_keeps_header() {
        assert_eq!(
            expenses_csv(&[]),
            "id,date,description,category,amount,payment_method,recurring,frequency\n"
        );
    }

    #[test]
    fn test_compose_links_encode_fields() {
        let draft = EmailDraft {
            to: "carmen@families.test".to_string(),
            subject: "Training & schedule".to_string(),
            body: "Hi Carmen,\nsee you Monday".to_string(),
        };

        assert_eq!(
            draft.mailto_url(),
            "mailto:carmen%40families.test?subject=Training%20%26%20schedule&body=Hi%20Carmen%2C%0Asee%20you%20Monday"
        );
        assert!(
            draft
                .gmail_url()
                .starts_with("https://mail.google.com/mail/?view=cm&fs=1&to=carmen%40families.test&su=")
        );
        assert!(
            draft
                .outlook_url()
                .starts_with("https://outlook.office.com/mail/deeplink/compose?to=carmen%40families.test")
        );
        assert_eq!(draft.links().mailto, draft.mailto_url());
    }

    #[test]
    fn test_mailto_recipient_cannot_inject_fields() {
        let draft = EmailDraft {
            to: "carmen@families.test?cc=intruder@example.com&x=".to_string(),
            subject: "Fees".to_string(),
            body: "See attached".to_string(),
        };

        assert_eq!(
            draft.mailto_url(),
            "mailto:carmen%40families.test%3Fcc%3Dintruder%40example.com%26x%3D?subject=Fees&body=See%20attached"
        );
    }

    #[test]
    fn test_welcome_email_names_login_only() {
        let test_store = create_standard_test_store();
        let lucia = test_store.store.get_user(&test_store.id("lucia")).unwrap();
        let category = test_store.store.get_category("cat_infantil").unwrap();

        let draft = welcome_email(&lucia, "Test Academy", Some(&category));

        assert_eq!(draft.to, "lucia@students.test");
        assert_eq!(draft.subject, "Welcome to Test Academy");
        assert!(draft.body.contains("Login: lucia@students.test"));
        assert!(draft.body.contains("Category: Infantil (ages 8-12)"));
        assert!(!draft.body.contains(&test_store.password("lucia")));
    }

    #[test]
    fn test_reset_notice_omits_password() {
        let credentials = Credentials {
            user_id: "parent1".to_string(),
            email: "carmen@families.test".to_string(),
            password: "ParentAbc23xyz".to_string(),
        };

        let notice = password_reset_notice(&credentials, "Test Academy");

        assert_eq!(notice.to, "carmen@families.test");
        assert!(!notice.body.contains("ParentAbc23xyz"));
        assert!(!notice.links().gmail.contains("ParentAbc23xyz"));
    }

    #[test]
    fn test_expenses_csv_formats_amounts() {
        let mut test_store = create_standard_test_store();
        test_store
            .store
            .add_expense(crate::models::NewExpense {
                description: "Nets, antennas".to_string(),
                amount: Decimal::new(12050, 2),
                category: crate::models::ExpenseCategory::Equipment,
                payment_method: crate::models::PaymentMethod::Card,
                date: date("2024-09-12"),
                recurring: false,
                frequency: None,
            })
            .unwrap();

        let csv = expenses_csv(test_store.store.expenses());
        assert_eq!(
            csv.lines().nth(1),
            Some("exp1,2024-09-12,\"Nets, antennas\",equipment,120.50,card,false,")
        );
    }
}
