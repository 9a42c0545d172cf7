//! Text exports: CSV sheets and e-mail compose links.

use serde::{Deserialize, Serialize};
use urlencoding::encode;

use crate::models::{Category, Credentials, Expense, Payment, StudentDetails, User};

pub const STUDENT_HEADERS: [&str; 11] = [
    "id",
    "full_name",
    "email",
    "category",
    "coach",
    "parent",
    "parent_email",
    "parent_phone",
    "date_of_birth",
    "enrollment_date",
    "active",
];

pub const PAYMENT_HEADERS: [&str; 8] = [
    "id",
    "student_id",
    "concept",
    "amount",
    "due_date",
    "paid_on",
    "status",
    "method",
];

pub const EXPENSE_HEADERS: [&str; 8] = [
    "id",
    "date",
    "description",
    "category",
    "amount",
    "payment_method",
    "recurring",
    "frequency",
];

/// Quotes a field only when it holds a delimiter, a quote or a line break.
pub fn csv_quote(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') || s.contains('\r') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

fn csv_line<S: AsRef<str>>(fields: &[S]) -> String {
    let mut line = fields
        .iter()
        .map(|f| csv_quote(f.as_ref()))
        .collect::<Vec<_>>()
        .join(",");
    line.push('\n');
    line
}

fn csv_sheet<const N: usize>(
    headers: [&str; N],
    rows: impl Iterator<Item = [String; N]>,
) -> String {
    let mut csv = csv_line(headers.as_slice());
    for row in rows {
        csv.push_str(&csv_line(row.as_slice()));
    }
    csv
}

/// One header row plus one row per student.
pub fn students_csv(students: &[StudentDetails]) -> String {
    csv_sheet(
        STUDENT_HEADERS,
        students.iter().map(|s| {
            [
                s.id.clone(),
                s.full_name.clone(),
                s.email.clone(),
                s.category_name.clone(),
                s.coach_name.clone(),
                s.parent_name.clone(),
                s.parent_email.clone(),
                s.parent_phone.clone(),
                s.date_of_birth.to_string(),
                s.enrollment_date.to_string(),
                s.active.to_string(),
            ]
        }),
    )
}

pub fn payments_csv(payments: &[Payment]) -> String {
    csv_sheet(
        PAYMENT_HEADERS,
        payments.iter().map(|p| {
            [
                p.id.clone(),
                p.student_id.clone(),
                p.concept.clone(),
                p.amount.to_string(),
                p.due_date.to_string(),
                p.paid_on.map(|d| d.to_string()).unwrap_or_default(),
                p.status.as_str().to_string(),
                p.method.as_str().to_string(),
            ]
        }),
    )
}

pub fn expenses_csv(expenses: &[Expense]) -> String {
    csv_sheet(
        EXPENSE_HEADERS,
        expenses.iter().map(|e| {
            [
                e.id.clone(),
                e.date.to_string(),
                e.description.clone(),
                e.category.as_str().to_string(),
                e.amount.to_string(),
                e.payment_method.as_str().to_string(),
                e.recurring.to_string(),
                e.frequency
                    .map(|f| f.as_str().to_string())
                    .unwrap_or_default(),
            ]
        }),
    )
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmailDraft {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmailLinks {
    pub mailto: String,
    pub gmail: String,
    pub outlook: String,
}

impl EmailDraft {
    pub fn mailto_url(&self) -> String {
        format!(
            "mailto:{}?subject={}&body={}",
            encode(&self.to),
            encode(&self.subject),
            encode(&self.body)
        )
    }

    pub fn gmail_url(&self) -> String {
        format!(
            "https://mail.google.com/mail/?view=cm&fs=1&to={}&su={}&body={}",
            encode(&self.to),
            encode(&self.subject),
            encode(&self.body)
        )
    }

    pub fn outlook_url(&self) -> String {
        format!(
            "https://outlook.office.com/mail/deeplink/compose?to={}&subject={}&body={}",
            encode(&self.to),
            encode(&self.subject),
            encode(&self.body)
        )
    }

    pub fn links(&self) -> EmailLinks {
        EmailLinks {
            mailto: self.mailto_url(),
            gmail: self.gmail_url(),
            outlook: self.outlook_url(),
        }
    }
}

/// Welcome mail for a new account. It names the login but never carries the
/// password; that is handed over separately, once.
pub fn welcome_email(user: &User, academy_name: &str, category: Option<&Category>) -> EmailDraft {
    let mut body = format!(
        "Hello {},\n\nWelcome to {}. Your account is ready.\n\nLogin: {}\n",
        user.first_name, academy_name, user.email
    );

    if let Some(category) = category {
        body.push_str(&format!(
            "Category: {} (ages {}-{})\n",
            category.name, category.age_range.min, category.age_range.max
        ));
    }

    body.push_str(
        "\nYour initial password will be given to you in person. \
         Please change it after your first login.\n\nSee you on court!\n",
    );

    EmailDraft {
        to: user.email.clone(),
        subject: format!("Welcome to {}", academy_name),
        body,
    }
}

/// Tells the account holder their password was reset, without including it.
pub fn password_reset_notice(credentials: &Credentials, academy_name: &str) -> EmailDraft {
    EmailDraft {
        to: credentials.email.clone(),
        subject: format!("{}: password reset", academy_name),
        body: format!(
            "Hello,\n\nThe password for {} was reset by an administrator. \
             Ask the academy office for your new password.\n",
            credentials.email
        ),
    }
}
