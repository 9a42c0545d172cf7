use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::{info, instrument};

use super::{Store, remove_by_id, validate_input};
use crate::error::AppError;
use crate::ids;
use crate::models::{Expense, NewExpense, NewPayment, Payment, PaymentStatus};

impl Store {
    #[instrument(skip_all, fields(student_id = %input.student_id))]
    pub fn add_payment(&mut self, input: NewPayment) -> Result<Payment, AppError> {
        info!("Recording payment");
        validate_input(&input)?;

        if input.amount <= Decimal::ZERO {
            return Err(AppError::Validation(
                "Payment amount must be positive".to_string(),
            ));
        }

        self.require_student_ref(&input.student_id)?;

        let status = input.status.unwrap_or(PaymentStatus::Pending);
        let paid_on = match (status.is_settled(), input.paid_on) {
            (true, Some(date)) => Some(date),
            (true, None) => Some(input.due_date),
            (false, Some(_)) => {
                return Err(AppError::Validation(format!(
                    "A {} payment cannot have a payment date",
                    status.as_str()
                )));
            }
            (false, None) => None,
        };

        let payment = Payment {
            id: self.ids.next(ids::PAYMENT),
            student_id: input.student_id,
            amount: input.amount,
            concept: input.concept,
            due_date: input.due_date,
            paid_on,
            status,
            method: input.method,
        };
        self.payments.push(payment.clone());

        Ok(payment)
    }

    #[instrument(skip(self))]
    pub fn list_payments(
        &self,
        student_id: Option<&str>,
        status: Option<PaymentStatus>,
    ) -> Vec<Payment> {
        info!("Listing payments");
        let mut payments: Vec<Payment> = self
            .payments
            .iter()
            .filter(|p| student_id.is_none_or(|s| p.student_id == s))
            .filter(|p| status.is_none_or(|s| p.status == s))
            .cloned()
            .collect();

        payments.sort_by_key(|p| p.due_date);
        payments
    }

    /// Settling a payment stamps `paid_on` (today unless given); reopening it clears the stamp.
    #[instrument(skip(self))]
    pub fn update_payment_status(
        &mut self,
        id: &str,
        status: PaymentStatus,
        paid_on: Option<NaiveDate>,
    ) -> Result<Payment, AppError> {
        info!("Updating payment status");
        let payment = self
            .payments
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| AppError::not_found("Payment", id))?;

        payment.status = status;
        payment.paid_on = if status.is_settled() {
            Some(paid_on.unwrap_or_else(super::today))
        } else {
            None
        };

        Ok(payment.clone())
    }

    /// Moves every pending payment due before `today` to overdue. Returns how many moved.
    #[instrument(skip(self))]
    pub fn mark_overdue_payments(&mut self, today: NaiveDate) -> usize {
        info!("Sweeping overdue payments");
        let mut moved = 0;

        for payment in self
            .payments
            .iter_mut()
            .filter(|p| p.status == PaymentStatus::Pending && p.due_date < today)
        {
            payment.status = PaymentStatus::Overdue;
            moved += 1;
        }

        moved
    }

    #[instrument(skip_all, fields(description = %input.description))]
    pub fn add_expense(&mut self, input: NewExpense) -> Result<Expense, AppError> {
        info!("Recording expense");
        validate_input(&input)?;

        if input.amount <= Decimal::ZERO {
            return Err(AppError::Validation(
                "Expense amount must be positive".to_string(),
            ));
        }

        match (input.recurring, input.frequency) {
            (true, None) => {
                return Err(AppError::Validation(
                    "A recurring expense needs a frequency".to_string(),
                ));
            }
            (false, Some(_)) => {
                return Err(AppError::Validation(
                    "A one-off expense cannot have a frequency".to_string(),
                ));
            }
            _ => {}
        }

        let expense = Expense {
            id: self.ids.next(ids::EXPENSE),
            description: input.description,
            amount: input.amount,
            category: input.category,
            payment_method: input.payment_method,
            date: input.date,
            recurring: input.recurring,
            frequency: input.frequency,
        };
        self.expenses.push(expense.clone());

        Ok(expense)
    }

    #[instrument(skip(self))]
    pub fn list_expenses(&self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Vec<Expense> {
        info!("Listing expenses");
        let mut expenses: Vec<Expense> = self
            .expenses
            .iter()
            .filter(|e| from.is_none_or(|d| e.date >= d))
            .filter(|e| to.is_none_or(|d| e.date <= d))
            .cloned()
            .collect();

        expenses.sort_by_key(|e| e.date);
        expenses
    }

    #[instrument(skip(self))]
    pub fn delete_expense(&mut self, id: &str) -> Result<Expense, AppError> {
        info!("Deleting expense");
        remove_by_id(&mut self.expenses, id, "Expense", |e| e.id.as_str())
    }
}
