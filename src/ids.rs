use std::collections::HashMap;

use tracing::debug;

use crate::error::AppError;

pub const CATEGORY: &str = "cat";
pub const SCHEDULE: &str = "sch";
pub const PAYMENT: &str = "pay";
pub const EXPENSE: &str = "exp";
pub const TRAINING_PLAN: &str = "tp";
pub const CLASS_PLAN: &str = "cp";
pub const ATTENDANCE: &str = "att";
pub const EVALUATION: &str = "eval";
pub const CHALLENGE: &str = "chal";
pub const LOG_ENTRY: &str = "log";
pub const TOURNAMENT: &str = "tour";
pub const ANNOUNCEMENT: &str = "ann";

/// Largest numeric suffix an explicit id may carry. Marks never pass it except
/// through `next`, which keeps `u64` arithmetic far from overflow.
pub const MAX_EXPLICIT_SUFFIX: u64 = 1_000_000_000;

/// Hands out `<prefix><n>` ids for every record kind in the store.
///
/// Each prefix keeps a high-water mark fed by every id the store accepts,
/// allocated or explicit. Marks only ever grow, so ids freed by a deletion
/// are never handed out again.
#[derive(Debug, Default, Clone)]
pub struct IdAllocator {
    high_water: HashMap<String, u64>,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&mut self, prefix: &str) -> String {
        let counter = self.high_water.entry(prefix.to_string()).or_insert(0);
        *counter += 1;
        let id = format!("{}{}", prefix, counter);
        debug!(id = %id, "Allocated id");
        id
    }

    /// Record an id that entered the store without going through `next`.
    pub fn observe(&mut self, id: &str) -> Result<(), AppError> {
        let Some((prefix, n)) = split_id(id) else {
            return Ok(());
        };
        if n > MAX_EXPLICIT_SUFFIX {
            return Err(AppError::Validation(format!(
                "Id '{}' has a numeric suffix above {}",
                id, MAX_EXPLICIT_SUFFIX
            )));
        }

        let counter = self.high_water.entry(prefix.to_string()).or_insert(0);
        if n > *counter {
            *counter = n;
        }
        Ok(())
    }

    pub fn high_water(&self, prefix: &str) -> u64 {
        self.high_water.get(prefix).copied().unwrap_or(0)
    }
}

/// `student12` -> `("student", 12)`. Ids without a numeric suffix, or made only of digits, yield `None`.
pub fn split_id(id: &str) -> Option<(&str, u64)> {
    let prefix = id.trim_end_matches(|c: char| c.is_ascii_digit());
    let digits = &id[prefix.len()..];

    if prefix.is_empty() || digits.is_empty() {
        return None;
    }

    digits.parse().ok().map(|n| (prefix, n))
}
