//! Per-user daily question quota
//!
//! The quota is derived from the interaction log on every check; there is
//! no separate counter. Check-then-log is not serialized, so concurrent
//! requests from one user near the limit may each be admitted.

use std::sync::Arc;

use chrono::{DateTime, Days, Duration, Local, NaiveDate, NaiveTime, Offset, TimeZone, Utc};
use serde::Serialize;
use tracing::debug;

use crate::domain::errors::DomainResult;
use crate::domain::models::UserId;
use crate::domain::ports::QuestionLog;

/// Result of a quota check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Admission {
    pub allowed: bool,
    /// Questions already logged for the day
    pub used: u32,
    pub limit: u32,
}

pub struct UsageGate {
    log: Arc<dyn QuestionLog>,
}

impl UsageGate {
    pub fn new(log: Arc<dyn QuestionLog>) -> Self {
        Self { log }
    }

    /// Server-local calendar date. Callers compute it once per request.
    pub fn today() -> NaiveDate {
        Local::now().date_naive()
    }

    /// Half-open UTC range `[start, end)` covering the local calendar date.
    pub fn day_bounds(date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
        let next = date.checked_add_days(Days::new(1)).unwrap_or(date);
        (local_midnight(date), local_midnight(next))
    }

    pub async fn count_on(&self, user_id: UserId, date: NaiveDate) -> DomainResult<u32> {
        let (start, end) = Self::day_bounds(date);
        self.log.count_between(user_id, start, end).await
    }

    pub async fn count_today(&self, user_id: UserId) -> DomainResult<u32> {
        self.count_on(user_id, Self::today()).await
    }

    /// Admit when fewer than `daily_limit` questions were logged on `date`.
    pub async fn check_and_admit(
        &self,
        user_id: UserId,
        daily_limit: u32,
        date: NaiveDate,
    ) -> DomainResult<Admission> {
        let used = self.count_on(user_id, date).await?;
        let admission = Admission {
            allowed: used < daily_limit,
            used,
            limit: daily_limit,
        };
        debug!(user_id, used, limit = daily_limit, allowed = admission.allowed, "quota check");
        Ok(admission)
    }
}

const MAX_GAP_MINUTES: i64 = 24 * 60;

fn local_midnight(date: NaiveDate) -> DateTime<Utc> {
    start_of_day(&Local, date)
}

/// First instant of `date` in `tz`. When midnight falls in a DST gap this
/// is the first local time after the gap.
fn start_of_day<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> DateTime<Utc> {
    let midnight = date.and_time(NaiveTime::MIN);
    (0..=MAX_GAP_MINUTES)
        .filter_map(|minutes| midnight.checked_add_signed(Duration::minutes(minutes)))
        .find_map(|local| tz.from_local_datetime(&local).earliest())
        .map_or_else(
            || {
                let offset = tz.offset_from_utc_datetime(&midnight).fix();
                midnight.and_utc() - Duration::seconds(i64::from(offset.local_minus_utc()))
            },
            |start| start.with_timezone(&Utc),
        )
}
