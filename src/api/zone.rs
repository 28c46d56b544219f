use axum::{
    async_trait,
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};
use serde::Deserialize;

use super::error::ApiError;
use crate::ledger;

/// Minutes east of UTC, as sent by the client.
pub const UTC_OFFSET_HEADER: &str = "x-utc-offset-minutes";

const MAX_OFFSET_MINUTES: u32 = 14 * 60;

/// Who is asking and which local day they mean.
#[derive(Debug, Clone, Copy)]
pub struct Observer {
    pub zone: FixedOffset,
    pub now: DateTime<Utc>,
    pub day: NaiveDate,
}

impl Observer {
    pub fn at(zone: FixedOffset, now: DateTime<Utc>, day: Option<NaiveDate>) -> Self {
        Self {
            zone,
            now,
            day: day.unwrap_or_else(|| ledger::calendar_day(now, &zone)),
        }
    }

    pub fn today(&self) -> NaiveDate {
        ledger::calendar_day(self.now, &self.zone)
    }
}

#[derive(Debug, Deserialize)]
struct DayQuery {
    date: Option<NaiveDate>,
}

pub fn parse_offset(raw: &str) -> Result<FixedOffset, ApiError> {
    let invalid = || ApiError::BadRequest(format!("Invalid {UTC_OFFSET_HEADER} header: {raw:?}"));
    let minutes: i32 = raw.trim().parse().map_err(|_| invalid())?;
    if minutes.unsigned_abs() > MAX_OFFSET_MINUTES {
        return Err(invalid());
    }
    FixedOffset::east_opt(minutes * 60).ok_or_else(invalid)
}

#[async_trait]
impl<S> FromRequestParts<S> for Observer
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let zone = match parts.headers.get(UTC_OFFSET_HEADER) {
            Some(value) => {
                let raw = value
                    .to_str()
                    .map_err(|_| ApiError::BadRequest(format!("Invalid {UTC_OFFSET_HEADER} header")))?;
                parse_offset(raw)?
            }
            None => Utc.fix(),
        };

        let Query(query) = Query::<DayQuery>::try_from_uri(&parts.uri)
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;
        if let Some(day) = query.date {
            if !ledger::within_calendar(day) {
                return Err(ApiError::BadRequest(format!("date {day} is out of range")));
            }
        }

        Ok(Observer::at(zone, Utc::now(), query.date))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(request: Request<()>) -> Result<Observer, ApiError> {
        let (mut parts, _) = request.into_parts();
        Observer::from_request_parts(&mut parts, &()).await
    }

    #[test]
    fn offsets_are_minutes_east() {
        assert_eq!(parse_offset("330").unwrap().local_minus_utc(), 330 * 60);
        assert_eq!(parse_offset("-300").unwrap().local_minus_utc(), -300 * 60);
        assert!(parse_offset("abc").is_err());
        assert!(parse_offset("100000").is_err());
        assert!(parse_offset("-2147483648").is_err());
        assert!(parse_offset("2147483647").is_err());
    }

    #[test]
    fn local_day_follows_the_zone() {
        let now = DateTime::parse_from_rfc3339("2026-03-02T23:30:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let tokyo = parse_offset("540").unwrap();
        let observer = Observer::at(tokyo, now, None);
        assert_eq!(observer.day, NaiveDate::from_ymd_opt(2026, 3, 3).unwrap());
        assert_eq!(observer.today(), observer.day);
    }

    #[tokio::test]
    async fn date_query_picks_the_day() {
        let request = Request::builder()
            .uri("/dashboard?date=2026-01-15")
            .header(UTC_OFFSET_HEADER, "-480")
            .body(())
            .unwrap();
        let observer = extract(request).await.unwrap();
        assert_eq!(observer.day, NaiveDate::from_ymd_opt(2026, 1, 15).unwrap());
        assert_eq!(observer.zone.local_minus_utc(), -480 * 60);
    }

    #[tokio::test]
    async fn bad_date_is_rejected() {
        let request = Request::builder()
            .uri("/dashboard?date=yesterday")
            .body(())
            .unwrap();
        assert!(matches!(extract(request).await, Err(ApiError::BadRequest(_))));
    }

    #[tokio::test]
    async fn dates_at_the_calendar_edge_are_rejected() {
        for uri in ["/water?date=%2B262142-12-31", "/water?date=-262143-01-01"] {
            let request = Request::builder().uri(uri).body(()).unwrap();
            assert!(
                matches!(extract(request).await, Err(ApiError::BadRequest(_))),
                "{uri}"
            );
        }
    }
}
