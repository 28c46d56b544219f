use chrono::{NaiveDate, TimeZone};
use serde::Serialize;

use crate::entities::{exercise_entry, food_entry, water_intake, weight_record};
use crate::ledger::{self, DayBucket};

/// A user's logged records, as loaded for one dashboard render.
#[derive(Debug, Clone, Default)]
pub struct Journal {
    pub food: Vec<food_entry::Model>,
    pub exercise: Vec<exercise_entry::Model>,
    pub water: Vec<water_intake::Model>,
    pub weights: Vec<weight_record::Model>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySummary {
    pub day: NaiveDate,
    pub calories_in: f64,
    pub calories_out: f64,
    pub net_calories: f64,
    pub water_ml: i32,
    pub water_goal_ml: i32,
    pub latest_weight_kg: Option<f64>,
    pub goal_weight_kg: Option<f64>,
}

pub fn calories_in<'a, I>(food: I) -> f64
where
    I: IntoIterator<Item = &'a food_entry::Model>,
{
    ledger::sum(food, |f| f.calories)
}

pub fn calories_out<'a, I>(exercise: I) -> f64
where
    I: IntoIterator<Item = &'a exercise_entry::Model>,
{
    ledger::sum(exercise, |e| e.calories_burned)
}

impl Journal {
    pub fn summarize<Tz: TimeZone>(
        &self,
        day: NaiveDate,
        zone: &Tz,
        goal_weight_kg: Option<f64>,
        water_goal_ml: i32,
    ) -> DailySummary {
        let calories_in = calories_in(ledger::entries_for_day(&self.food, day, zone));
        let calories_out = calories_out(ledger::entries_for_day(&self.exercise, day, zone));
        let water_ml = ledger::find_for_day(&self.water, day, zone)
            .map(|w| w.amount_ml)
            .unwrap_or(0);
        // Readings logged after `day` are not visible when looking back.
        let latest_weight = match ledger::day_bounds(day, zone) {
            Some((_, end)) => ledger::latest_before(&self.weights, end),
            None => ledger::latest(&self.weights),
        };

        DailySummary {
            day,
            calories_in,
            calories_out,
            net_calories: calories_in - calories_out,
            water_ml,
            water_goal_ml,
            latest_weight_kg: latest_weight.map(|w| w.weight_kg),
            goal_weight_kg,
        }
    }

    pub fn water_week<Tz: TimeZone>(&self, day: NaiveDate, zone: &Tz) -> Vec<DayBucket> {
        ledger::build_weekly_series(&self.water, day, ledger::WEEK, zone, |w| {
            f64::from(w.amount_ml)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, FixedOffset, Utc};
    use uuid::Uuid;

    fn at(s: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(s).unwrap()
    }

    fn food(date: &str, calories: f64) -> food_entry::Model {
        food_entry::Model {
            id: Uuid::new_v4(),
            user_id: 1,
            date: at(date),
            description: "Oatmeal".into(),
            calories,
            meal_type: "Breakfast".into(),
            image_url: None,
        }
    }

    fn exercise(date: &str, calories_burned: f64) -> exercise_entry::Model {
        exercise_entry::Model {
            id: Uuid::new_v4(),
            user_id: 1,
            date: at(date),
            activity: "Running".into(),
            duration_minutes: 30,
            calories_burned,
            gif_url: None,
        }
    }

    fn water(date: &str, amount_ml: i32) -> water_intake::Model {
        water_intake::Model {
            id: Uuid::new_v4(),
            user_id: 1,
            date: at(date),
            amount_ml,
        }
    }

    fn weight(date: &str, weight_kg: f64) -> weight_record::Model {
        weight_record::Model {
            id: Uuid::new_v4(),
            user_id: 1,
            date: at(date),
            weight_kg,
        }
    }

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn summary_counts_only_the_requested_day() {
        let journal = Journal {
            food: vec![
                food("2026-03-02T08:00:00Z", 300.0),
                food("2026-03-02T13:00:00Z", 200.0),
                food("2026-03-01T20:00:00Z", 900.0),
            ],
            exercise: vec![exercise("2026-03-02T18:00:00Z", 150.0)],
            water: vec![
                water("2026-03-01T09:00:00Z", 1500),
                water("2026-03-02T09:00:00Z", 750),
            ],
            weights: vec![
                weight("2026-02-28T07:00:00Z", 82.0),
                weight("2026-03-02T07:00:00Z", 81.4),
            ],
        };

        let summary = journal.summarize(day("2026-03-02"), &Utc, Some(75.0), 2000);
        assert_eq!(summary.calories_in, 500.0);
        assert_eq!(summary.calories_out, 150.0);
        assert_eq!(summary.net_calories, 350.0);
        assert_eq!(summary.water_ml, 750);
        assert_eq!(summary.latest_weight_kg, Some(81.4));
        assert_eq!(summary.goal_weight_kg, Some(75.0));
    }

    #[test]
    fn past_day_reports_the_weight_known_then() {
        let journal = Journal {
            weights: vec![
                weight("2026-02-20T07:00:00Z", 83.0),
                weight("2026-02-28T07:00:00Z", 82.0),
                weight("2026-03-02T07:00:00Z", 81.4),
            ],
            ..Default::default()
        };

        let summary = journal.summarize(day("2026-02-28"), &Utc, Some(75.0), 2000);
        assert_eq!(summary.latest_weight_kg, Some(82.0));
        let summary = journal.summarize(day("2026-02-19"), &Utc, Some(75.0), 2000);
        assert_eq!(summary.latest_weight_kg, None);
    }

    #[test]
    fn empty_journal_summarizes_to_zero() {
        let summary = Journal::default().summarize(day("2026-03-02"), &Utc, None, 2000);
        assert_eq!(summary.net_calories, 0.0);
        assert_eq!(summary.water_ml, 0);
        assert_eq!(summary.latest_weight_kg, None);
    }

    #[test]
    fn water_week_has_seven_buckets() {
        let journal = Journal {
            water: vec![water("2026-03-02T09:00:00Z", 500)],
            ..Default::default()
        };
        let week = journal.water_week(day("2026-03-02"), &Utc);
        assert_eq!(week.len(), 7);
        assert_eq!(week[6].amount, 500.0);
        assert_eq!(week[0].day, day("2026-02-24"));
    }
}
