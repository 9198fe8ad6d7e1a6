//! Analytics aggregation queries.
//!
//! Every user-supplied filter value is bound as a query parameter. The only
//! dynamic identifier in any statement is the measure column, and that comes
//! from the [`Feature`] allow-list, never from raw client text.

use sqlx::PgPool;

use crate::errors::AppError;
use crate::models::analytics::{AnalyticsFilters, Feature, FeatureTotals, TimeseriesPoint};

/// Build the AND-ed predicate list for the supplied filters, with `$n`
/// placeholders in bind order. Values must be bound in the same order:
/// age, gender, then dates.
///
/// The summary endpoint applies the date range only when both bounds are
/// present (`allow_one_sided = false`); the timeseries endpoint also accepts
/// a single bound (`>= start` or `<= end`).
fn build_conditions(filters: &AnalyticsFilters, allow_one_sided: bool) -> Vec<String> {
    let mut conditions: Vec<String> = Vec::new();
    let mut param_index = 0u32;

    if filters.age.is_some() {
        param_index += 1;
        conditions.push(format!("age = ${param_index}"));
    }
    if filters.gender.is_some() {
        param_index += 1;
        conditions.push(format!("gender = ${param_index}"));
    }
    match (filters.start_date.is_some(), filters.end_date.is_some()) {
        (true, true) => {
            conditions.push(format!(
                "day BETWEEN ${} AND ${}",
                param_index + 1,
                param_index + 2
            ));
        }
        (true, false) if allow_one_sided => {
            param_index += 1;
            conditions.push(format!("day >= ${param_index}"));
        }
        (false, true) if allow_one_sided => {
            param_index += 1;
            conditions.push(format!("day <= ${param_index}"));
        }
        _ => {}
    }

    conditions
}

fn where_clause(conditions: &[String]) -> String {
    if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    }
}

/// Sum all six measures over the matching rows.
///
/// An empty match sums to zero for all six fields rather than NULL or an
/// error.
pub async fn summary(pool: &PgPool, filters: &AnalyticsFilters) -> Result<FeatureTotals, AppError> {
    let conditions = build_conditions(filters, false);
    let sql = format!(
        "SELECT \
            COALESCE(SUM(a), 0) AS a, \
            COALESCE(SUM(b), 0) AS b, \
            COALESCE(SUM(c), 0) AS c, \
            COALESCE(SUM(d), 0) AS d, \
            COALESCE(SUM(e), 0) AS e, \
            COALESCE(SUM(f), 0) AS f \
         FROM analytics {}",
        where_clause(&conditions)
    );

    let mut query = sqlx::query_as::<_, FeatureTotals>(&sql);
    if let Some(ref age) = filters.age {
        query = query.bind(age);
    }
    if let Some(gender) = filters.gender {
        query = query.bind(gender.as_str());
    }
    if let (Some(start), Some(end)) = (filters.start_date, filters.end_date) {
        query = query.bind(start).bind(end);
    }

    let totals = query.fetch_one(pool).await?;
    Ok(totals)
}

/// Sum one measure per distinct day over the matching rows, ascending by day.
///
/// Zero matching rows is a not-found condition here, distinct from a
/// zero-valued aggregate.
pub async fn timeseries(
    pool: &PgPool,
    feature: Feature,
    filters: &AnalyticsFilters,
) -> Result<Vec<TimeseriesPoint>, AppError> {
    let conditions = build_conditions(filters, true);
    let sql = format!(
        "SELECT day AS date, COALESCE(SUM({col}), 0) AS value \
         FROM analytics {where_clause} \
         GROUP BY day \
         ORDER BY day ASC",
        col = feature.column(),
        where_clause = where_clause(&conditions)
    );

    let mut query = sqlx::query_as::<_, TimeseriesPoint>(&sql);
    if let Some(ref age) = filters.age {
        query = query.bind(age);
    }
    if let Some(gender) = filters.gender {
        query = query.bind(gender.as_str());
    }
    match (filters.start_date, filters.end_date) {
        (Some(start), Some(end)) => {
            query = query.bind(start).bind(end);
        }
        (Some(start), None) => {
            query = query.bind(start);
        }
        (None, Some(end)) => {
            query = query.bind(end);
        }
        (None, None) => {}
    }

    let points = query.fetch_all(pool).await?;

    if points.is_empty() {
        return Err(AppError::NotFound(
            "No data found for the given parameters".to_string(),
        ));
    }

    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::analytics::Gender;
    use chrono::NaiveDate;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn no_filters_builds_no_conditions() {
        let filters = AnalyticsFilters::default();
        assert!(build_conditions(&filters, false).is_empty());
        assert!(build_conditions(&filters, true).is_empty());
        assert_eq!(where_clause(&[]), "");
    }

    #[test]
    fn each_filter_gets_a_placeholder() {
        let filters = AnalyticsFilters {
            age: Some("15-25".to_string()),
            gender: Some(Gender::Male),
            start_date: Some(date("2022-10-01")),
            end_date: Some(date("2022-10-31")),
        };
        let conditions = build_conditions(&filters, false);
        assert_eq!(
            conditions,
            vec![
                "age = $1".to_string(),
                "gender = $2".to_string(),
                "day BETWEEN $3 AND $4".to_string(),
            ]
        );
    }

    #[test]
    fn filter_values_never_appear_in_sql() {
        let filters = AnalyticsFilters {
            age: Some("15-25' OR '1'='1".to_string()),
            gender: Some(Gender::Female),
            start_date: Some(date("2022-10-01")),
            end_date: Some(date("2022-10-31")),
        };
        let joined = build_conditions(&filters, true).join(" AND ");
        assert!(!joined.contains("15-25"));
        assert!(!joined.contains("Female"));
        assert!(!joined.contains("2022"));
    }

    #[test]
    fn placeholder_indexes_follow_present_filters() {
        let filters = AnalyticsFilters {
            age: None,
            gender: Some(Gender::Female),
            start_date: Some(date("2022-10-01")),
            end_date: Some(date("2022-10-31")),
        };
        let conditions = build_conditions(&filters, false);
        assert_eq!(
            conditions,
            vec![
                "gender = $1".to_string(),
                "day BETWEEN $2 AND $3".to_string(),
            ]
        );
    }

    #[test]
    fn summary_ignores_one_sided_range() {
        let filters = AnalyticsFilters {
            start_date: Some(date("2022-10-01")),
            ..Default::default()
        };
        assert!(build_conditions(&filters, false).is_empty());

        let filters = AnalyticsFilters {
            end_date: Some(date("2022-10-31")),
            ..Default::default()
        };
        assert!(build_conditions(&filters, false).is_empty());
    }

    #[test]
    fn timeseries_supports_one_sided_range() {
        let filters = AnalyticsFilters {
            start_date: Some(date("2022-10-01")),
            ..Default::default()
        };
        assert_eq!(
            build_conditions(&filters, true),
            vec!["day >= $1".to_string()]
        );

        let filters = AnalyticsFilters {
            age: Some("25+".to_string()),
            end_date: Some(date("2022-10-31")),
            ..Default::default()
        };
        assert_eq!(
            build_conditions(&filters, true),
            vec!["age = $1".to_string(), "day <= $2".to_string()]
        );
    }

    #[test]
    fn where_clause_joins_with_and() {
        let conditions = vec!["age = $1".to_string(), "gender = $2".to_string()];
        assert_eq!(where_clause(&conditions), "WHERE age = $1 AND gender = $2");
    }
}
