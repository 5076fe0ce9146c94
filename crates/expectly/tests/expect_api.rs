//! End-to-end checks of the `expect` builder through the public API.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use expectly::{
    expect, expect_date, find_duplicate_objects, parse_dates, poll, values_from_json, CalendarSpan,
    DeviationWindow, Direction, ExpectConfig, ExpectlyError, Shape, TimeUnit, Value,
};
use serde_json::json;
use std::cell::Cell;
use std::time::Duration;

fn assertion_message(err: ExpectlyError) -> String {
    match err {
        ExpectlyError::AssertionError { message } => message,
        other => panic!("expected an assertion error, got {other:?}"),
    }
}

mod strings {
    use super::*;

    #[test]
    fn test_url_checks() {
        let url = "https://example.com/login";
        expect(url).to_start_with("https://").unwrap();
        expect(url).to_end_with("/login").unwrap();
        expect(url).to_contain_ignoring_case("EXAMPLE").unwrap();
        expect(url).not().to_be_blank().unwrap();
        expect(url).to_match_pattern(r"^https://[a-z.]+/").unwrap();
    }

    #[test]
    fn test_negated_failure_phrasing() {
        let message = assertion_message(expect("   ").not().to_be_blank().unwrap_err());
        assert!(message.contains("not to be blank, but it does"), "{message}");
    }
}

mod numbers {
    use super::*;

    #[test]
    fn test_statistics() {
        let scores = [3.0, 1.0, 2.0, 4.0];
        let scores = &scores[..];
        expect(scores).to_have_sum(10.0).unwrap();
        expect(scores).to_have_average(2.5).unwrap();
        expect(scores).to_have_median(2.5).unwrap();
        expect(scores).to_have_min(1.0).unwrap();
        expect(scores).to_have_max(4.0).unwrap();
        expect(scores).to_have_range(3.0).unwrap();
        expect(scores).to_have_all_within(0.0, 5.0).unwrap();
    }

    #[test]
    fn test_empty_input() {
        let empty: &[f64] = &[];
        expect(empty).to_have_sum(0.0).unwrap();
        let message = assertion_message(expect(empty).to_have_max(0.0).unwrap_err());
        assert!(message.contains("max is NaN"), "{message}");
    }
}

mod sequences {
    use super::*;

    #[test]
    fn test_ordering() {
        let items = values_from_json(json!([1, 2, 2, 5]));
        let items = &items[..];
        expect(items).to_be_sorted_ascending().unwrap();
        expect(items).not().to_be_strictly_ascending().unwrap();
        expect(items).to_be_monotonic().unwrap();
        expect(items).not().to_have_unique_values().unwrap();
    }

    #[test]
    fn test_sorted_by_property() {
        let rows = values_from_json(json!([
            {"name": "b", "age": 40},
            {"name": "a", "age": 30},
            {"name": "c", "age": 20}
        ]));
        let rows = &rows[..];
        expect(rows).to_be_sorted_by("age", Direction::Descending, true).unwrap();
        let message = assertion_message(
            expect(rows)
                .to_be_sorted_by("name", Direction::Ascending, false)
                .unwrap_err(),
        );
        assert!(message.contains("sorted"), "{message}");
    }

    #[test]
    fn test_unique_objects_and_partial_match() {
        let rows = values_from_json(json!([
            {"id": 1, "tags": ["x"]},
            {"tags": ["x"], "id": 1},
            {"id": 2, "tags": []}
        ]));
        assert_eq!(find_duplicate_objects(&rows).len(), 1);
        expect(&rows[..]).not().to_have_unique_objects().unwrap();
        expect(&rows[..])
            .to_contain_object_matching(Shape::from(json!({"id": 2})))
            .unwrap();
    }

    #[test]
    fn test_one_of_and_deep_equal() {
        let value: Value = json!({"a": [1, {"b": 2}]}).into();
        expect(value.clone())
            .to_deep_equal(json!({"a": [1, {"b": 2}]}))
            .unwrap();
        expect(value.clone())
            .to_match_partial(Shape::nested([("a", Shape::array_of([Shape::from(1)]))]))
            .unwrap();
        expect(Value::from("red"))
            .to_be_one_of(&["red".into(), "green".into()])
            .unwrap();
    }
}

mod dates {
    use super::*;

    #[test]
    fn test_calendar_matchers() {
        let friday = expect_date("2024-03-15T10:00:00Z").unwrap();
        let same_day = expectly::parse_date("2024-03-15T23:59:59Z").unwrap();
        friday.to_be_same_day(&same_day).unwrap();
        friday.to_be_weekday().unwrap();
        friday.to_be_in_month(3).unwrap();
        friday.to_be_day_of_week(5).unwrap();
        friday.to_have_timezone_offset("+00:00").unwrap();
        friday
            .to_be_close_to_date(&same_day, DeviationWindow::new().with_hours(14))
            .unwrap();
        friday.clone().not().to_be_weekend().unwrap();
    }

    #[test]
    fn test_date_sequences() {
        let dates = parse_dates(["2024-01-30", "2024-01-31", "2024-02-01"]).unwrap();
        let dates = &dates[..];
        expect(dates).to_have_consecutive_dates(TimeUnit::Day).unwrap();
        expect(dates)
            .to_span_at_most(CalendarSpan::new().with_days(2))
            .unwrap();
        expect(dates)
            .to_have_max_gap(CalendarSpan::new().with_days(1))
            .unwrap();
        expect(dates)
            .not()
            .to_have_consecutive_dates(TimeUnit::Month)
            .unwrap();
    }

    #[test]
    fn test_invalid_date_input() {
        let err = expect_date("not a date").unwrap_err();
        assert!(matches!(err, ExpectlyError::InvalidDate { .. }));
    }
}

mod polling {
    use super::*;

    #[test]
    fn test_poll_until_counter_reaches_value() {
        let counter = Cell::new(0);
        poll(|| {
            counter.set(counter.get() + 1);
            counter.get()
        })
        .with_timeout(Duration::from_secs(2))
        .with_intervals(vec![Duration::from_millis(1)])
        .to_be(3)
        .unwrap();
        assert_eq!(counter.get(), 3);
    }

    #[test]
    fn test_poll_times_out_with_last_value() {
        let message = assertion_message(
            poll(|| 7)
                .with_timeout(Duration::from_millis(30))
                .with_intervals(vec![Duration::from_millis(5)])
                .to_be(8)
                .unwrap_err(),
        );
        assert!(message.contains("last value Some(7)"), "{message}");
    }
}

mod configured {
    use super::*;

    #[test]
    fn test_yaml_config_applies_epsilon() {
        let config = ExpectConfig::from_yaml_str("epsilon: 0.5\n").unwrap();
        let values = [1.0, 2.0];
        expect(&values[..])
            .with_config(config)
            .to_have_sum(3.4)
            .unwrap();
    }
}

#[cfg(feature = "dom")]
mod elements {
    use super::*;
    use expectly::{BoundingBox, ElementOptions, StabilityOptions, StaticElement};
    use std::sync::Arc;

    fn quick() -> ExpectConfig {
        ExpectConfig::new()
            .with_timeout(500)
            .with_attempt_timeout(100)
            .with_poll_intervals(&[5])
    }

    #[tokio::test]
    async fn test_element_matchers() {
        let element = StaticElement::new()
            .with_attribute("class", "btn btn-primary")
            .with_attribute("data-state", "ready")
            .with_text("  Submit  ")
            .with_html("<span>Submit</span>")
            .with_bounding_box(BoundingBox::sized(120.0, 40.0));
        let options = ElementOptions::new();
        let subject = expect(&element).with_config(quick());

        subject.to_have_class("btn-primary", options).await.unwrap();
        subject
            .to_have_attributes(&[("class", "btn btn-primary"), ("data-state", "ready")], options)
            .await
            .unwrap();
        subject
            .to_have_data_attribute("state", Some("ready"), options)
            .await
            .unwrap();
        subject.to_have_trimmed_text("Submit", options).await.unwrap();
        subject.to_have_size(120.0, 40.0, options).await.unwrap();
        subject.to_have_min_size(100.0, 30.0, options).await.unwrap();
        subject
            .to_have_inner_html_containing("<span>", options)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_waits_for_attribute_change() {
        let element = Arc::new(StaticElement::new().with_attribute("aria-busy", "true"));
        let writer = Arc::clone(&element);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(30)).await;
            writer.set_attribute("aria-busy", "false");
        });

        expect(&*element)
            .with_config(quick())
            .to_have_attribute_value("aria-busy", "false", ElementOptions::new())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_detached_element_fails_even_when_negated() {
        let element = StaticElement::new().with_text("gone");
        element.detach();
        let err = expect(&element)
            .with_config(quick().with_timeout(50))
            .not()
            .to_have_trimmed_text("anything", ElementOptions::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ExpectlyError::AssertionError { .. }));
    }

    #[tokio::test]
    async fn test_stable_text() {
        let element = StaticElement::new().with_text("Loaded");
        let options = StabilityOptions::new()
            .with_timeout(Duration::from_millis(500))
            .with_min_stable(Duration::from_millis(40))
            .with_interval(Duration::from_millis(10));
        expect(&element).to_have_stable_text(options).await.unwrap();
    }
}
