//! @ai:module:intent Eval: every press release listed on a campaign news page
//! @ai:module:layer application
//! @ai:module:public_api ExtractPressReleases

use crate::browser::{GotoOptions, WaitUntil};
use crate::error::Result;
use crate::logger::AuxiliaryValue;
use crate::schema::{Field, Schema};
use crate::task::{ExtractionScenario, Mismatch, TaskScope, Verdict};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

const URL: &str = "https://www.landerfornyc.com/news";

const INSTRUCTION: &str = "extract the title and corresponding publish date of EACH AND EVERY \
    press releases on this page. DO NOT MISS ANY PRESS RELEASES.";

const DOM_SETTLE_TIMEOUT_MS: u64 = 3_000;
const DEFAULT_SETTLE_MS: u64 = 5_000;

/// The page lists more than this many releases.
const EXPECTED_MIN_ITEMS: usize = 28;
const SIMILARITY_THRESHOLD: f64 = 0.9;

const EXPECTED_FIRST: PressRelease<'static> = PressRelease {
    title: "UAW Region 9A Endorses Brad Lander for Mayor",
    publish_date: "Dec 4, 2024",
};

const EXPECTED_LAST: PressRelease<'static> = PressRelease {
    title: "An Unassuming Liberal Makes a Rapid Ascent to Power Broker",
    publish_date: "Jan 23, 2014",
};

#[derive(Debug, Clone, Copy)]
struct PressRelease<'a> {
    title: &'a str,
    publish_date: &'a str,
}

#[derive(Debug, Deserialize)]
struct ExtractedRelease {
    title: String,
    publish_date: String,
}

#[derive(Debug, Deserialize)]
struct ExtractedReleases {
    items: Vec<ExtractedRelease>,
}

fn schema() -> Schema {
    Schema::object(vec![Field::new(
        "items",
        Schema::array(Schema::object(vec![
            Field::new(
                "title",
                Schema::string().describe("The title of the press release"),
            ),
            Field::new(
                "publish_date",
                Schema::string().describe("The date the press release was published"),
            ),
        ])),
    )])
}

/// @ai:intent Whether any extracted item fuzzily matches the expected release
/// @ai:effects pure
fn contains_release(
    scope: &mut TaskScope<'_>,
    items: &[ExtractedRelease],
    expected: PressRelease<'_>,
) -> Result<bool> {
    for item in items {
        let title = scope.compare(&item.title, expected.title, SIMILARITY_THRESHOLD)?;
        let date = scope.compare(&item.publish_date, expected.publish_date, SIMILARITY_THRESHOLD)?;

        if title.meets_threshold && date.meets_threshold {
            return Ok(true);
        }
    }

    Ok(false)
}

fn missing(message: &str, expected: PressRelease<'_>) -> Mismatch {
    Mismatch {
        message: message.to_string(),
        expected: AuxiliaryValue::string(format!("{} ({})", expected.title, expected.publish_date)),
        actual: AuxiliaryValue::string("no item within similarity threshold"),
    }
}

/// @ai:intent Checks the release count and that the newest and oldest releases were found
pub struct ExtractPressReleases;

#[async_trait]
impl ExtractionScenario for ExtractPressReleases {
    fn name(&self) -> &'static str {
        "extract_press_releases"
    }

    fn dom_settle_timeout_ms(&self) -> Option<u64> {
        Some(DOM_SETTLE_TIMEOUT_MS)
    }

    /// @ai:effects network, time
    async fn execute(&self, scope: &mut TaskScope<'_>) -> Result<Verdict> {
        scope
            .goto(URL, GotoOptions::wait_until(WaitUntil::NetworkIdle))
            .await?;

        let settle_ms = scope.option_u64("settle_ms").unwrap_or(DEFAULT_SETTLE_MS);
        scope.settle(Duration::from_millis(settle_ms)).await;

        let extracted: ExtractedReleases = scope.extract(INSTRUCTION, &schema()).await?;
        let items = extracted.items;

        if items.len() <= EXPECTED_MIN_ITEMS {
            return Ok(Verdict::Mismatch(Mismatch {
                message: "Not enough items extracted".to_string(),
                expected: AuxiliaryValue::string(format!("> {}", EXPECTED_MIN_ITEMS)),
                actual: AuxiliaryValue::integer(items.len() as i64),
            }));
        }

        if !contains_release(scope, &items, EXPECTED_FIRST)? {
            return Ok(Verdict::Mismatch(missing(
                "First press release not found",
                EXPECTED_FIRST,
            )));
        }

        if !contains_release(scope, &items, EXPECTED_LAST)? {
            return Ok(Verdict::Mismatch(missing(
                "Last press release not found",
                EXPECTED_LAST,
            )));
        }

        Ok(Verdict::Pass)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_release_mentions_expected_title() {
        let mismatch = missing("First press release not found", EXPECTED_FIRST);
        assert!(mismatch.expected.value.contains("UAW Region 9A"));
        assert!(mismatch.expected.value.contains("Dec 4, 2024"));
    }

    #[test]
    fn test_schema_describes_item_fields() {
        let rendered = schema().to_json_schema();
        let title = &rendered["properties"]["items"]["items"]["properties"]["title"];
        assert_eq!(title["description"], "The title of the press release");
    }
}
