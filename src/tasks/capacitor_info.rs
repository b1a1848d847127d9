//! @ai:module:intent Eval: part attributes from an electronics distributor product page
//! @ai:module:layer application
//! @ai:module:public_api ExtractCapacitorInfo

use crate::browser::GotoOptions;
use crate::error::Result;
use crate::schema::{Field, Schema};
use crate::task::{ExtractionScenario, TaskScope, Verdict};
use async_trait::async_trait;
use serde::Deserialize;

const URL: &str =
    "https://www.jakelectronics.com/productdetail/panasonicelectroniccomponents-eeufm1a472l-2937406";

const INSTRUCTION: &str = "Extract the ECCN Code, RoHS Status, and Impedance.";

const EXPECTED_ECCN_CODE: &str = "EAR99";
const EXPECTED_ROHS_STATUS: &str = "RoHS Compliant";
const EXPECTED_IMPEDANCE: &str = "12mOhm";

#[derive(Debug, Deserialize)]
struct CapacitorInfo {
    #[serde(rename = "ECCN_code")]
    eccn_code: String,
    #[serde(rename = "RoHS_Status")]
    rohs_status: String,
    #[serde(rename = "Impedance")]
    impedance: String,
}

fn schema() -> Schema {
    Schema::object(vec![
        Field::new("ECCN_code", Schema::string()),
        Field::new("RoHS_Status", Schema::string()),
        Field::new("Impedance", Schema::string()),
    ])
}

/// @ai:intent Checks ECCN code, RoHS status and impedance by normalized equality
pub struct ExtractCapacitorInfo;

#[async_trait]
impl ExtractionScenario for ExtractCapacitorInfo {
    fn name(&self) -> &'static str {
        "extract_capacitor_info"
    }

    /// @ai:effects network
    async fn execute(&self, scope: &mut TaskScope<'_>) -> Result<Verdict> {
        scope.goto(URL, GotoOptions::default()).await?;

        let info: CapacitorInfo = scope.extract(INSTRUCTION, &schema()).await?;

        let fields = [
            ("ECCN code", &info.eccn_code, EXPECTED_ECCN_CODE),
            ("RoHS Status", &info.rohs_status, EXPECTED_ROHS_STATUS),
            ("Impedance", &info.impedance, EXPECTED_IMPEDANCE),
        ];

        for (label, actual, expected) in fields {
            if let Some(mismatch) = scope.check_field(label, actual, expected)? {
                return Ok(Verdict::Mismatch(mismatch));
            }
        }

        Ok(Verdict::Pass)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_schema_requires_all_three_fields() {
        let rendered = schema().to_json_schema();
        assert_eq!(
            rendered["required"],
            serde_json::json!(["ECCN_code", "RoHS_Status", "Impedance"])
        );
    }
}
