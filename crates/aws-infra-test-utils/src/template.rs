//! Template inspection helpers
//!
//! Work on the JSON form of a template so tests check exactly what gets
//! written to disk.

use serde_json::Value;
use std::path::Path;

/// `(logical id, resource)` pairs of the given CloudFormation type
pub fn resources_of_type<'a>(template: &'a Value, cfn_type: &str) -> Vec<(&'a str, &'a Value)> {
    template["Resources"]
        .as_object()
        .map(|resources| {
            resources
                .iter()
                .filter(|(_, resource)| resource["Type"] == cfn_type)
                .map(|(id, resource)| (id.as_str(), resource))
                .collect()
        })
        .unwrap_or_default()
}

/// Number of resources of the given CloudFormation type
pub fn count_of_type(template: &Value, cfn_type: &str) -> usize {
    resources_of_type(template, cfn_type).len()
}

/// Read and parse a JSON file written by synthesis
pub fn read_json(path: &Path) -> Value {
    let content = std::fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("failed to read {}: {e}", path.display()));
    serde_json::from_str(&content)
        .unwrap_or_else(|e| panic!("failed to parse {}: {e}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_resources_of_type() {
        let template = json!({
            "Resources": {
                "A": { "Type": "AWS::KMS::Key" },
                "B": { "Type": "AWS::S3::Bucket" },
                "C": { "Type": "AWS::KMS::Key" },
            }
        });
        let keys = resources_of_type(&template, "AWS::KMS::Key");
        assert_eq!(keys.iter().map(|(id, _)| *id).collect::<Vec<_>>(), vec!["A", "C"]);
        assert_eq!(count_of_type(&template, "AWS::SNS::Topic"), 0);
        assert_eq!(count_of_type(&json!({}), "AWS::KMS::Key"), 0);
    }
}
