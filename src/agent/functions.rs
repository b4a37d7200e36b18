use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

pub const CALL_EMERGENCY: &str = "call_emergency";
pub const END_CONVERSATION: &str = "end_conversation";
pub const GET_PATIENT_INFO: &str = "get_patient_info";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionSpec {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

impl FunctionSpec {
    fn new(name: &str, description: &str, parameters: Value) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            parameters,
        }
    }
}

pub fn catalog() -> Vec<FunctionSpec> {
    vec![
        FunctionSpec::new(
            CALL_EMERGENCY,
            "위급상황",
            json!({
                "type": "object",
                "properties": {
                    "emergency_type": {
                        "type": "string",
                        "description": "응급 상황의 유형"
                    },
                    "call_number_kor": {
                        "type": "string",
                        "description": "긴급전화번호"
                    },
                    "location": {
                        "type": "string",
                        "description": "응급 상황 발생 위치"
                    }
                }
            }),
        ),
        FunctionSpec::new(
            END_CONVERSATION,
            "사용자가 대화 종료를 요청",
            json!({
                "type": "object",
                "properties": {
                    "reason": {
                        "type": "string",
                        "description": "대화를 종료하려는 이유"
                    }
                }
            }),
        ),
    ]
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CallEmergencyArguments {
    #[serde(default)]
    pub emergency_type: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub call_number_kor: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EndConversationArguments {
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GetPatientInfoArguments {
    #[serde(default)]
    pub patient_name: String,
    #[serde(default)]
    pub age: u32,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub symptoms: String,
    #[serde(default)]
    pub diagnosis: String,
    #[serde(default)]
    pub treatment: String,
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use serde_json::json;

    use super::{
        CALL_EMERGENCY, CallEmergencyArguments, END_CONVERSATION, GetPatientInfoArguments,
        catalog,
    };

    #[test]
    fn catalog_lists_emergency_and_end_conversation() {
        let names: Vec<String> = catalog().into_iter().map(|function| function.name).collect();
        assert_eq!(names, vec![CALL_EMERGENCY, END_CONVERSATION]);
    }

    #[test]
    fn catalog_names_are_unique_and_stable() {
        let first = catalog();
        let names: HashSet<&str> = first.iter().map(|function| function.name.as_str()).collect();
        assert_eq!(names.len(), first.len());
        assert_eq!(first, catalog());
    }

    #[test]
    fn catalog_parameters_are_object_schemas() {
        for function in catalog() {
            assert_eq!(function.parameters["type"], "object", "function {}", function.name);
            assert!(function.parameters["properties"].is_object());
        }
        let emergency = &catalog()[0];
        assert_eq!(
            emergency.parameters["properties"]["location"]["type"],
            "string"
        );
    }

    #[test]
    fn emergency_arguments_tolerate_missing_optional_fields() {
        let args: CallEmergencyArguments =
            serde_json::from_value(json!({ "emergency_type": "심정지" }))
                .expect("arguments should decode");
        assert_eq!(args.emergency_type, "심정지");
        assert_eq!(args.location, "");
        assert_eq!(args.call_number_kor, None);
    }

    #[test]
    fn patient_info_arguments_decode() {
        let args: GetPatientInfoArguments = serde_json::from_value(json!({
            "patient_name": "홍길동",
            "age": 34,
            "gender": "여성",
            "symptoms": "두통",
            "diagnosis": "긴장성 두통",
            "treatment": "휴식"
        }))
        .expect("arguments should decode");
        assert_eq!(args.age, 34);
        assert_eq!(args.treatment, "휴식");
    }
}
