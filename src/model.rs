use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageRole {
    System,
    User,
    Assistant,
    Function,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::Function => "function",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCallRequest {
    pub name: String,
    pub arguments: Map<String, Value>,
}

impl FunctionCallRequest {
    pub fn new(name: impl Into<String>, arguments: Map<String, Value>) -> Self {
        Self {
            name: name.into(),
            arguments,
        }
    }

    pub fn arguments_as<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_value(Value::Object(self.arguments.clone()))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
    pub name: Option<String>,
    pub function_call: Option<FunctionCallRequest>,
}

impl ChatMessage {
    fn with_role(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            name: None,
            function_call: None,
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::with_role(MessageRole::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::with_role(MessageRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::with_role(MessageRole::Assistant, content)
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use serde_json::json;

    use super::{ChatMessage, FunctionCallRequest, MessageRole};

    #[derive(Debug, Deserialize, PartialEq)]
    struct Reason {
        reason: String,
    }

    #[test]
    fn constructors_set_roles() {
        assert_eq!(ChatMessage::system("s").role, MessageRole::System);
        assert_eq!(ChatMessage::user("u").role, MessageRole::User);
        assert_eq!(ChatMessage::assistant("a").role.as_str(), "assistant");
        assert_eq!(MessageRole::Function.as_str(), "function");
        assert!(ChatMessage::user("u").name.is_none());
    }

    #[test]
    fn arguments_as_decodes_typed_shape() {
        let arguments = json!({ "reason": "환자 요청" });
        let call = FunctionCallRequest::new(
            "end_conversation",
            arguments.as_object().cloned().unwrap_or_default(),
        );

        let decoded: Reason = call.arguments_as().expect("arguments should decode");
        assert_eq!(
            decoded,
            Reason {
                reason: "환자 요청".to_string()
            }
        );
    }

    #[test]
    fn arguments_as_reports_missing_fields() {
        let call = FunctionCallRequest::new("end_conversation", Default::default());
        assert!(call.arguments_as::<Reason>().is_err());
    }
}
