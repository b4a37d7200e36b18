use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::agent::functions::FunctionSpec;
use crate::config::Config;
use crate::error::ChatError;
use crate::model::{ChatMessage, FunctionCallRequest};
use crate::model_gateway::ChatReply;
use crate::providers::http_errors::model_api_request_error;

const FUNCTION_CALL_AUTO: &str = "auto";
const RAW_ARGUMENTS_KEY: &str = "raw";

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    functions: Option<&'a [FunctionSpec]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    function_call: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    function_call: Option<WireFunctionCall<'a>>,
}

#[derive(Debug, Serialize)]
struct WireFunctionCall<'a> {
    name: &'a str,
    arguments: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    function_call: Option<ResponseFunctionCall>,
}

#[derive(Debug, Deserialize)]
struct ResponseFunctionCall {
    #[serde(default)]
    name: String,
    #[serde(default)]
    arguments: Value,
}

fn to_wire_message(msg: &ChatMessage) -> Result<WireMessage<'_>, ChatError> {
    let function_call = match &msg.function_call {
        Some(call) => Some(WireFunctionCall {
            name: &call.name,
            arguments: serde_json::to_string(&call.arguments).map_err(ChatError::Encode)?,
        }),
        None => None,
    };
    Ok(WireMessage {
        role: msg.role.as_str(),
        content: &msg.content,
        name: msg.name.as_deref(),
        function_call,
    })
}

pub(crate) fn encode_request(
    model: &str,
    messages: &[ChatMessage],
    functions: &[FunctionSpec],
) -> Result<Vec<u8>, ChatError> {
    let body = ChatCompletionRequest {
        model,
        messages: messages
            .iter()
            .map(to_wire_message)
            .collect::<Result<Vec<_>, _>>()?,
        functions: (!functions.is_empty()).then_some(functions),
        function_call: (!functions.is_empty()).then_some(FUNCTION_CALL_AUTO),
    };
    serde_json::to_vec(&body).map_err(ChatError::Encode)
}

// Arguments normally arrive as a JSON-encoded string; some compatible servers send an object.
fn arguments_from_wire(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        Value::Null => Map::new(),
        Value::String(raw) => match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(map)) => map,
            _ if raw.trim().is_empty() => Map::new(),
            _ => Map::from_iter([(RAW_ARGUMENTS_KEY.to_string(), Value::String(raw))]),
        },
        other => Map::from_iter([(RAW_ARGUMENTS_KEY.to_string(), other)]),
    }
}

pub(crate) fn decode_response(body: &[u8]) -> Result<ChatReply, ChatError> {
    let parsed: ChatCompletionResponse =
        serde_json::from_slice(body).map_err(ChatError::Decode)?;
    let choice = parsed
        .choices
        .into_iter()
        .next()
        .ok_or(ChatError::EmptyChoices)?;

    let function_call = choice
        .message
        .function_call
        .filter(|call| !call.name.trim().is_empty())
        .map(|call| FunctionCallRequest::new(call.name, arguments_from_wire(call.arguments)));

    Ok(ChatReply {
        content: choice.message.content.unwrap_or_default(),
        function_call,
    })
}

pub async fn chat(
    client: &Client,
    cfg: &Config,
    api_key: &str,
    messages: &[ChatMessage],
    functions: &[FunctionSpec],
) -> Result<ChatReply, ChatError> {
    let api_url = cfg.model_api_url.as_str();
    let body = encode_request(&cfg.model, messages, functions)?;
    debug!(
        api_url = %api_url,
        model = %cfg.model,
        message_count = messages.len(),
        request_bytes = body.len(),
        "sending chat completion request"
    );

    let response = client
        .post(api_url)
        .bearer_auth(api_key)
        .header(CONTENT_TYPE, "application/json")
        .body(body)
        .send()
        .await
        .map_err(|err| {
            warn!(
                api_url = %api_url,
                model = %cfg.model,
                error = %err,
                "chat completion request failed"
            );
            model_api_request_error(err, api_url, cfg.model_timeout_secs)
        })?;

    let status = response.status();
    let response_body = response
        .bytes()
        .await
        .map_err(|err| model_api_request_error(err, api_url, cfg.model_timeout_secs))?;

    if !status.is_success() {
        warn!(
            api_url = %api_url,
            model = %cfg.model,
            status = %status,
            response_body_len = response_body.len(),
            "model API returned non-success status"
        );
        return Err(ChatError::Status {
            status: status.as_u16(),
            body: String::from_utf8_lossy(&response_body).into_owned(),
        });
    }

    let reply = decode_response(&response_body)?;
    debug!(
        model = %cfg.model,
        response_len = reply.content.len(),
        function_call = reply.function_call.as_ref().map(|call| call.name.as_str()),
        "received chat completion response"
    );
    Ok(reply)
}
