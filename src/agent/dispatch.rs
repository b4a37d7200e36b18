use std::collections::HashMap;

use tracing::{info, warn};

use super::functions::{
    CALL_EMERGENCY, CallEmergencyArguments, END_CONVERSATION, EndConversationArguments,
    GET_PATIENT_INFO, GetPatientInfoArguments,
};
use crate::model::FunctionCallRequest;

pub trait FunctionHandler {
    fn handle(&self, call: &FunctionCallRequest);
}

impl<F> FunctionHandler for F
where
    F: Fn(&FunctionCallRequest),
{
    fn handle(&self, call: &FunctionCallRequest) {
        self(call)
    }
}

pub struct FunctionDispatcher {
    handlers: HashMap<String, Box<dyn FunctionHandler>>,
    fallback: Box<dyn FunctionHandler>,
}

impl Default for FunctionDispatcher {
    fn default() -> Self {
        let mut dispatcher = Self::new(log_unknown_function);
        dispatcher.register(CALL_EMERGENCY, log_emergency_call);
        dispatcher.register(END_CONVERSATION, log_end_conversation);
        dispatcher.register(GET_PATIENT_INFO, log_patient_info);
        dispatcher
    }
}

impl FunctionDispatcher {
    pub fn new(fallback: impl FunctionHandler + 'static) -> Self {
        Self {
            handlers: HashMap::new(),
            fallback: Box::new(fallback),
        }
    }

    pub fn register(&mut self, name: impl Into<String>, handler: impl FunctionHandler + 'static) {
        self.handlers.insert(name.into(), Box::new(handler));
    }

    pub fn dispatch(&self, call: &FunctionCallRequest) {
        match self.handlers.get(&call.name) {
            Some(handler) => handler.handle(call),
            None => self.fallback.handle(call),
        }
    }
}

fn log_emergency_call(call: &FunctionCallRequest) {
    match call.arguments_as::<CallEmergencyArguments>() {
        Ok(args) => info!(
            function = %call.name,
            emergency_type = %args.emergency_type,
            location = %args.location,
            call_number = args.call_number_kor.as_deref().unwrap_or(""),
            "model requested an emergency call"
        ),
        Err(err) => log_raw_call(call, &err),
    }
}

fn log_end_conversation(call: &FunctionCallRequest) {
    match call.arguments_as::<EndConversationArguments>() {
        Ok(args) => info!(
            function = %call.name,
            reason = %args.reason,
            "model requested to end the conversation"
        ),
        Err(err) => log_raw_call(call, &err),
    }
}

fn log_patient_info(call: &FunctionCallRequest) {
    match call.arguments_as::<GetPatientInfoArguments>() {
        Ok(args) => info!(
            function = %call.name,
            patient_name = %args.patient_name,
            age = args.age,
            gender = %args.gender,
            symptoms = %args.symptoms,
            diagnosis = %args.diagnosis,
            treatment = %args.treatment,
            "model recorded patient information"
        ),
        Err(err) => log_raw_call(call, &err),
    }
}

fn log_raw_call(call: &FunctionCallRequest, err: &serde_json::Error) {
    warn!(
        function = %call.name,
        arguments = ?call.arguments,
        error = %err,
        "function call arguments did not match the expected shape"
    );
}

fn log_unknown_function(call: &FunctionCallRequest) {
    warn!(
        function = %call.name,
        arguments = ?call.arguments,
        "model requested an unknown function"
    );
}
