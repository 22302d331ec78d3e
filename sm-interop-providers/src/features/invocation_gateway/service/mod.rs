use crate::features::invocation_gateway::repo::{
    ProcessError, ProcessOutput, ProcessRunner, ProcessSpec,
};
use crate::ProviderDescriptor;
use sm_interop_core::wire::decode_response;
use sm_interop_core::{CapabilityRequest, CapabilityResult};
use std::sync::Arc;

/// Where an error result came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The adapter could not be run or did not answer in the agreed format
    Transport,
    /// The adapter answered with `status: error`
    Adapter,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub result: CapabilityResult,
    /// `None` on success
    pub failure: Option<FailureKind>,
}

impl Invocation {
    fn transport(message: impl Into<String>) -> Self {
        Self {
            result: CapabilityResult::error(message),
            failure: Some(FailureKind::Transport),
        }
    }

    fn decoded(result: CapabilityResult) -> Self {
        let failure = (!result.is_success()).then_some(FailureKind::Adapter);
        Self { result, failure }
    }
}

pub struct InvocationGatewayService {
    runner: Arc<dyn ProcessRunner>,
}

impl InvocationGatewayService {
    pub fn new(runner: Arc<dyn ProcessRunner>) -> Self {
        Self { runner }
    }

    /// Run one capability against one adapter.
    ///
    /// Every failure mode is normalized into `CapabilityResult::Error`.
    pub async fn invoke(
        &self,
        descriptor: &ProviderDescriptor,
        request: &CapabilityRequest,
    ) -> Invocation {
        let payload = match request.payload_json() {
            Ok(payload) => payload,
            Err(error) => return Invocation::transport(error.to_string()),
        };

        let spec = build_spec(descriptor, request, payload);
        match self.runner.run(&spec).await {
            Ok(output) => interpret_output(request, output),
            Err(error) => transport_error(error),
        }
    }
}

/// `<program> <args..> <algorithm> <operation> --input <json>`
pub fn build_spec(
    descriptor: &ProviderDescriptor,
    request: &CapabilityRequest,
    payload: String,
) -> ProcessSpec {
    let mut args = descriptor.args.clone();
    args.push(request.algorithm().as_str().to_string());
    args.push(request.operation().as_str().to_string());
    args.push("--input".to_string());
    args.push(payload);

    ProcessSpec {
        program: descriptor.program.clone(),
        args,
        working_dir: Some(descriptor.working_dir.clone()),
    }
}

fn interpret_output(request: &CapabilityRequest, output: ProcessOutput) -> Invocation {
    let stdout = output.stdout.trim();
    let stderr = output.stderr.trim();

    // Adapters may report business failures with a non-zero exit and a JSON
    // error body; a non-zero exit is only tolerated when stdout decodes.
    if !output.success() && stdout.is_empty() {
        return Invocation::transport(format!("{}: {stderr}", exit_description(&output)));
    }

    match decode_response(request.capability(), stdout) {
        Ok(result) => Invocation::decoded(result),
        Err(_) if output.success() => Invocation::transport(format!(
            "Invalid JSON output: {stdout}\nStderr: {stderr}"
        )),
        Err(_) => Invocation::transport(format!(
            "{}; invalid JSON output: {stdout}\nStderr: {stderr}",
            exit_description(&output)
        )),
    }
}

fn exit_description(output: &ProcessOutput) -> String {
    match output.exit_code {
        Some(code) => format!("Process exited with code {code}"),
        None => "Process terminated by signal".to_string(),
    }
}

fn transport_error(error: ProcessError) -> Invocation {
    match error {
        ProcessError::NotFound { program } => {
            Invocation::transport(format!("Command not found: {program}"))
        }
        ProcessError::PermissionDenied { program } => {
            Invocation::transport(format!("Permission denied: {program}"))
        }
        ProcessError::TimedOut(_) => Invocation::transport("timed out"),
        other => Invocation::transport(other.to_string()),
    }
}
