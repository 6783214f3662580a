use std::collections::{HashSet, VecDeque};
use std::time::Duration;

use prost::Message;
use prost_types::{FileDescriptorProto, FileDescriptorSet};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tonic::Streaming;
use tonic::transport::{Channel, ClientTlsConfig, Endpoint};
use tonic_reflection::pb::v1alpha::{
    ServerReflectionRequest, ServerReflectionResponse,
    server_reflection_client::ServerReflectionClient,
    server_reflection_request::MessageRequest,
    server_reflection_response::MessageResponse,
};

use crate::error::LoaderError;
use crate::source::ReflectionOptions;

const DEFAULT_CONNECT_TIMEOUT_SECS: f64 = 10.0;
/// Fully-qualified names the `v1alpha` reflection service itself exposes;
/// these are filtered out of the catalog per spec.
const REFLECTION_SERVICE_FQNS: &[&str] = &[
    "grpc.reflection.v1alpha.ServerReflection",
    "grpc.reflection.v1.ServerReflection",
];

pub async fn load(endpoint: &str, opts: &ReflectionOptions) -> Result<FileDescriptorSet, LoaderError> {
    let channel = dial(endpoint, opts).await?;
    let mut session = ReflectionSession::open(channel).await?;

    let services = session.list_services().await?;
    let remaining: Vec<String> = services
        .into_iter()
        .filter(|name| !REFLECTION_SERVICE_FQNS.contains(&name.as_str()))
        .collect();

    if remaining.is_empty() {
        return Err(LoaderError::EmptyResult(
            "reflection endpoint exposes no services besides reflection itself".into(),
        ));
    }

    let mut seen = HashSet::new();
    let mut files = Vec::new();
    let mut queue = VecDeque::new();

    for service in &remaining {
        let proto_files = session.file_containing_symbol(service).await?;
        for file in proto_files {
            queue.push_back(file);
        }
    }

    while let Some(file) = queue.pop_front() {
        if !seen.insert(file.name().to_string()) {
            continue;
        }
        for dep in &file.dependency {
            if !seen.contains(dep) {
                let dep_files = session.file_by_filename(dep).await?;
                for dep_file in dep_files {
                    queue.push_back(dep_file);
                }
            }
        }
        files.push(file);
    }

    Ok(FileDescriptorSet { file: files })
}

async fn dial(endpoint: &str, opts: &ReflectionOptions) -> Result<Channel, LoaderError> {
    let timeout = Duration::from_secs_f64(
        opts.timeout_seconds.filter(|t| *t > 0.0).unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS),
    );

    let scheme = if opts.use_tls { "https" } else { "http" };
    let uri = format!("{scheme}://{endpoint}");

    let mut builder: Endpoint = Channel::from_shared(uri)
        .map_err(|e| LoaderError::SourceInvalid(format!("invalid endpoint '{endpoint}': {e}")))?
        .connect_timeout(timeout);

    if opts.use_tls {
        let mut tls = ClientTlsConfig::new().with_enabled_roots();
        if let Some(name) = &opts.server_name {
            tls = tls.domain_name(name.clone());
        }
        builder = builder
            .tls_config(tls)
            .map_err(|e| LoaderError::SourceUnreachable(format!("TLS configuration error: {e}")))?;
    }

    builder
        .connect()
        .await
        .map_err(|e| LoaderError::SourceUnreachable(format!("failed to dial '{endpoint}': {e}")))
}

/// One bidirectional reflection stream, used to issue a sequence of
/// request/response round trips against a single server connection.
struct ReflectionSession {
    tx: mpsc::Sender<ServerReflectionRequest>,
    inbound: Streaming<ServerReflectionResponse>,
}

impl ReflectionSession {
    async fn open(channel: Channel) -> Result<Self, LoaderError> {
        let mut client = ServerReflectionClient::new(channel);
        let (tx, rx) = mpsc::channel(8);
        let inbound = client
            .server_reflection_info(ReceiverStream::new(rx))
            .await
            .map_err(|status| {
                LoaderError::ReflectionUnsupported(format!(
                    "server refused reflection: {status}"
                ))
            })?
            .into_inner();

        Ok(Self { tx, inbound })
    }

    async fn call(&mut self, request: MessageRequest) -> Result<MessageResponse, LoaderError> {
        self.tx
            .send(ServerReflectionRequest { host: String::new(), message_request: Some(request) })
            .await
            .map_err(|_| LoaderError::SourceUnreachable("reflection stream closed".into()))?;

        let response = self
            .inbound
            .message()
            .await
            .map_err(|status| LoaderError::ReflectionUnsupported(status.to_string()))?
            .ok_or_else(|| LoaderError::SourceUnreachable("reflection stream closed early".into()))?;

        match response.message_response {
            Some(MessageResponse::ErrorResponse(e)) => Err(LoaderError::ReflectionUnsupported(
                format!("reflection error {}: {}", e.error_code, e.error_message),
            )),
            Some(resp) => Ok(resp),
            None => Err(LoaderError::SourceUnreachable("empty reflection response".into())),
        }
    }

    async fn list_services(&mut self) -> Result<Vec<String>, LoaderError> {
        match self.call(MessageRequest::ListServices(String::new())).await? {
            MessageResponse::ListServicesResponse(resp) => {
                Ok(resp.service.into_iter().map(|s| s.name).collect())
            }
            other => Err(LoaderError::ReflectionUnsupported(format!(
                "unexpected response to ListServices: {other:?}"
            ))),
        }
    }

    async fn file_containing_symbol(
        &mut self,
        symbol: &str,
    ) -> Result<Vec<FileDescriptorProto>, LoaderError> {
        let resp = self
            .call(MessageRequest::FileContainingSymbol(symbol.to_string()))
            .await?;
        decode_file_descriptor_response(resp)
    }

    async fn file_by_filename(&mut self, name: &str) -> Result<Vec<FileDescriptorProto>, LoaderError> {
        let resp = self.call(MessageRequest::FileByFilename(name.to_string())).await?;
        decode_file_descriptor_response(resp)
    }
}

fn decode_file_descriptor_response(
    resp: MessageResponse,
) -> Result<Vec<FileDescriptorProto>, LoaderError> {
    match resp {
        MessageResponse::FileDescriptorResponse(r) => r
            .file_descriptor_proto
            .into_iter()
            .map(|bytes| {
                FileDescriptorProto::decode(bytes.as_slice())
                    .map_err(|e| LoaderError::DecodeFailed(e.to_string()))
            })
            .collect(),
        other => Err(LoaderError::ReflectionUnsupported(format!(
            "unexpected response, expected file descriptors: {other:?}"
        ))),
    }
}
