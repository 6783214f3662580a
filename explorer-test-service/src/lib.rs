//! A minimal unary-plus-reflection gRPC server, used as the upstream target
//! in Invoker and Façade integration tests (Connect/gRPC transport
//! round-trips, reflection-based Loader tests).

use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::{Request, Response, Status, transport::Server};

tonic::include_proto!("explorer.test.v1");

/// The encoded `FileDescriptorSet` for this service, for `tonic-reflection`.
pub const FILE_DESCRIPTOR_SET: &[u8] = tonic::include_file_descriptor_set!("explorer_test_service");

#[derive(Default, Clone, Copy)]
pub struct EchoServiceImpl;

#[tonic::async_trait]
impl echo_service_server::EchoService for EchoServiceImpl {
    async fn say(&self, request: Request<SayRequest>) -> Result<Response<SayResponse>, Status> {
        let sentence = request.into_inner().sentence;
        Ok(Response::new(SayResponse {
            sentence: format!("Hello! How can I help you today? (you said: {sentence})"),
        }))
    }
}

/// Spawns the echo+reflection server on an ephemeral local port and returns
/// its address. The server runs until the process exits; tests don't need to
/// shut it down explicitly since each test binds its own port.
pub async fn spawn() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local_addr");

    tokio::spawn(async move {
        let reflection = tonic_reflection::server::Builder::configure()
            .register_encoded_file_descriptor_set(FILE_DESCRIPTOR_SET)
            .build_v1()
            .expect("build reflection service");

        Server::builder()
            .add_service(reflection)
            .add_service(echo_service_server::EchoServiceServer::new(EchoServiceImpl))
            .serve_with_incoming(TcpListenerStream::new(listener))
            .await
            .expect("serve");
    });

    addr
}
