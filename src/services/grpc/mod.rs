// ============================================================================
// gRPC Clients for the Bank and Delivery Services
// ============================================================================
//
// Messages are declared by hand in `proto`; calls go through a plain
// tonic::client::Grpc over a lazily connected Channel. Every call is bounded
// by a timeout, retried on transient failure and guarded by a circuit breaker.
//
// ============================================================================

mod delivery;
mod funds_transfer;
pub mod proto;

pub use delivery::GrpcDeliveryClient;
pub use funds_transfer::GrpcFundsTransferClient;

use std::time::Duration;
use tonic::codegen::http::uri::PathAndQuery;
use tonic::transport::{Channel, Endpoint};
use tonic::Code;

/// Lazily connected channel; the first call establishes the connection
pub(crate) fn lazy_channel(endpoint: &str, timeout: Duration) -> anyhow::Result<Channel> {
    let channel = Endpoint::from_shared(endpoint.to_string())?
        .connect_timeout(timeout)
        .timeout(timeout)
        .connect_lazy();
    Ok(channel)
}

pub(crate) async fn unary<Req, Resp>(
    channel: Channel,
    path: &'static str,
    message: Req,
) -> Result<Resp, tonic::Status>
where
    Req: prost::Message + Send + Sync + 'static,
    Resp: prost::Message + Default + Send + Sync + 'static,
{
    let mut grpc = tonic::client::Grpc::new(channel);
    grpc.ready()
        .await
        .map_err(|e| tonic::Status::unavailable(format!("service was not ready: {}", e)))?;

    let codec = tonic_prost::ProstCodec::<Req, Resp>::default();
    grpc.unary(
        tonic::Request::new(message),
        PathAndQuery::from_static(path),
        codec,
    )
    .await
    .map(tonic::Response::into_inner)
}

/// Codes after which the peer may or may not have applied the request
pub(crate) fn is_unknown_outcome(code: Code) -> bool {
    matches!(
        code,
        Code::Unavailable
            | Code::DeadlineExceeded
            | Code::ResourceExhausted
            | Code::Aborted
            | Code::Unknown
            | Code::Internal
            | Code::Cancelled
    )
}
