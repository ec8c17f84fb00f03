//! `WebSocket` plumbing for the realtime connection.

use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::warn;

use crate::error::GatewayResult;
use crate::protocol::GatewayPayload;

/// The underlying `tokio-tungstenite` stream type.
type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Write half of the socket.
pub(crate) type WsWriter = SplitSink<WsStream, Message>;
/// Read half of the socket.
pub(crate) type WsReader = SplitStream<WsStream>;

/// Open a `WebSocket` to the given `wss://` URL and split it.
pub(crate) async fn connect(url: &str) -> GatewayResult<(WsWriter, WsReader)> {
    let (ws, _response) = connect_async(url).await?;
    Ok(ws.split())
}

/// Receive the next decoded Gateway payload.
///
/// Text frames that fail to decode are logged and skipped. Returns
/// `Ok(None)` when the stream ends without a close frame; a close frame
/// surfaces as [`GatewayError::Closed`](crate::GatewayError::Closed)
/// carrying the peer's code.
pub(crate) async fn next_payload(reader: &mut WsReader) -> GatewayResult<Option<GatewayPayload>> {
    loop {
        match reader.next().await {
            Some(Ok(Message::Text(text))) => match serde_json::from_str(&text) {
                Ok(payload) => return Ok(Some(payload)),
                Err(e) => {
                    warn!(error = %e, "Failed to decode Gateway payload");
                },
            },
            Some(Ok(Message::Close(frame))) => {
                let code = frame.as_ref().map_or(1000, |f| f.code.into());
                return Err(crate::GatewayError::Closed(code));
            },
            Some(Ok(
                Message::Ping(_) | Message::Pong(_) | Message::Binary(_) | Message::Frame(_),
            )) => {
                // Ping/pong answered by tungstenite; binary skipped.
            },
            Some(Err(e)) => return Err(e.into()),
            None => return Ok(None),
        }
    }
}

/// Send one payload as a JSON text frame.
pub(crate) async fn send_payload(writer: &mut WsWriter, payload: &GatewayPayload) -> GatewayResult<()> {
    let json = serde_json::to_string(payload)?;
    writer.send(Message::Text(json.into())).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::protocol::GatewayPayload;

    #[test]
    fn payload_serializes_to_text_frame_body() {
        let payload = GatewayPayload {
            op: 1,
            d: Some(serde_json::json!(42)),
            s: None,
            t: None,
        };
        let json = serde_json::to_string(&payload).unwrap();
        assert!(json.contains("\"op\":1"));
    }
}
