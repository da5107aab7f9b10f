/// Realtime HTTP Handler
///
/// Handles the WebSocket upgrade and pumps the bidirectional flow:
/// - Inbound:  Client -> WebSocket -> parse ClientMessage -> Session actor
/// - Outbound: Server actor -> Session actor -> mpsc channel -> WebSocket
use actix::{Actor, Addr};
use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_ws::Message;
use tokio::sync::mpsc;

use super::events::Shutdown;
use super::message::ClientMessage;
use super::server::RealtimeServer;
use super::session::RealtimeSession;

/// Endpoint: GET /ws
///
/// Flow:
/// 1. HTTP handshake -> WebSocket connection
/// 2. Create mpsc channel (session actor -> client)
/// 3. Start RealtimeSession actor
/// 4. Spawn the bidirectional pump task
pub async fn websocket_handler(
    req: HttpRequest,
    stream: web::Payload,
    server: web::Data<Addr<RealtimeServer>>,
) -> Result<HttpResponse, Error> {
    tracing::debug!("WebSocket upgrade request from {:?}", req.peer_addr());

    let (response, mut ws_session, mut msg_stream) = actix_ws::handle(&req, stream)?;

    // session actor sends JSON here; the pump task writes it to the socket
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();

    let addr = RealtimeSession::new(server.get_ref().clone(), tx).start();

    actix_web::rt::spawn(async move {
        loop {
            tokio::select! {
                // === INBOUND: client -> server ===
                msg = msg_stream.recv() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            let text_str = text.to_string();

                            match serde_json::from_str::<ClientMessage>(&text_str) {
                                Ok(client_msg) => {
                                    addr.do_send(client_msg);
                                }
                                Err(e) => {
                                    tracing::warn!(
                                        "Cannot parse client message: {} - raw: {}",
                                        e,
                                        &text_str[..100.min(text_str.len())]
                                    );
                                }
                            }
                        }

                        Some(Ok(Message::Ping(data))) => {
                            if let Err(e) = ws_session.pong(&data).await {
                                tracing::error!("Cannot send pong: {}", e);
                                break;
                            }
                        }

                        Some(Ok(Message::Pong(_))) => {
                            // heartbeat response, nothing to do
                        }

                        Some(Ok(Message::Close(reason))) => {
                            tracing::info!("WebSocket close frame: {:?}", reason);
                            break;
                        }

                        Some(Ok(Message::Binary(_))) => {
                            tracing::warn!("Binary messages are not supported");
                        }

                        Some(Ok(Message::Continuation(_) | Message::Nop)) => {}

                        Some(Err(e)) => {
                            tracing::error!("WebSocket protocol error: {}", e);
                            break;
                        }

                        // stream ended, client disconnected
                        None => break,
                    }
                }

                // === OUTBOUND: server -> client ===
                Some(json) = rx.recv() => {
                    if ws_session.text(json).await.is_err() {
                        tracing::error!("Cannot write to WebSocket client");
                        break;
                    }
                }
            }
        }

        // the actor outlives the socket unless told to stop; stopping it
        // makes the server drop the session and its watches
        addr.do_send(Shutdown);
        let _ = ws_session.close(None).await;
        tracing::debug!("WebSocket pump finished");
    });

    tracing::info!("WebSocket connection established");
    Ok(response)
}
