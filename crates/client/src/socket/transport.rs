// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Transport abstraction for the socket client.
//!
//! A [`SocketConnector`] opens one physical connection and hands back a pair
//! of channels:
//! - real WebSocket connections through tokio-tungstenite for production
//! - in-memory peers for unit testing
//!
//! The connection ends when the inbound channel yields [`Inbound::Closed`]
//! or is dropped.

use std::future::Future;
use std::pin::Pin;

use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tracing::debug;

/// Error type for transport operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// Connection failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Connection closed unexpectedly.
    #[error("connection closed")]
    ConnectionClosed,

    /// Send failed.
    #[error("send failed: {0}")]
    SendFailed(String),

    /// Receive failed.
    #[error("receive failed: {0}")]
    ReceiveFailed(String),
}

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// Event from the remote side of a connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// A text frame.
    Text(String),
    /// A transport error. The connection may still be usable.
    Error(TransportError),
    /// The connection is gone.
    Closed,
}

/// Command for the local side of a connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    Text(String),
    Close,
}

/// One open physical connection.
#[derive(Debug)]
pub struct Connection {
    pub outbound: mpsc::UnboundedSender<Outbound>,
    pub inbound: mpsc::UnboundedReceiver<Inbound>,
}

/// Opens physical connections.
pub trait SocketConnector: Send + Sync + 'static {
    /// Open a connection to `url`.
    fn connect(
        &self,
        url: &str,
    ) -> Pin<Box<dyn Future<Output = TransportResult<Connection>> + Send + '_>>;
}

/// WebSocket connector using tokio-tungstenite.
///
/// Each connection is served by a pump task that forwards outbound text,
/// turns inbound text frames into [`Inbound::Text`] and reports the end of
/// the stream as [`Inbound::Closed`]. Ping and pong frames are answered by
/// the library.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebSocketConnector;

impl WebSocketConnector {
    pub fn new() -> Self {
        WebSocketConnector
    }
}

impl SocketConnector for WebSocketConnector {
    fn connect(
        &self,
        url: &str,
    ) -> Pin<Box<dyn Future<Output = TransportResult<Connection>> + Send + '_>> {
        let url = url.to_string();
        Box::pin(async move {
            let (ws_stream, _) = tokio_tungstenite::connect_async(&url)
                .await
                .map_err(|e| TransportError::ConnectionFailed(e.to_string()))?;
            let (mut sink, mut stream) = ws_stream.split();

            let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel();
            let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();

            tokio::spawn(async move {
                loop {
                    tokio::select! {
                        command = outbound_rx.recv() => match command {
                            Some(Outbound::Text(text)) => {
                                if let Err(e) = sink.send(Message::Text(text.into())).await {
                                    let _ = inbound_tx.send(Inbound::Error(
                                        TransportError::SendFailed(e.to_string()),
                                    ));
                                    break;
                                }
                            }
                            Some(Outbound::Close) | None => {
                                let _ = sink.close().await;
                                break;
                            }
                        },
                        frame = stream.next() => match frame {
                            Some(Ok(Message::Text(text))) => {
                                if inbound_tx.send(Inbound::Text(text.as_str().to_owned())).is_err() {
                                    break;
                                }
                            }
                            Some(Ok(Message::Close(_))) | None => break,
                            Some(Ok(_)) => {}
                            Some(Err(e)) => {
                                let _ = inbound_tx.send(Inbound::Error(
                                    TransportError::ReceiveFailed(e.to_string()),
                                ));
                                break;
                            }
                        },
                    }
                }
                debug!("websocket pump finished");
                let _ = inbound_tx.send(Inbound::Closed);
            });

            Ok(Connection {
                outbound: outbound_tx,
                inbound: inbound_rx,
            })
        })
    }
}
