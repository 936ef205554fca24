use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
    routing::get,
};
use futures::{sink::SinkExt, stream::StreamExt};
use tokio::sync::mpsc;
use tonelift_core::SpeechError;
use tonelift_core::speech::{RecognitionConfig, SpeechCapture, SpeechRecognizer};

use crate::api::state::AppState;
use crate::model::{RecognizerAction, SpeechClientMessage, SpeechServerMessage};

pub fn routes() -> axum::Router<AppState> {
    axum::Router::new().route("/speech/ws", get(ws_handler))
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state.recognition))
}

/// Recognizer living in the browser; start/stop become commands sent over
/// the socket.
pub struct RemoteRecognizer {
    outbound: mpsc::UnboundedSender<SpeechServerMessage>,
}

impl SpeechRecognizer for RemoteRecognizer {
    fn start(&mut self, config: &RecognitionConfig) -> Result<(), SpeechError> {
        self.outbound
            .send(SpeechServerMessage::Command {
                action: RecognizerAction::Start,
                config: Some(config.clone()),
            })
            .map_err(|_| SpeechError::Start("connection closed".into()))
    }

    fn stop(&mut self) {
        let _ = self.outbound.send(SpeechServerMessage::Command {
            action: RecognizerAction::Stop,
            config: None,
        });
    }
}

/// One dictation session per socket.
pub struct SpeechSession {
    capture: SpeechCapture<RemoteRecognizer>,
    outbound: mpsc::UnboundedSender<SpeechServerMessage>,
}

impl SpeechSession {
    pub fn new(
        config: RecognitionConfig,
        outbound: mpsc::UnboundedSender<SpeechServerMessage>,
    ) -> Self {
        let recognizer = RemoteRecognizer {
            outbound: outbound.clone(),
        };
        Self {
            capture: SpeechCapture::with_config(Some(recognizer), config),
            outbound,
        }
    }

    fn send(&self, msg: SpeechServerMessage) {
        let _ = self.outbound.send(msg);
    }

    fn send_listening(&self) {
        self.send(SpeechServerMessage::Listening {
            value: self.capture.is_listening(),
        });
    }

    pub fn handle(&mut self, msg: SpeechClientMessage) {
        match msg {
            SpeechClientMessage::Start => {
                if self.capture.is_listening() {
                    tracing::debug!("already listening, start ignored");
                    return;
                }
                if !self.capture.start() {
                    if let Some(message) = self.capture.error() {
                        self.send(SpeechServerMessage::Error {
                            message: message.to_string(),
                        });
                    }
                }
            }
            SpeechClientMessage::Stop => {
                if let Some(text) = self.capture.stop() {
                    self.send(SpeechServerMessage::Transcript { text });
                }
                self.send_listening();
            }
            SpeechClientMessage::RecognizerStart => {
                self.capture.on_start();
                self.send_listening();
            }
            SpeechClientMessage::Result(event) => {
                self.capture.on_result(&event);
                if self.capture.is_listening() {
                    self.send(SpeechServerMessage::Interim {
                        text: self.capture.display_text().to_string(),
                    });
                }
            }
            SpeechClientMessage::Error { error } => {
                self.capture.on_error(&error);
                if let Some(message) = self.capture.error() {
                    self.send(SpeechServerMessage::Error {
                        message: message.to_string(),
                    });
                }
                self.send_listening();
            }
            SpeechClientMessage::End => {
                self.capture.on_end();
                self.send_listening();
            }
        }
    }

    /// Stops the browser recognizer if the socket goes away mid-recording.
    pub fn close(mut self) {
        if self.capture.is_listening() {
            let _ = self.capture.stop();
        }
    }
}

async fn handle_socket(socket: WebSocket, config: RecognitionConfig) {
    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<SpeechServerMessage>();
    let mut session = SpeechSession::new(config, tx.clone());

    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let Ok(text) = serde_json::to_string(&msg) else {
                continue;
            };
            if sender.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Text(text) => match serde_json::from_str::<SpeechClientMessage>(text.as_str()) {
                    Ok(msg) => session.handle(msg),
                    Err(e) => {
                        tracing::debug!(error = %e, "invalid speech message");
                        let _ = tx.send(SpeechServerMessage::Error {
                            message: format!("invalid message: {e}"),
                        });
                    }
                },
                Message::Close(_) => break,
                _ => {}
            }
        }
        session.close();
    });

    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use tonelift_core::speech::{RecognitionEvent, RecognitionResult};

    fn session() -> (SpeechSession, mpsc::UnboundedReceiver<SpeechServerMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (SpeechSession::new(RecognitionConfig::default(), tx), rx)
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<SpeechServerMessage>) -> Vec<SpeechServerMessage> {
        let mut out = Vec::new();
        while let Ok(msg) = rx.try_recv() {
            out.push(msg);
        }
        out
    }

    fn result(transcript: &str, is_final: bool) -> SpeechClientMessage {
        SpeechClientMessage::Result(RecognitionEvent {
            result_index: 0,
            results: vec![RecognitionResult {
                transcript: transcript.into(),
                is_final,
            }],
        })
    }

    #[test]
    fn test_dictation_round_trip() {
        let (mut session, mut rx) = session();

        session.handle(SpeechClientMessage::Start);
        assert_eq!(
            drain(&mut rx),
            vec![SpeechServerMessage::Command {
                action: RecognizerAction::Start,
                config: Some(RecognitionConfig::default()),
            }]
        );

        session.handle(SpeechClientMessage::RecognizerStart);
        session.handle(result("hel", false));
        session.handle(result("hello world", true));
        assert_eq!(
            drain(&mut rx),
            vec![
                SpeechServerMessage::Listening { value: true },
                SpeechServerMessage::Interim { text: "hel".into() },
                SpeechServerMessage::Interim {
                    text: "hello world".into()
                },
            ]
        );

        session.handle(SpeechClientMessage::Stop);
        assert_eq!(
            drain(&mut rx),
            vec![
                SpeechServerMessage::Command {
                    action: RecognizerAction::Stop,
                    config: None,
                },
                SpeechServerMessage::Transcript {
                    text: "hello world".into()
                },
                SpeechServerMessage::Listening { value: false },
            ]
        );
    }

    #[test]
    fn test_start_while_listening_is_ignored() {
        let (mut session, mut rx) = session();
        session.handle(SpeechClientMessage::Start);
        session.handle(SpeechClientMessage::RecognizerStart);
        drain(&mut rx);

        session.handle(SpeechClientMessage::Start);
        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn test_recognizer_error_stops_listening() {
        let (mut session, mut rx) = session();
        session.handle(SpeechClientMessage::RecognizerStart);
        drain(&mut rx);

        session.handle(SpeechClientMessage::Error {
            error: "network".into(),
        });
        assert_eq!(
            drain(&mut rx),
            vec![
                SpeechServerMessage::Error {
                    message: "Error occurred in recognition: network".into()
                },
                SpeechServerMessage::Listening { value: false },
            ]
        );
    }

    #[test]
    fn test_stop_without_speech_sends_no_transcript() {
        let (mut session, mut rx) = session();
        session.handle(SpeechClientMessage::RecognizerStart);
        session.handle(result("um", false));
        drain(&mut rx);

        session.handle(SpeechClientMessage::Stop);
        let sent = drain(&mut rx);
        assert!(
            !sent
                .iter()
                .any(|m| matches!(m, SpeechServerMessage::Transcript { .. }))
        );
    }
}
