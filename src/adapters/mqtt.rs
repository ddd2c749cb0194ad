//! MQTT transport adapter.
//!
//! Implements [`MessagingPort`] over a single broker session.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: `EspMqttClient` from `esp_idf_svc`. The
//!   client's event callback runs on the ESP-IDF MQTT task and feeds a
//!   bounded inbox; the control loop drains it one message per cycle, so
//!   all domain state stays on the main task.
//! - **all other targets**: an in-memory broker for host-side runs. Tests
//!   inject inbound messages and inspect what was published.
//!
//! All traffic is QoS 0, no retain.

use log::{info, warn};

use crate::app::ports::{InboundMessage, MessagingPort};
use crate::config::SystemConfig;
use crate::error::TransportError;

/// Inbound messages buffered between two control-loop polls.
pub const INBOX_DEPTH: usize = 8;

/// How long `connect` waits for the broker to acknowledge the session.
pub const CONNECT_TIMEOUT_MS: u32 = 10_000;

/// Broker endpoint and session parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionParams {
    pub url: String,
    pub client_id: String,
    pub keepalive_secs: u16,
}

impl SessionParams {
    pub fn from_config(config: &SystemConfig, client_id: &str) -> Self {
        Self {
            url: format!("mqtt://{}:{}", config.broker_host, config.broker_port),
            client_id: client_id.into(),
            keepalive_secs: config.keepalive_secs,
        }
    }
}

/// MQTT topic filter match with single-level `+` and trailing `#`.
pub fn topic_matches(filter: &str, topic: &str) -> bool {
    let mut f = filter.split('/');
    let mut t = topic.split('/');
    loop {
        match (f.next(), t.next()) {
            (Some("#"), _) => return true,
            (Some("+"), Some(_)) => {}
            (Some(a), Some(b)) if a == b => {}
            (None, None) => return true,
            _ => return false,
        }
    }
}

// ───────────────────────────────────────────────────────────────
// ESP-IDF implementation
// ───────────────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
mod esp {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::mpsc::{Receiver, SyncSender, TryRecvError, TrySendError, sync_channel};
    use std::time::Duration;

    use esp_idf_hal::delay::FreeRtos;
    use esp_idf_svc::mqtt::client::{
        Details, EspMqttClient, EventPayload, MqttClientConfiguration, QoS,
    };

    use super::*;

    pub struct MqttAdapter {
        params: SessionParams,
        client: Option<EspMqttClient<'static>>,
        inbox: Option<Receiver<InboundMessage>>,
        connected: Arc<AtomicBool>,
    }

    impl MqttAdapter {
        pub fn new(params: SessionParams) -> Self {
            Self {
                params,
                client: None,
                inbox: None,
                connected: Arc::new(AtomicBool::new(false)),
            }
        }

        fn on_event(
            payload: EventPayload<'_, esp_idf_svc::sys::EspError>,
            connected: &AtomicBool,
            tx: &SyncSender<InboundMessage>,
        ) {
            match payload {
                EventPayload::Connected(_) => {
                    connected.store(true, Ordering::Release);
                }
                EventPayload::Disconnected => {
                    connected.store(false, Ordering::Release);
                    warn!("mqtt: broker session closed");
                }
                EventPayload::Received {
                    topic: Some(topic),
                    data,
                    details: Details::Complete,
                    ..
                } => match tx.try_send(InboundMessage::new(topic.as_bytes(), data)) {
                    Ok(()) => {}
                    Err(TrySendError::Full(_)) => {
                        warn!("mqtt: inbox full, dropping message on {}", topic);
                    }
                    Err(TrySendError::Disconnected(_)) => {}
                },
                EventPayload::Received { .. } => {
                    warn!("mqtt: dropping fragmented message");
                }
                EventPayload::Error(e) => {
                    warn!("mqtt: client error {:?}", e);
                }
                _ => {}
            }
        }

        fn client(&mut self) -> Result<&mut EspMqttClient<'static>, TransportError> {
            if !self.connected.load(Ordering::Acquire) {
                return Err(TransportError::Disconnected);
            }
            self.client.as_mut().ok_or(TransportError::NotConnected)
        }
    }

    impl MessagingPort for MqttAdapter {
        fn connect(&mut self) -> Result<(), TransportError> {
            let conf = MqttClientConfiguration {
                client_id: Some(self.params.client_id.as_str()),
                keep_alive_interval: Some(Duration::from_secs(u64::from(
                    self.params.keepalive_secs,
                ))),
                ..Default::default()
            };

            let (tx, rx) = sync_channel(INBOX_DEPTH);
            let connected = self.connected.clone();
            connected.store(false, Ordering::Release);

            let client = EspMqttClient::new_cb(&self.params.url, &conf, move |event| {
                Self::on_event(event.payload(), &connected, &tx);
            })
            .map_err(|e| {
                warn!("mqtt: client create failed: {:?}", e);
                TransportError::NotConnected
            })?;
            self.client = Some(client);
            self.inbox = Some(rx);

            let mut waited = 0;
            while !self.connected.load(Ordering::Acquire) {
                if waited >= CONNECT_TIMEOUT_MS {
                    warn!("mqtt: no CONNACK from {} within {}ms", self.params.url, waited);
                    return Err(TransportError::NotConnected);
                }
                FreeRtos::delay_ms(100);
                waited += 100;
            }
            info!("mqtt: connected to {} as {}", self.params.url, self.params.client_id);
            Ok(())
        }

        fn subscribe(&mut self, filter: &str) -> Result<(), TransportError> {
            self.client()?
                .subscribe(filter, QoS::AtMostOnce)
                .map(|_| ())
                .map_err(|e| {
                    warn!("mqtt: subscribe {} failed: {:?}", filter, e);
                    TransportError::SubscribeFailed
                })
        }

        fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), TransportError> {
            self.client()?
                .publish(topic, QoS::AtMostOnce, false, payload)
                .map(|_| ())
                .map_err(|e| {
                    warn!("mqtt: publish to {} failed: {:?}", topic, e);
                    TransportError::PublishFailed
                })
        }

        fn check_msg(&mut self) -> Result<Option<InboundMessage>, TransportError> {
            if !self.connected.load(Ordering::Acquire) {
                return Err(TransportError::Disconnected);
            }
            let inbox = self.inbox.as_ref().ok_or(TransportError::NotConnected)?;
            match inbox.try_recv() {
                Ok(msg) => Ok(Some(msg)),
                Err(TryRecvError::Empty) => Ok(None),
                Err(TryRecvError::Disconnected) => Err(TransportError::ReceiveFailed),
            }
        }
    }
}

#[cfg(target_os = "espidf")]
pub use esp::MqttAdapter;

// ───────────────────────────────────────────────────────────────
// Host simulation
// ───────────────────────────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
mod sim {
    use std::collections::VecDeque;

    use super::*;

    pub struct MqttAdapter {
        params: SessionParams,
        broker_reachable: bool,
        connected: bool,
        subscriptions: Vec<String>,
        inbox: VecDeque<InboundMessage>,
        published: Vec<(String, Vec<u8>)>,
    }

    impl MqttAdapter {
        pub fn new(params: SessionParams) -> Self {
            Self {
                params,
                broker_reachable: true,
                connected: false,
                subscriptions: Vec::new(),
                inbox: VecDeque::new(),
                published: Vec::new(),
            }
        }

        pub fn params(&self) -> &SessionParams {
            &self.params
        }

        pub fn is_connected(&self) -> bool {
            self.connected
        }

        /// Make the next `connect` fail.
        pub fn set_broker_reachable(&mut self, reachable: bool) {
            self.broker_reachable = reachable;
        }

        /// Drop the session as if the broker went away.
        pub fn drop_session(&mut self) {
            self.connected = false;
        }

        /// Deliver a message from the broker. Returns `false` when no
        /// subscription matches and the message is discarded.
        pub fn inject(&mut self, topic: &str, payload: &[u8]) -> bool {
            if !self.subscriptions.iter().any(|f| topic_matches(f, topic)) {
                return false;
            }
            self.inject_raw(topic, payload)
        }

        /// Deliver a message without checking it against the subscriptions.
        pub fn inject_raw(&mut self, topic: &str, payload: &[u8]) -> bool {
            if self.inbox.len() >= INBOX_DEPTH {
                warn!("mqtt(sim): inbox full, dropping message on {}", topic);
                return false;
            }
            self.inbox.push_back(InboundMessage::new(topic, payload));
            true
        }

        pub fn subscriptions(&self) -> &[String] {
            &self.subscriptions
        }

        pub fn published(&self) -> &[(String, Vec<u8>)] {
            &self.published
        }

        /// Take every published message, oldest first.
        pub fn take_published(&mut self) -> Vec<(String, Vec<u8>)> {
            core::mem::take(&mut self.published)
        }
    }

    impl MessagingPort for MqttAdapter {
        fn connect(&mut self) -> Result<(), TransportError> {
            if !self.broker_reachable {
                return Err(TransportError::NotConnected);
            }
            self.connected = true;
            self.subscriptions.clear();
            self.inbox.clear();
            info!("mqtt(sim): connected to {} as {}", self.params.url, self.params.client_id);
            Ok(())
        }

        fn subscribe(&mut self, filter: &str) -> Result<(), TransportError> {
            if !self.connected {
                return Err(TransportError::NotConnected);
            }
            self.subscriptions.push(filter.into());
            Ok(())
        }

        fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), TransportError> {
            if !self.connected {
                return Err(TransportError::Disconnected);
            }
            self.published.push((topic.into(), payload.to_vec()));
            Ok(())
        }

        fn check_msg(&mut self) -> Result<Option<InboundMessage>, TransportError> {
            if !self.connected {
                return Err(TransportError::Disconnected);
            }
            Ok(self.inbox.pop_front())
        }
    }
}

#[cfg(not(target_os = "espidf"))]
pub use sim::MqttAdapter;
