//! End-to-end loop tests: link supervision over the simulated WiFi and
//! MQTT adapters feeding the lock controller.

use doorlock::adapters::mqtt::{MqttTransport, Published};
use doorlock::adapters::wifi::WifiAdapter;
use doorlock::app::commands::Command;
use doorlock::app::events::AppEvent;
use doorlock::app::link::{LinkStatus, LinkSupervisor};
use doorlock::app::ports::TransportPort;
use doorlock::app::service::LockController;
use doorlock::config::LockConfig;
use doorlock::fsm::StateId;
use doorlock::protocol::{CommandSigner, SharedSecret};

use super::mock_hw::{controller, Button, FakePin, MockHardware, MockTransport, MockWifi, RecordingSink, SECRET};

struct Node {
    config: LockConfig,
    controller: LockController<FakePin>,
    button: Button,
    link: LinkSupervisor,
    wifi: WifiAdapter,
    mqtt: MqttTransport,
    hw: MockHardware,
    sink: RecordingSink,
}

impl Node {
    fn new(config: LockConfig) -> Self {
        let (mut controller, button) = controller(config.clone());
        let mut hw = MockHardware::default();
        let mut sink = RecordingSink::default();
        controller.start(0, &mut hw, &mut sink);
        Self {
            mqtt: MqttTransport::new(&config.broker_url),
            config,
            controller,
            button,
            link: LinkSupervisor::new("doorlock-efcafe"),
            wifi: WifiAdapter::new("hallway", "correct-horse").unwrap(),
            hw,
            sink,
        }
    }

    /// One poll-loop iteration, in the firmware's order.
    fn cycle(&mut self, now: u64) -> LinkStatus {
        let status = self
            .link
            .poll(now, &mut self.wifi, &mut self.mqtt, &self.config, &mut self.sink);
        while let Some(msg) = self.mqtt.poll_inbound() {
            self.controller.handle_message(&msg, &mut self.sink);
        }
        self.controller
            .tick(now, &mut self.hw, &mut self.mqtt, &mut self.sink);
        status
    }

    fn status_texts(&self) -> Vec<String> {
        self.mqtt
            .published()
            .iter()
            .filter(|p| p.topic == self.config.status_topic && !p.retained)
            .map(|p| String::from_utf8_lossy(&p.payload).into_owned())
            .collect()
    }
}

fn signed_unlock(ts: u64) -> Vec<u8> {
    CommandSigner::new(SharedSecret::new(SECRET)).sign(Command::Unlock, ts)
}

#[test]
fn first_cycle_brings_link_up_and_announces() {
    let mut node = Node::new(LockConfig::default());
    assert_eq!(node.cycle(0), LinkStatus::Up);
    assert!(node.link.is_up());
    assert_eq!(node.mqtt.client_id(), Some("doorlock-efcafe"));
    assert_eq!(node.mqtt.subscriptions(), ["testarhs/porta".to_string()]);
    assert_eq!(
        node.mqtt.published()[0],
        Published {
            topic: "testarhs/server".into(),
            payload: b"online".to_vec(),
            retained: true,
        }
    );
    assert_eq!(node.sink.count(|e| *e == AppEvent::LinkUp), 1);
}

#[test]
fn remote_unlock_then_press_publishes_statuses() {
    let config = LockConfig {
        debounce_ms: 20,
        ..LockConfig::default()
    };
    let mut node = Node::new(config);
    node.cycle(0);

    node.mqtt.sim_deliver("testarhs/porta", &signed_unlock(1_718_000_000));
    node.cycle(10);
    assert_eq!(node.controller.state(), StateId::UnlockedWindow);

    node.button.press();
    node.cycle(20);
    node.cycle(41);
    assert_eq!(node.controller.state(), StateId::Opening);
    assert!(node.hw.strike_on());

    node.cycle(41 + 1_001);
    assert_eq!(node.controller.state(), StateId::Secured);
    assert_eq!(
        node.status_texts(),
        vec!["Door unlocked", "Door secured", "Door opening"]
    );
}

#[test]
fn door_keeps_working_while_broker_is_down() {
    let mut node = Node::new(LockConfig::default());
    node.mqtt.sim_set_reachable(false);
    assert_eq!(node.cycle(0), LinkStatus::BrokerDown);

    // Local operation needs no broker: a press while secured still does nothing.
    node.button.press();
    node.cycle(1);
    node.cycle(100);
    assert_eq!(node.controller.state(), StateId::Secured);

    node.mqtt.sim_set_reachable(true);
    assert_eq!(node.cycle(1_000), LinkStatus::BrokerDown, "retry not due yet");
    assert_eq!(node.cycle(3_000), LinkStatus::Up);
}

#[test]
fn wifi_outage_is_retried_at_its_own_interval() {
    let mut node = Node::new(LockConfig::default());
    node.wifi.sim_set_reachable(false);
    assert_eq!(node.cycle(0), LinkStatus::WifiDown);
    assert_eq!(node.cycle(500), LinkStatus::WifiDown);
    assert_eq!(node.wifi.attempts(), 1);

    node.wifi.sim_set_reachable(true);
    assert_eq!(node.cycle(1_000), LinkStatus::Up);
    assert_eq!(node.wifi.attempts(), 2);
}

#[test]
fn lost_session_is_reported_and_restored() {
    let mut node = Node::new(LockConfig::default());
    node.cycle(0);
    node.mqtt.sim_set_reachable(false);
    assert_eq!(node.cycle(100), LinkStatus::BrokerDown);
    assert_eq!(node.sink.count(|e| *e == AppEvent::LinkDown), 1);

    node.mqtt.sim_set_reachable(true);
    assert_eq!(node.cycle(3_100), LinkStatus::Up);
    assert_eq!(node.sink.count(|e| *e == AppEvent::LinkUp), 2);
    // Announce goes out on every new session.
    assert_eq!(node.mqtt.published().iter().filter(|p| p.retained).count(), 2);
}

#[test]
fn supervisor_drives_any_transport_port() {
    let config = LockConfig::default();
    let mut link = LinkSupervisor::new("doorlock-000001");
    let mut wifi = MockWifi {
        reachable: true,
        ..Default::default()
    };
    let mut transport = MockTransport::offline();
    let mut sink = RecordingSink::default();

    assert_eq!(link.poll(0, &mut wifi, &mut transport, &config, &mut sink), LinkStatus::BrokerDown);
    transport.reachable = true;
    assert_eq!(link.poll(3_000, &mut wifi, &mut transport, &config, &mut sink), LinkStatus::Up);
    assert_eq!(transport.connects, vec!["doorlock-000001", "doorlock-000001"]);
    assert_eq!(transport.subscribed, vec![config.command_topic.clone()]);
    assert_eq!(wifi.attempts, 1);
}
