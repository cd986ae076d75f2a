use std::sync::{Arc, Mutex};
use std::time::Duration;

use nimmt::{
    ActionGate, Card, ClickTarget, ClientConfig, ClientMessage, ConnectionState, Dispatcher,
    Error, Intent, LocalActionRejection, Scene,
};
use tokio::sync::mpsc;

const RECONNECT_OK: &str = r#"{"type":"reconnect_ok","state":{
    "players":["me","p2"],"self_conn":"me","waiting_for_stack":null,
    "waiting_for_card":["me"],
    "stacks":[[{"face":3,"value":1}],[{"face":40,"value":3}]],
    "self":{"name":"Me","points":0,"card_points":[],"played_card":null,
            "hand":[{"face":5,"value":2},{"face":1,"value":1}]},
    "others":{"p2":{"name":"Two","points":0,"card_points":[],
                    "played_card":{"face":"?","value":"?"}}}
}}"#;

const AFTER_PLAY: &str = r#"{"type":"gamestate","state":{
    "players":["me","p2"],"self_conn":"me","waiting_for_stack":null,
    "stacks":[[{"face":3,"value":1},{"face":7,"value":1}],[{"face":40,"value":3}]],
    "self":{"name":"Me","points":0,"card_points":[],"played_card":null,
            "hand":[{"face":5,"value":2},{"face":1,"value":1}]},
    "others":{"p2":{"name":"Two","points":0,"card_points":[],"played_card":null}}
}}"#;

const CHOOSING: &str = r#"{"type":"gamestate","state":{
    "players":["me","p2"],"self_conn":"me","waiting_for_stack":"me",
    "stacks":[[{"face":3,"value":1}],[{"face":40,"value":3}]],
    "self":{"name":"Me","points":0,"card_points":[],"played_card":{"face":2,"value":1},
            "hand":[{"face":5,"value":2}]},
    "others":{"p2":{"name":"Two","points":0,"card_points":[],"played_card":{"face":9,"value":1}}}
}}"#;

struct Harness {
    dispatcher: Dispatcher<Scene>,
    scene: Arc<Mutex<Scene>>,
    gate: Arc<ActionGate>,
    sent: mpsc::UnboundedReceiver<ClientMessage>,
}

fn connect() -> Harness {
    connect_with(ClientConfig::default())
}

fn connect_with(config: ClientConfig) -> Harness {
    let gate = Arc::new(ActionGate::new("tok"));
    let scene = Arc::new(Mutex::new(Scene::default()));
    let mut dispatcher = Dispatcher::new(&config, Arc::clone(&gate), Arc::clone(&scene));
    let (tx, mut sent) = mpsc::unbounded_channel();
    dispatcher.on_connecting();
    dispatcher.on_open(tx).unwrap();
    assert!(matches!(sent.try_recv(), Ok(ClientMessage::Reconnect { .. })));
    Harness {
        dispatcher,
        scene,
        gate,
        sent,
    }
}

#[tokio::test(start_paused = true)]
async fn test_reveal_then_play_then_authoritative_render() {
    let mut h = connect();
    h.dispatcher.on_message(RECONNECT_OK);
    h.dispatcher.on_message(
        r#"{"type":"animations","animations":[
            {"action":"reveal_cards","revealed_cards":{"p2":{"face":7,"value":1}}},
            {"action":"play_card","player":"p2","stack":0}
        ]}"#,
    );
    assert_eq!(h.dispatcher.state(), ConnectionState::Synchronized);

    tokio::time::sleep(Duration::from_millis(1000)).await;
    {
        let scene = h.scene.lock().unwrap();
        assert_eq!(scene.played_card("p2"), None);
        assert_eq!(scene.sprites.len(), 1);
        assert_eq!(scene.sprites[0].card, Card::new(7, 1));
        let pile = &scene.stacks[0].cards;
        assert_eq!(pile.len(), 2);
        assert!(pile[1].hidden);
    }

    h.dispatcher.on_message(AFTER_PLAY);
    h.dispatcher.sequencer().wait_idle().await;

    let scene = h.scene.lock().unwrap();
    assert!(scene.sprites.is_empty());
    let faces: Vec<_> = scene.stacks[0].cards.iter().map(|v| v.card).collect();
    assert_eq!(faces, vec![Card::new(3, 1), Card::new(7, 1)]);
    assert!(scene.stacks[0].cards.iter().all(|v| !v.hidden));
}

#[tokio::test(start_paused = true)]
async fn test_click_on_sorted_hand_sends_original_index() {
    let mut h = connect();
    h.dispatcher.on_message(RECONNECT_OK);
    h.dispatcher.sequencer().wait_idle().await;

    let intent = h.scene.lock().unwrap().click(ClickTarget::HandCard(0));
    assert_eq!(intent, Some(Intent::PlayCard { index: 1 }));
    h.gate.submit(intent.unwrap()).unwrap();
    assert_eq!(
        h.sent.try_recv().unwrap(),
        ClientMessage::PlayCard {
            token: String::from("tok"),
            index: 1
        }
    );

    let again = h.scene.lock().unwrap().click(ClickTarget::HandCard(1)).unwrap();
    assert!(matches!(
        h.gate.submit(again),
        Err(Error::InvalidLocalAction(LocalActionRejection::CardAlreadyPlayed))
    ));
    assert!(h.sent.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn test_stack_choice_is_sent_once() {
    let mut h = connect();
    h.dispatcher.on_message(CHOOSING);
    h.dispatcher.sequencer().wait_idle().await;

    let intent = h.scene.lock().unwrap().click(ClickTarget::Stack(1)).unwrap();
    h.gate.submit(intent).unwrap();
    h.gate.submit(intent).unwrap_err();

    assert_eq!(
        h.sent.try_recv().unwrap(),
        ClientMessage::ChooseStack {
            token: String::from("tok"),
            index: 1
        }
    );
    assert!(h.sent.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn test_missing_anchor_does_not_stall_the_queue() {
    let mut h = connect();
    h.dispatcher.on_message(RECONNECT_OK);
    h.dispatcher.on_message(
        r#"{"type":"animations","animations":[
            {"action":"play_card","player":"ghost","stack":0},
            {"action":"pick_stack","player":"p2","stack":9},
            {"action":"reveal_cards","revealed_cards":{"p2":{"face":7,"value":1}}}
        ]}"#,
    );
    h.dispatcher.sequencer().wait_idle().await;

    let scene = h.scene.lock().unwrap();
    assert_eq!(scene.played_card("p2"), Some(Card::new(7, 1)));
    assert_eq!(scene.stacks[0].cards.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_reconnect_keeps_queue_and_blocks_clicks_until_synchronized() {
    let mut h = connect();
    h.dispatcher.on_message(RECONNECT_OK);
    h.dispatcher.on_message(
        r#"{"type":"animations","animations":[
            {"action":"reveal_cards","revealed_cards":{"p2":{"face":7,"value":1}}},
            {"action":"play_card","player":"p2","stack":0}
        ]}"#,
    );

    h.dispatcher.on_close(Some("reset"));
    assert!(matches!(
        h.gate.submit(Intent::PlayCard { index: 0 }),
        Err(Error::TransportFailure(_))
    ));

    let (tx, _sent) = mpsc::unbounded_channel();
    h.dispatcher.on_connecting();
    h.dispatcher.on_open(tx).unwrap();
    assert!(!h.gate.is_online());
    h.dispatcher.on_message(AFTER_PLAY);
    assert!(h.gate.is_online());

    h.dispatcher.sequencer().wait_idle().await;
    let scene = h.scene.lock().unwrap();
    assert_eq!(scene.stacks[0].cards.len(), 2);
    assert!(scene.sprites.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_slowed_play_card_settles_before_the_watchdog() {
    let mut h = connect_with(ClientConfig::default().with_animation_speed(0.1));
    h.dispatcher.on_message(CHOOSING);
    h.dispatcher.on_message(
        r#"{"type":"animations","animations":[
            {"action":"play_card","player":"me","stack":0}
        ]}"#,
    );
    h.dispatcher.sequencer().wait_idle().await;

    let scene = h.scene.lock().unwrap();
    assert_eq!(scene.played_card("me"), None);
    assert!(scene.sprites.is_empty());
    let pile = &scene.stacks[0].cards;
    assert_eq!(pile.len(), 2);
    assert_eq!(pile[1].card, Card::new(2, 1));
    assert!(!pile[1].hidden);
}
