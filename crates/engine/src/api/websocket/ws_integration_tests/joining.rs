use super::*;

use tokio_tungstenite::{connect_async, tungstenite};

async fn expect_refused(addr: std::net::SocketAddr, query: &str) {
    let url = format!("ws://{}/ws?{}", addr, query);
    match connect_async(url).await {
        Err(tungstenite::Error::Http(response)) => {
            assert_eq!(response.status().as_u16(), 400);
        }
        Err(other) => panic!("expected HTTP 400, got {other:?}"),
        Ok(_) => panic!("expected the upgrade to be refused"),
    }
}

#[tokio::test]
async fn when_player_joins_default_mode_then_session_starts_against_bot() {
    let (addr, server) = spawn_ws_server(build_test_app(Duration::from_secs(30), false)).await;

    let mut ws = ws_connect(addr, "player=alice&name=Alice&session=g1").await;
    let snapshot = expect_update(ws_recv_server(&mut ws).await);

    assert_eq!(snapshot.id, "g1");
    assert_eq!(snapshot.status, SessionStatus::Playing);
    assert_eq!(snapshot.current_turn, "alice");
    assert_eq!(snapshot.players["alice"].username, "Alice");
    assert!(snapshot.players["cpu"].is_bot);
    assert_eq!(piece_count(&snapshot), 0);

    server.abort();
}

#[tokio::test]
async fn when_second_player_joins_pvp_then_both_see_playing() {
    let (addr, server) = spawn_ws_server(build_test_app(Duration::from_secs(30), false)).await;

    let mut alice = ws_connect(addr, "player=alice&session=duel&mode=pvp").await;
    let waiting = expect_update(ws_recv_server(&mut alice).await);
    assert_eq!(waiting.status, SessionStatus::Waiting);
    assert_eq!(waiting.current_turn, "");

    let mut bob = ws_connect(addr, "player=bob&session=duel&mode=pvp").await;
    for ws in [&mut alice, &mut bob] {
        let snapshot = expect_update(
            ws_expect_message(ws, RECV_TIMEOUT, |m| {
                matches!(m, ServerMessage::Update(s) if s.status == SessionStatus::Playing)
            })
            .await,
        );
        assert_eq!(snapshot.current_turn, "alice");
        assert_eq!(snapshot.players["bob"].color, 2);
    }

    server.abort();
}

#[tokio::test]
async fn when_third_identity_joins_then_it_is_told_and_closed() {
    let (addr, server) = spawn_ws_server(build_test_app(Duration::from_secs(30), false)).await;

    let mut alice = ws_connect(addr, "player=alice&session=duel&mode=pvp").await;
    let _ = ws_recv_server(&mut alice).await;
    let mut bob = ws_connect(addr, "player=bob&session=duel&mode=pvp").await;
    let _ = ws_recv_server(&mut bob).await;

    let mut carol = ws_connect(addr, "player=carol&session=duel&mode=pvp").await;
    let frames = ws_expect_close(&mut carol, RECV_TIMEOUT).await;
    assert_eq!(frames, vec![ServerMessage::error("session is full")]);

    // The seated players never hear about it.
    ws_expect_no_message_matching(&mut alice, Duration::from_millis(200), |m| {
        matches!(m, ServerMessage::Update(s) if s.players.contains_key("carol"))
    })
    .await;

    server.abort();
}

#[tokio::test]
async fn when_player_identity_is_missing_then_upgrade_is_refused() {
    let (addr, server) = spawn_ws_server(build_test_app(Duration::from_secs(30), false)).await;

    expect_refused(addr, "session=g1").await;
    expect_refused(addr, "player=%20%20").await;

    server.abort();
}

#[tokio::test]
async fn when_identity_is_the_bot_key_then_upgrade_is_refused() {
    let (addr, server) = spawn_ws_server(build_test_app(Duration::from_secs(30), true)).await;

    expect_refused(addr, "player=cpu").await;
    expect_refused(addr, "player=alice&mode=ranked").await;

    server.abort();
}

#[tokio::test]
async fn when_anonymous_play_is_allowed_then_missing_identity_joins_as_guest() {
    let (addr, server) = spawn_ws_server(build_test_app(Duration::from_secs(30), true)).await;

    let mut ws = ws_connect(addr, "session=open").await;
    let snapshot = expect_update(ws_recv_server(&mut ws).await);
    assert!(snapshot.players.contains_key(ANONYMOUS_IDENTITY));
    assert_eq!(snapshot.current_turn, ANONYMOUS_IDENTITY);

    server.abort();
}

#[tokio::test]
async fn when_joining_a_finished_session_then_game_over_is_replayed() {
    let (addr, server) = spawn_ws_server(build_test_app(Duration::from_millis(100), false)).await;

    let mut alice = ws_connect(addr, "player=alice&session=duel&mode=pvp").await;
    let _ = ws_recv_server(&mut alice).await;
    let mut bob = ws_connect(addr, "player=bob&session=duel&mode=pvp").await;
    let _ = ws_recv_server(&mut bob).await;

    bob.close(None).await.unwrap();
    ws_expect_message(&mut alice, RECV_TIMEOUT, |m| {
        matches!(m, ServerMessage::GameOver(_))
    })
    .await;

    let mut bob = ws_connect(addr, "player=bob&session=duel&mode=pvp").await;
    let snapshot = expect_update(ws_recv_server(&mut bob).await);
    assert_eq!(snapshot.status, SessionStatus::Finished);
    assert_eq!(snapshot.winner.as_deref(), Some("alice"));
    match ws_recv_server(&mut bob).await {
        ServerMessage::GameOver(payload) => {
            assert_eq!(payload.winner, "alice");
            assert_eq!(payload.reason, Some(FinishReason::Forfeit));
        }
        other => panic!("expected game_over, got {other:?}"),
    }

    server.abort();
}
