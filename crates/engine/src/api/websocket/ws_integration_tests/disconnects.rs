use super::*;

async fn pvp_pair(addr: std::net::SocketAddr, session: &str) -> (WsClient, WsClient) {
    let mut alice = ws_connect(addr, &format!("player=alice&session={session}&mode=pvp")).await;
    let _ = ws_recv_server(&mut alice).await;
    let mut bob = ws_connect(addr, &format!("player=bob&session={session}&mode=pvp")).await;
    let _ = ws_recv_server(&mut bob).await;
    let _ = ws_recv_server(&mut alice).await;
    (alice, bob)
}

fn bob_connected(message: &ServerMessage, connected: bool) -> bool {
    matches!(
        message,
        ServerMessage::Update(s) if s.players.get("bob").is_some_and(|p| p.is_connected == connected)
    )
}

#[tokio::test]
async fn when_player_returns_within_grace_then_no_forfeit() {
    let (addr, server) = spawn_ws_server(build_test_app(Duration::from_millis(400), false)).await;
    let (mut alice, mut bob) = pvp_pair(addr, "flaky").await;

    bob.close(None).await.unwrap();
    ws_expect_message(&mut alice, RECV_TIMEOUT, |m| bob_connected(m, false)).await;

    let mut bob = ws_connect(addr, "player=bob&session=flaky&mode=pvp").await;
    let snapshot = expect_update(ws_recv_server(&mut bob).await);
    assert_eq!(snapshot.status, SessionStatus::Playing);
    ws_expect_message(&mut alice, RECV_TIMEOUT, |m| bob_connected(m, true)).await;

    ws_expect_no_message_matching(&mut alice, Duration::from_millis(700), |m| {
        matches!(m, ServerMessage::GameOver(_))
    })
    .await;

    server.abort();
}

#[tokio::test]
async fn when_player_stays_away_past_grace_then_opponent_wins_by_forfeit_once() {
    let (addr, server) = spawn_ws_server(build_test_app(Duration::from_millis(100), false)).await;
    let (mut alice, bob) = pvp_pair(addr, "walkout").await;

    drop(bob);

    match ws_expect_message(&mut alice, RECV_TIMEOUT, |m| {
        matches!(m, ServerMessage::GameOver(_))
    })
    .await
    {
        ServerMessage::GameOver(payload) => {
            assert_eq!(payload.winner, "alice");
            assert_eq!(payload.reason, Some(FinishReason::Forfeit));
        }
        _ => unreachable!(),
    }

    ws_expect_no_message_matching(&mut alice, Duration::from_millis(400), |m| {
        matches!(m, ServerMessage::GameOver(_))
    })
    .await;

    server.abort();
}

#[tokio::test]
async fn when_bot_game_player_leaves_past_grace_then_bot_wins() {
    let (addr, server) = spawn_ws_server(build_test_app(Duration::from_millis(100), false)).await;

    let mut ws = ws_connect(addr, "player=alice&session=solo").await;
    let _ = ws_recv_server(&mut ws).await;
    ws.close(None).await.unwrap();

    tokio::time::sleep(Duration::from_millis(300)).await;

    let mut ws = ws_connect(addr, "player=alice&session=solo").await;
    let snapshot = expect_update(ws_recv_server(&mut ws).await);
    assert_eq!(snapshot.status, SessionStatus::Finished);
    assert_eq!(snapshot.winner.as_deref(), Some("cpu"));

    server.abort();
}

#[tokio::test]
async fn when_same_identity_opens_a_second_tab_then_the_first_is_closed() {
    let (addr, server) = spawn_ws_server(build_test_app(Duration::from_millis(150), false)).await;

    let mut tab_a = ws_connect(addr, "player=alice&session=tabs").await;
    let _ = ws_recv_server(&mut tab_a).await;

    let mut tab_b = ws_connect(addr, "player=alice&session=tabs").await;
    let snapshot = expect_update(ws_recv_server(&mut tab_b).await);
    assert!(snapshot.players["alice"].is_connected);

    // The older tab is let go without marking alice away.
    ws_expect_close(&mut tab_a, RECV_TIMEOUT).await;
    ws_expect_no_message_matching(&mut tab_b, Duration::from_millis(400), |m| match m {
        ServerMessage::Update(s) => !s.players["alice"].is_connected,
        ServerMessage::GameOver(_) => true,
        ServerMessage::Error(_) => false,
    })
    .await;

    ws_send_client(&mut tab_b, &ClientMessage::Move { column: 0 }).await;
    let after_reply = expect_update(
        ws_expect_message(&mut tab_b, RECV_TIMEOUT, |m| {
            matches!(m, ServerMessage::Update(s) if piece_count(s) == 2)
        })
        .await,
    );
    assert_eq!(after_reply.status, SessionStatus::Playing);
    assert_eq!(after_reply.board[ROWS - 1][0], 1);

    server.abort();
}
