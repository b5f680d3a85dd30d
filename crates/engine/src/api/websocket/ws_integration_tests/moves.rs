use super::*;

async fn join_bot_game(addr: std::net::SocketAddr, session: &str) -> WsClient {
    let mut ws = ws_connect(addr, &format!("player=alice&session={session}")).await;
    let _ = ws_recv_server(&mut ws).await;
    ws
}

async fn expect_error(ws: &mut WsClient) -> String {
    match ws_expect_message(ws, RECV_TIMEOUT, |m| matches!(m, ServerMessage::Error(_))).await {
        ServerMessage::Error(message) => message,
        _ => unreachable!(),
    }
}

#[tokio::test]
async fn when_player_moves_then_bot_answers_in_the_same_exchange() {
    let (addr, server) = spawn_ws_server(build_test_app(Duration::from_secs(30), false)).await;
    let mut ws = join_bot_game(addr, "bot-reply").await;

    ws_send_client(&mut ws, &ClientMessage::Move { column: 3 }).await;

    let after_move = expect_update(ws_recv_server(&mut ws).await);
    assert_eq!(piece_count(&after_move), 1);
    assert_eq!(after_move.board[ROWS - 1][3], 1);
    assert_eq!(after_move.current_turn, "cpu");

    let after_reply = expect_update(ws_recv_server(&mut ws).await);
    assert_eq!(piece_count(&after_reply), 2);
    assert_eq!(after_reply.board[ROWS - 2][3], 2);
    assert_eq!(after_reply.current_turn, "alice");

    server.abort();
}

#[tokio::test]
async fn when_column_is_off_the_board_then_only_the_mover_gets_an_error() {
    let (addr, server) = spawn_ws_server(build_test_app(Duration::from_secs(30), false)).await;
    let mut ws = join_bot_game(addr, "off-board").await;

    ws_send_client(&mut ws, &ClientMessage::Move { column: 7 }).await;
    assert_eq!(expect_error(&mut ws).await, "invalid column");

    ws_send_client(&mut ws, &ClientMessage::Move { column: -1 }).await;
    assert_eq!(expect_error(&mut ws).await, "invalid column");

    ws_send_raw(&mut ws, r#"{"type":"move","payload":{"column":10000000000}}"#).await;
    assert_eq!(expect_error(&mut ws).await, "invalid column");

    ws_expect_no_message_matching(&mut ws, Duration::from_millis(200), |m| {
        matches!(m, ServerMessage::Update(_))
    })
    .await;

    server.abort();
}

#[tokio::test]
async fn when_pvp_player_moves_out_of_turn_then_it_is_rejected() {
    let (addr, server) = spawn_ws_server(build_test_app(Duration::from_secs(30), false)).await;

    let mut alice = ws_connect(addr, "player=alice&session=turns&mode=pvp").await;
    let _ = ws_recv_server(&mut alice).await;
    let mut bob = ws_connect(addr, "player=bob&session=turns&mode=pvp").await;
    let _ = ws_recv_server(&mut bob).await;
    let _ = ws_recv_server(&mut alice).await;

    ws_send_client(&mut bob, &ClientMessage::Move { column: 0 }).await;
    assert_eq!(expect_error(&mut bob).await, "not your turn");

    ws_send_client(&mut alice, &ClientMessage::Move { column: 0 }).await;
    for ws in [&mut alice, &mut bob] {
        let snapshot = expect_update(ws_recv_server(ws).await);
        assert_eq!(snapshot.board[ROWS - 1][0], 1);
        assert_eq!(snapshot.current_turn, "bob");
    }

    server.abort();
}

#[tokio::test]
async fn when_move_payload_does_not_fit_then_error_names_the_frame() {
    let (addr, server) = spawn_ws_server(build_test_app(Duration::from_secs(30), false)).await;
    let mut ws = join_bot_game(addr, "bad-payload").await;

    ws_send_raw(&mut ws, r#"{"type":"move","payload":{"column":"left"}}"#).await;
    assert_eq!(expect_error(&mut ws).await, "invalid move payload");

    server.abort();
}

#[tokio::test]
async fn when_frame_is_garbage_or_unknown_then_connection_keeps_working() {
    let (addr, server) = spawn_ws_server(build_test_app(Duration::from_secs(30), false)).await;
    let mut ws = join_bot_game(addr, "noise").await;

    ws_send_raw(&mut ws, "this is not json").await;
    ws_send_raw(&mut ws, r#"{"type":"chat","payload":{"text":"hi"}}"#).await;
    ws_expect_no_message_matching(&mut ws, Duration::from_millis(200), |_| true).await;

    ws_send_client(&mut ws, &ClientMessage::Move { column: 0 }).await;
    let snapshot = expect_update(ws_recv_server(&mut ws).await);
    assert_eq!(snapshot.board[ROWS - 1][0], 1);

    server.abort();
}

#[tokio::test]
async fn when_player_resets_then_board_is_cleared_and_they_open() {
    let (addr, server) = spawn_ws_server(build_test_app(Duration::from_secs(30), false)).await;
    let mut ws = join_bot_game(addr, "again").await;

    ws_send_client(&mut ws, &ClientMessage::Move { column: 1 }).await;
    ws_expect_message(&mut ws, RECV_TIMEOUT, |m| {
        matches!(m, ServerMessage::Update(s) if piece_count(s) == 2)
    })
    .await;

    ws_send_client(&mut ws, &ClientMessage::Reset).await;
    let snapshot = expect_update(ws_recv_server(&mut ws).await);
    assert_eq!(piece_count(&snapshot), 0);
    assert_eq!(snapshot.status, SessionStatus::Playing);
    assert_eq!(snapshot.current_turn, "alice");
    assert!(snapshot.winner.is_none());

    server.abort();
}
