use naval_defense::{SessionConfig, SessionController, StartStatus};
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::time::{timeout, Duration};

fn test_session() -> SessionController {
    SessionController::new(SessionConfig {
        attack_bind: "127.0.0.1:0".to_string(),
        observer_bind: "127.0.0.1:0".to_string(),
    })
}

fn coords(tokens: &[&str]) -> Vec<String> {
    tokens.iter().map(|t| t.to_string()).collect()
}

fn place_fleet(session: &SessionController) {
    session.place("destructor", &coords(&["A1"])).unwrap();
    session.place("submarino", &coords(&["B1", "B2"])).unwrap();
    let receipt = session
        .place("acorazado", &coords(&["C1", "C2", "C3"]))
        .unwrap();
    assert!(receipt.fleet_complete);
}

/// One-shot attack client: connect, send the token, read the reply
/// until the server closes the connection.
async fn attack(addr: std::net::SocketAddr, token: &str) -> anyhow::Result<String> {
    let mut stream = TcpStream::connect(addr).await?;
    stream.write_all(token.as_bytes()).await?;
    let mut reply = String::new();
    timeout(Duration::from_secs(5), stream.read_to_string(&mut reply)).await??;
    Ok(reply)
}

async fn read_event(
    reader: &mut BufReader<TcpStream>,
) -> anyhow::Result<Value> {
    let mut line = String::new();
    timeout(Duration::from_secs(5), reader.read_line(&mut line)).await??;
    Ok(serde_json::from_str(&line)?)
}

#[tokio::test(flavor = "multi_thread")]
async fn test_attack_before_placement_rejected() -> anyhow::Result<()> {
    let mut session = test_session();
    session.start().await?;
    let addr = session.attack_addr().unwrap();

    assert_eq!(attack(addr, "B3").await?, "400:Flota_No_Colocada");
    assert_eq!(attack(addr, "B3").await?, "409:Atacado_Previamente");
    assert_eq!(attack(addr, "Z9").await?, "404:Coordenada_Invalida");

    session.stop().await;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_silent_connection_gets_no_reply() -> anyhow::Result<()> {
    let mut session = test_session();
    session.start().await?;
    let addr = session.attack_addr().unwrap();

    let mut stream = TcpStream::connect(addr).await?;
    stream.shutdown().await?;
    let mut reply = String::new();
    timeout(Duration::from_secs(5), stream.read_to_string(&mut reply)).await??;
    assert!(reply.is_empty(), "empty payload must close without a response");

    // The listener survives and still answers the next client.
    assert_eq!(attack(addr, "A1").await?, "400:Flota_No_Colocada");

    session.stop().await;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_full_game_over_tcp() -> anyhow::Result<()> {
    let mut session = test_session();
    session.start().await?;
    let addr = session.attack_addr().unwrap();
    place_fleet(&session);

    for token in ["A1", "B1", "B2", "C1", "C2"] {
        assert_eq!(attack(addr, token).await?, "202:Impactado");
    }
    assert_eq!(attack(addr, "D4").await?, "404:Fallido");
    assert_eq!(attack(addr, "C3").await?, "200:Hundido");

    // Terminal phase: fresh coordinates rejected, duplicates still
    // answer the duplicate rule.
    assert_eq!(attack(addr, "E5").await?, "404:Flota_Ya_Hundida");
    assert_eq!(attack(addr, "A1").await?, "409:Atacado_Previamente");

    session.stop().await;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_observer_receives_snapshot_and_impacts() -> anyhow::Result<()> {
    let mut session = test_session();
    session.start().await?;
    place_fleet(&session);

    let stream = TcpStream::connect(session.observer_addr().unwrap()).await?;
    let mut reader = BufReader::new(stream);

    let initial = read_event(&mut reader).await?;
    assert_eq!(initial["type"], "initial_state");
    assert_eq!(initial["state"]["phase"], "active");
    assert_eq!(initial["state"]["board"]["A1"], "D");

    let addr = session.attack_addr().unwrap();
    assert_eq!(attack(addr, "B1").await?, "202:Impactado");
    let event = read_event(&mut reader).await?;
    assert_eq!(event["type"], "impact");
    assert_eq!(event["coordinate"], "B1");
    assert_eq!(event["outcome"], "Impactado");

    assert_eq!(attack(addr, "E5").await?, "404:Fallido");
    let event = read_event(&mut reader).await?;
    assert_eq!(event["outcome"], "Fallido");

    // Rejected attacks are not state-affecting and push nothing: the
    // next event on the wire belongs to the next resolved attack.
    assert_eq!(attack(addr, "B1").await?, "409:Atacado_Previamente");
    assert_eq!(attack(addr, "B2").await?, "202:Impactado");
    let event = read_event(&mut reader).await?;
    assert_eq!(event["coordinate"], "B2");

    session.stop().await;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_pending_observer_promoted_on_fleet_complete() -> anyhow::Result<()> {
    let mut session = test_session();
    session.start().await?;

    let stream = TcpStream::connect(session.observer_addr().unwrap()).await?;
    let mut reader = BufReader::new(stream);

    // Attaching during setup parks the observer with a notice.
    let notice = read_event(&mut reader).await?;
    assert_eq!(notice["type"], "error");

    // Completing the fleet promotes it with a full snapshot.
    place_fleet(&session);
    let initial = read_event(&mut reader).await?;
    assert_eq!(initial["type"], "initial_state");
    assert_eq!(initial["state"]["phase"], "active");

    // And it now receives impacts.
    let addr = session.attack_addr().unwrap();
    assert_eq!(attack(addr, "A1").await?, "202:Impactado");
    let event = read_event(&mut reader).await?;
    assert_eq!(event["coordinate"], "A1");

    session.stop().await;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_observer_disconnect_does_not_break_attacks() -> anyhow::Result<()> {
    let mut session = test_session();
    session.start().await?;
    place_fleet(&session);

    let stream = TcpStream::connect(session.observer_addr().unwrap()).await?;
    let mut reader = BufReader::new(stream);
    let initial = read_event(&mut reader).await?;
    assert_eq!(initial["type"], "initial_state");
    drop(reader);

    // Attacks keep resolving with nobody watching.
    let addr = session.attack_addr().unwrap();
    assert_eq!(attack(addr, "B1").await?, "202:Impactado");
    assert_eq!(attack(addr, "E5").await?, "404:Fallido");

    session.stop().await;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_start_is_idempotent() -> anyhow::Result<()> {
    let mut session = test_session();
    assert_eq!(session.start().await?, StartStatus::Started);
    assert_eq!(session.start().await?, StartStatus::AlreadyRunning);
    assert!(session.is_running());
    session.stop().await;
    assert!(!session.is_running());
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_reset_severs_in_flight_attacker_connections() -> anyhow::Result<()> {
    let mut session = test_session();
    session.start().await?;
    let addr = session.attack_addr().unwrap();

    // Park a connection in its payload read, then reset under it.
    let mut stale = TcpStream::connect(addr).await?;
    session.reset().await?;
    place_fleet(&session);

    // The reset closed the old socket: a late payload gets no verdict.
    let _ = stale.write_all(b"A1").await;
    let mut reply = String::new();
    match timeout(Duration::from_secs(5), stale.read_to_string(&mut reply)).await? {
        Ok(_) => assert!(
            reply.is_empty(),
            "stale connection must not reach the new game, got {:?}",
            reply
        ),
        // A reset-by-peer error is the same severed connection.
        Err(_) => {}
    }

    // The new game never saw that attack: A1 is still fresh.
    let addr = session.attack_addr().unwrap();
    assert_eq!(attack(addr, "A1").await?, "202:Impactado");

    session.stop().await;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_reset_clears_all_state() -> anyhow::Result<()> {
    let mut session = test_session();
    session.start().await?;
    place_fleet(&session);
    let addr = session.attack_addr().unwrap();
    assert_eq!(attack(addr, "A1").await?, "202:Impactado");

    session.reset().await?;
    let snapshot = session.snapshot();
    let value = serde_json::to_value(&snapshot)?;
    assert_eq!(value["phase"], "setup");
    assert!(snapshot.board.values().all(|cell| cell.is_none()));
    assert!(snapshot.ships_placed.values().all(|placed| !placed));
    assert_eq!(value["impacts"]["A1"], "~");

    // History is gone: the old coordinate is fresh again, and the new
    // phase rejects it as unplaced rather than duplicate.
    let addr = session.attack_addr().unwrap();
    assert_eq!(attack(addr, "A1").await?, "400:Flota_No_Colocada");

    session.stop().await;
    Ok(())
}
