//! End-to-end protocol tests.
//!
//! Each test boots a real server on an ephemeral port and talks to it over
//! TCP using the crate's own framing codec.

use std::time::Duration;

use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::sleep;

use chat_relay_server::config::ServerConfig;
use chat_relay_server::protocol::framing::{read_frame, write_frame};
use chat_relay_server::Server;

// Helper to boot a server; returns its address, the admin channel, and the
// handle of the serve task.
async fn start_server() -> (String, mpsc::Sender<String>, JoinHandle<std::io::Result<()>>) {
    let config = ServerConfig {
        bind_address: "127.0.0.1".to_string(),
        port: 0,
    };
    let server = Server::bind(&config).await.expect("bind failed");
    let addr = server.local_addr().expect("no local addr").to_string();
    let (admin_tx, admin_rx) = mpsc::channel(8);
    let handle = tokio::spawn(server.run(admin_rx));
    (addr, admin_tx, handle)
}

struct TestClient {
    stream: TcpStream,
}

impl TestClient {
    async fn connect(addr: &str) -> Self {
        let stream = TcpStream::connect(addr).await.expect("connect failed");
        Self { stream }
    }

    async fn send(&mut self, body: &str) {
        write_frame(&mut self.stream, body).await.expect("write failed");
    }

    async fn recv(&mut self) -> String {
        read_frame(&mut self.stream)
            .await
            .expect("read failed")
            .expect("connection closed")
    }

    // Helper to send a command and read the single response frame.
    async fn request(&mut self, command: &str) -> String {
        self.send(command).await;
        self.recv().await
    }

    async fn register(addr: &str, name: &str) -> Self {
        let mut client = Self::connect(addr).await;
        assert_eq!(client.request(&format!("create_client {}", name)).await, "0");
        client
    }
}

#[tokio::test]
async fn test_registration_and_duplicate_name() {
    let (addr, _admin, _server) = start_server().await;

    let mut a = TestClient::connect(&addr).await;
    assert_eq!(a.request("create_client A").await, "0");

    // Scenario 1: a second connection cannot take the same name.
    let mut b = TestClient::connect(&addr).await;
    assert_eq!(b.request("create_client A").await, "1");
    assert_eq!(b.request("create_client B").await, "0");
}

#[tokio::test]
async fn test_illegal_names_are_rejected() {
    let (addr, _admin, _server) = start_server().await;

    let mut c = TestClient::connect(&addr).await;
    assert_eq!(c.request("create_client bad!name").await, "1");
    assert_eq!(c.request("create_client ok123").await, "0");
}

#[tokio::test]
async fn test_commands_before_bootstrap_get_2() {
    let (addr, _admin, _server) = start_server().await;

    let mut c = TestClient::connect(&addr).await;
    assert_eq!(c.request("who").await, "2");
    assert_eq!(c.request("send A hello").await, "2");
    assert_eq!(c.request("gibberish").await, "2");
    // Bootstrap still works afterwards.
    assert_eq!(c.request("create_client A").await, "0");
}

#[tokio::test]
async fn test_who_lists_sorted_names() {
    let (addr, _admin, _server) = start_server().await;

    let mut bob = TestClient::register(&addr, "Bob").await;
    let _alice = TestClient::register(&addr, "Alice").await;
    let _carl = TestClient::register(&addr, "carl").await;

    // Scenario 5: lexicographic, case-sensitive ASCII order.
    assert_eq!(bob.request("who").await, "Alice,Bob,carl");
    // Idempotent with no intervening registry change.
    assert_eq!(bob.request("who").await, "Alice,Bob,carl");
}

#[tokio::test]
async fn test_direct_send() {
    let (addr, _admin, _server) = start_server().await;

    let mut a = TestClient::register(&addr, "A").await;
    let mut b = TestClient::register(&addr, "B").await;

    // Scenario 4: delivery first, then the sender's acknowledgement.
    a.send("send B hello").await;
    assert_eq!(b.recv().await, "A: hello");
    assert_eq!(a.recv().await, "Sent successfully.");
}

#[tokio::test]
async fn test_send_to_self_delivers_then_acknowledges() {
    let (addr, _admin, _server) = start_server().await;

    let mut a = TestClient::register(&addr, "A").await;
    a.send("send A hi").await;
    assert_eq!(a.recv().await, "A: hi");
    assert_eq!(a.recv().await, "Sent successfully.");
}

#[tokio::test]
async fn test_send_after_peer_disconnect_fails() {
    let (addr, _admin, _server) = start_server().await;

    let mut a = TestClient::register(&addr, "A").await;
    let b = TestClient::register(&addr, "B").await;

    assert_eq!(a.request("send B hello").await, "Sent successfully.");
    drop(b);

    // The server notices B's disconnect through B's own socket; poll until
    // the registry cleanup has run.
    for _ in 0..50 {
        if a.request("send B hello").await == "ERROR: failed to send." {
            return;
        }
        sleep(Duration::from_millis(20)).await;
    }
    panic!("send to a disconnected peer never failed");
}

#[tokio::test]
async fn test_send_to_unknown_target_fails() {
    let (addr, _admin, _server) = start_server().await;

    let mut a = TestClient::register(&addr, "A").await;
    assert_eq!(a.request("send nobody hello").await, "ERROR: failed to send.");
}

#[tokio::test]
async fn test_group_create_and_fan_out() {
    let (addr, _admin, _server) = start_server().await;

    let mut a = TestClient::register(&addr, "A").await;
    let mut b = TestClient::register(&addr, "B").await;
    let mut c = TestClient::register(&addr, "C").await;

    // Scenario 2.
    assert_eq!(
        a.request("create_group g1 B,C").await,
        "Group \"g1\" was created successfully."
    );

    // Fan-out reaches every member except the sender.
    a.send("send g1 hi all").await;
    assert_eq!(b.recv().await, "A: hi all");
    assert_eq!(c.recv().await, "A: hi all");
    assert_eq!(a.recv().await, "Sent successfully.");

    // A member that is not the creator can send too.
    b.send("send g1 hey").await;
    assert_eq!(a.recv().await, "B: hey");
    assert_eq!(c.recv().await, "B: hey");
    assert_eq!(b.recv().await, "Sent successfully.");
}

#[tokio::test]
async fn test_group_create_with_unknown_member_is_atomic() {
    let (addr, _admin, _server) = start_server().await;

    let mut a = TestClient::register(&addr, "A").await;
    let _b = TestClient::register(&addr, "B").await;

    // Scenario 3: no partial group may exist afterwards.
    assert_eq!(
        a.request("create_group g1 B,Z").await,
        "ERROR: failed to create group \"g1\"."
    );
    assert_eq!(a.request("send g1 hello").await, "ERROR: failed to send.");
    // The name is still free for a valid retry.
    assert_eq!(
        a.request("create_group g1 B").await,
        "Group \"g1\" was created successfully."
    );
}

#[tokio::test]
async fn test_group_create_rejects_degenerate_and_colliding_names() {
    let (addr, _admin, _server) = start_server().await;

    let mut a = TestClient::register(&addr, "A").await;
    let _b = TestClient::register(&addr, "B").await;

    // Only the creator resolves: fewer than two distinct members.
    assert_eq!(
        a.request("create_group g2 A").await,
        "ERROR: failed to create group \"g2\"."
    );
    // A client name cannot be reused as a group name.
    assert_eq!(
        a.request("create_group B A").await,
        "ERROR: failed to create group \"B\"."
    );
}

#[tokio::test]
async fn test_non_member_cannot_send_to_group() {
    let (addr, _admin, _server) = start_server().await;

    let mut a = TestClient::register(&addr, "A").await;
    let _b = TestClient::register(&addr, "B").await;
    let mut c = TestClient::register(&addr, "C").await;

    assert_eq!(
        a.request("create_group g1 B").await,
        "Group \"g1\" was created successfully."
    );
    assert_eq!(c.request("send g1 hello").await, "ERROR: failed to send.");
}

#[tokio::test]
async fn test_exit_unregisters_but_keeps_connection_open() {
    let (addr, _admin, _server) = start_server().await;

    let mut a = TestClient::register(&addr, "A").await;
    assert_eq!(a.request("exit").await, "Unregistered successfully.");
    // Back to the pre-bootstrap state on the same connection.
    assert_eq!(a.request("who").await, "2");
    assert_eq!(a.request("create_client A").await, "0");
    assert_eq!(a.request("who").await, "A");
}

#[tokio::test]
async fn test_exit_frees_the_name() {
    let (addr, _admin, _server) = start_server().await;

    let mut a = TestClient::register(&addr, "A").await;
    assert_eq!(a.request("exit").await, "Unregistered successfully.");

    let _other = TestClient::register(&addr, "A").await;
}

#[tokio::test]
async fn test_zero_length_frame_is_implicit_exit() {
    let (addr, _admin, _server) = start_server().await;

    let mut a = TestClient::register(&addr, "A").await;
    let mut b = TestClient::register(&addr, "B").await;

    // A bare length field of 0000 is an implicit exit, with no response.
    use tokio::io::AsyncWriteExt;
    b.stream.write_all(b"0000").await.unwrap();
    b.stream.flush().await.unwrap();

    for _ in 0..50 {
        if a.request("who").await == "A" {
            return;
        }
        sleep(Duration::from_millis(20)).await;
    }
    panic!("implicit exit never cleaned up the registry");
}

#[tokio::test]
async fn test_admin_shutdown_broadcasts_server_exit() {
    let (addr, admin, server) = start_server().await;

    let mut a = TestClient::register(&addr, "A").await;
    let mut b = TestClient::register(&addr, "B").await;

    // A non-sentinel line is ignored.
    admin.send("not a command".to_string()).await.unwrap();
    // Scenario 6: both connected clients hear the shutdown.
    admin.send("EXIT".to_string()).await.unwrap();

    assert_eq!(a.recv().await, "server_exit");
    assert_eq!(b.recv().await, "server_exit");

    let result = server.await.expect("server task panicked");
    assert!(result.is_ok());
}
