// End-to-end prober-vs-acceptor runs over real sockets: TCP on an
// ephemeral loopback port, UNIX on a temp-dir path.

use connbench::net::{Acceptor, Endpoint};
use connbench::probe::{self, ProbeConfig};
use once_cell::sync::Lazy;
use serial_test::serial;
use std::path::PathBuf;
use tokio::task::JoinHandle;

static INIT: Lazy<()> = Lazy::new(|| {
    let _ = env_logger::builder().is_test(true).try_init();
});

fn scratch_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("connbench-it-{}-{}", name, std::process::id()))
}

/// Binds an acceptor on an ephemeral loopback port and runs it in the
/// background, returning the probe target.
async fn spawn_tcp_acceptor() -> (JoinHandle<()>, Endpoint) {
    let bind = Endpoint::Tcp {
        host: "127.0.0.1".to_string(),
        port: 0,
    };
    let acceptor = Acceptor::bind(&bind).await.expect("Failed to bind acceptor");
    let port = acceptor.local_addr().unwrap().port();
    let task = tokio::spawn(async move {
        acceptor.serve().await.expect("Acceptor crashed unexpectedly");
    });
    (
        task,
        Endpoint::Tcp {
            host: "127.0.0.1".to_string(),
            port,
        },
    )
}

fn read_result_lines(path: &PathBuf) -> Vec<i64> {
    std::fs::read_to_string(path)
        .expect("Failed to read output file")
        .lines()
        .map(|l| l.parse().expect("Line is not an integer"))
        .collect()
}

#[tokio::test]
#[serial]
async fn tcp_run_records_every_sample() {
    Lazy::force(&INIT);
    let (server_task, endpoint) = spawn_tcp_acceptor().await;

    let output = scratch_path("tcp");
    let config = ProbeConfig {
        endpoint,
        count: 5,
        output: output.clone(),
        abort_on_error: true,
    };
    let summary = probe::run(&config).await.expect("Probe run failed");

    let lines = read_result_lines(&output);
    assert_eq!(lines.len(), 5);
    // A handshake cannot complete in zero or negative monotonic time.
    assert!(lines.iter().all(|&ns| ns > 0));

    let summary = summary.expect("Expected a summary for a completed run");
    assert!(summary.mean > 0.0);
    assert!(summary.lower_bound <= summary.mean && summary.mean <= summary.upper_bound);

    server_task.abort();
    std::fs::remove_file(&output).unwrap();
}

#[tokio::test]
#[serial]
async fn unix_run_records_every_sample() {
    Lazy::force(&INIT);
    let socket_path = scratch_path("uds.sock");
    let _ = std::fs::remove_file(&socket_path);
    let endpoint = Endpoint::Unix {
        path: socket_path.clone(),
    };

    let acceptor = Acceptor::bind(&endpoint).await.expect("Failed to bind acceptor");
    let server_task = tokio::spawn(async move {
        acceptor.serve().await.expect("Acceptor crashed unexpectedly");
    });

    let output = scratch_path("unix");
    let config = ProbeConfig {
        endpoint,
        count: 3,
        output: output.clone(),
        abort_on_error: true,
    };
    let summary = probe::run(&config).await.expect("Probe run failed");

    let lines = read_result_lines(&output);
    assert_eq!(lines.len(), 3);
    assert!(lines.iter().all(|&ns| ns > 0));
    assert!(summary.is_some());

    server_task.abort();
    std::fs::remove_file(&output).unwrap();
    std::fs::remove_file(&socket_path).unwrap();
}

#[tokio::test]
#[serial]
async fn stale_unix_socket_file_is_replaced() {
    Lazy::force(&INIT);
    let socket_path = scratch_path("stale.sock");
    // Leave a regular file where the socket should go; bind must still
    // succeed.
    std::fs::write(&socket_path, b"stale").unwrap();
    let endpoint = Endpoint::Unix {
        path: socket_path.clone(),
    };

    let acceptor = Acceptor::bind(&endpoint).await.expect("Bind over stale file failed");
    let server_task = tokio::spawn(async move {
        acceptor.serve().await.expect("Acceptor crashed unexpectedly");
    });

    // The replaced path must be connectable.
    let stream = endpoint.connect().await.expect("Connect failed");
    drop(stream);

    server_task.abort();
    std::fs::remove_file(&socket_path).unwrap();
}

#[tokio::test]
#[serial]
async fn acceptor_drains_payload_bytes() {
    Lazy::force(&INIT);
    let (server_task, endpoint) = spawn_tcp_acceptor().await;

    // The prober never writes, but the acceptor contract is read-to-EOF;
    // a client that does send bytes must be drained and closed normally,
    // and the next connection must still be accepted.
    use tokio::io::AsyncWriteExt;
    let Endpoint::Tcp { host, port } = &endpoint else {
        unreachable!()
    };
    let mut stream = tokio::net::TcpStream::connect(format!("{}:{}", host, port))
        .await
        .unwrap();
    stream.write_all(&[7u8; 1024]).await.unwrap();
    drop(stream);

    let output = scratch_path("after-payload");
    let config = ProbeConfig {
        endpoint,
        count: 2,
        output: output.clone(),
        abort_on_error: true,
    };
    probe::run(&config).await.expect("Probe run failed");
    assert_eq!(read_result_lines(&output).len(), 2);

    server_task.abort();
    std::fs::remove_file(&output).unwrap();
}
