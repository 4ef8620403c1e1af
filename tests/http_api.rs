use omics_simulator::infrastructure::observability::SimulatorServer;
use std::net::SocketAddr;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// 在随机端口上启动服务器，返回实际地址
async fn spawn_server() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("无法绑定端口");
    let addr = listener.local_addr().unwrap();
    let app = SimulatorServer::new(addr).router();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

async fn send(addr: SocketAddr, method: &str, path: &str, body: &str) -> String {
    let mut stream = TcpStream::connect(addr).await.expect("无法连接到服务器");
    let request = format!(
        "{} {} HTTP/1.1\r\nHost: {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        method,
        path,
        addr,
        body.len(),
        body
    );
    stream.write_all(request.as_bytes()).await.unwrap();

    let mut response = String::new();
    stream.read_to_string(&mut response).await.unwrap();
    response
}

const CONFIG: &str = r#"{"control_samples":10,"treatment_samples":10,"features":{"metabolomics":12},"seed":3}"#;

#[tokio::test]
async fn test_health_over_tcp() {
    let addr = spawn_server().await;
    let response = send(addr, "GET", "/health", "").await;
    assert!(response.starts_with("HTTP/1.1 200"));
    assert!(response.contains("\"status\":\"healthy\""));
}

#[tokio::test]
async fn test_download_metadata_over_tcp() {
    let addr = spawn_server().await;
    let response = send(addr, "POST", "/api/export/metadata.csv", CONFIG).await;

    assert!(response.starts_with("HTTP/1.1 200"));
    let lower = response.to_ascii_lowercase();
    assert!(lower.contains("content-type: text/csv"));
    assert!(lower.contains("content-disposition: attachment; filename=\"metadata.csv\""));
    assert!(response.contains(",sample_id,group,batch"));
    assert!(response.contains("19,Sample_20,Treatment,Batch2"));
}

#[tokio::test]
async fn test_simulate_bad_request_over_tcp() {
    let addr = spawn_server().await;
    let response = send(addr, "POST", "/api/simulate", r#"{"features":{}}"#).await;
    assert!(response.starts_with("HTTP/1.1 400"));
    assert!(response.contains("At least one omics layer"));
}

#[tokio::test]
async fn test_undeserializable_config_over_tcp() {
    let addr = spawn_server().await;
    for body in [r#"{"features":{"genomics":100}}"#, r#"{"control_samples":-5}"#] {
        let response = send(addr, "POST", "/api/simulate", body).await;
        assert!(response.starts_with("HTTP/1.1 400"), "{}", response);
        assert!(response.to_ascii_lowercase().contains("content-type: application/json"));
        assert!(response.contains("{\"error\":\"Invalid configuration"));
    }
}
