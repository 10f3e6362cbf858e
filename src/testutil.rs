//! Local mock collaborators for worker and race tests

use axum::http::StatusCode;
use axum::Router;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;

pub const BRASILAPI_BODY: &str = r#"{"cep":"01153000","state":"SP","city":"São Paulo","neighborhood":"Barra Funda","street":"Rua Vitorino Carmilo","service":"open-cep"}"#;

pub const VIACEP_BODY: &str = r#"{"cep":"01153-000","logradouro":"Rua Vitorino Carmilo","complemento":"","bairro":"Barra Funda","localidade":"São Paulo","uf":"SP"}"#;

/// Serve `app` on an ephemeral localhost port
pub async fn serve(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

/// Collaborator answering every path with `status` and `body` after `delay`
pub async fn spawn_collaborator(delay: Duration, status: StatusCode, body: &'static str) -> SocketAddr {
    let app = Router::new().fallback(move || async move {
        tokio::time::sleep(delay).await;
        (status, body)
    });
    serve(app).await
}

/// Endpoint template pointing at a mock collaborator
pub fn endpoint(addr: SocketAddr) -> String {
    format!("http://{}/cep/{{cep}}", addr)
}

/// Address with nothing listening on it
pub async fn closed_port_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

/// HTTP client that ignores proxy settings from the environment
pub fn test_client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}
