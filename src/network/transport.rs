use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::handshake::client::Request;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::http::header::COOKIE;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use url::Url;

use super::error::ClientError;

pub type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Where the chat server lives and how to present ourselves to it.
#[derive(Debug, Clone)]
pub struct ServerEndpoint {
    pub base_url: Url,
    pub session_cookie: Option<String>,
}

impl ServerEndpoint {
    pub fn new(base_url: Url, session_cookie: Option<String>) -> Self {
        Self {
            base_url,
            session_cookie,
        }
    }

    /// `http(s)://host/...` becomes `ws(s)://host/socket.io/?EIO=4&transport=websocket`.
    pub fn socket_url(&self) -> Result<Url, ClientError> {
        let scheme = match self.base_url.scheme() {
            "http" | "ws" => "ws",
            "https" | "wss" => "wss",
            other => return Err(ClientError::UnsupportedScheme(other.to_string())),
        };

        let mut url = self.base_url.join("/socket.io/")?;
        url.set_scheme(scheme)
            .map_err(|()| ClientError::UnsupportedScheme(scheme.to_string()))?;
        url.set_query(Some("EIO=4&transport=websocket"));
        Ok(url)
    }

    /// Absolute URL for an HTTP API path.
    pub fn api_url(&self, path: &str) -> Result<Url, ClientError> {
        Ok(self.base_url.join(path)?)
    }

    pub fn socket_request(&self) -> Result<Request, ClientError> {
        let mut request = self.socket_url()?.as_str().into_client_request()?;
        if let Some(cookie) = &self.session_cookie {
            request
                .headers_mut()
                .insert(COOKIE, HeaderValue::from_str(cookie)?);
        }
        Ok(request)
    }
}

pub async fn connect(endpoint: &ServerEndpoint) -> Result<Socket, ClientError> {
    let request = endpoint.socket_request()?;
    log::info!("Connecting to {}", request.uri());
    let (socket, response) = tokio_tungstenite::connect_async(request).await?;
    log::debug!("WebSocket upgrade status: {}", response.status());
    Ok(socket)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoint(url: &str) -> ServerEndpoint {
        ServerEndpoint::new(Url::parse(url).unwrap(), None)
    }

    #[test]
    fn socket_url_swaps_scheme_and_adds_query() {
        assert_eq!(
            endpoint("http://127.0.0.1:5000").socket_url().unwrap().as_str(),
            "ws://127.0.0.1:5000/socket.io/?EIO=4&transport=websocket"
        );
        assert_eq!(
            endpoint("https://chat.example.com/app/").socket_url().unwrap().as_str(),
            "wss://chat.example.com/socket.io/?EIO=4&transport=websocket"
        );
    }

    #[test]
    fn rejects_non_http_servers() {
        assert!(matches!(
            endpoint("ftp://example.com").socket_url(),
            Err(ClientError::UnsupportedScheme(_))
        ));
    }

    #[test]
    fn api_url_joins_paths() {
        assert_eq!(
            endpoint("http://localhost:5000").api_url("/messages/9").unwrap().as_str(),
            "http://localhost:5000/messages/9"
        );
    }

    #[test]
    fn socket_request_carries_cookie() {
        let endpoint = ServerEndpoint::new(
            Url::parse("http://localhost:5000").unwrap(),
            Some("session=abc".into()),
        );
        let request = endpoint.socket_request().unwrap();
        assert_eq!(request.headers().get(COOKIE).unwrap(), "session=abc");
        assert_eq!(
            request.uri().to_string(),
            "ws://localhost:5000/socket.io/?EIO=4&transport=websocket"
        );
    }

    #[test]
    fn bad_cookie_is_rejected() {
        let endpoint = ServerEndpoint::new(
            Url::parse("http://localhost:5000").unwrap(),
            Some("bad\ncookie".into()),
        );
        assert!(matches!(
            endpoint.socket_request(),
            Err(ClientError::InvalidHeader(_))
        ));
    }
}
