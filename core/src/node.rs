//! Node endpoints.

use crate::client::Client;
use crate::error::ClientError;
use crate::http::HttpMethod;
use crate::types::{Node, NodeConnection, NodeIdRequest, NodeStatus, NodeToken};

impl Client {
    pub fn node_list(&self) -> Result<Vec<Node>, ClientError> {
        self.get("/auth/node/list")?.into_result()
    }

    pub fn node_status(&self) -> Result<Vec<NodeStatus>, ClientError> {
        self.get("/auth/node/status")?.into_result()
    }

    /// Fetch the frpc credentials for one node.
    ///
    /// The service reads `nodeId` from a JSON body on a GET request.
    pub fn node_token(&self, node_id: i64) -> Result<NodeToken, ClientError> {
        let req = NodeIdRequest { node_id };
        self.execute(HttpMethod::Get, "/auth/node/secret", Some(&req))?
            .into_result()
    }

    /// Connection addresses of the nodes the user has tunnels on.
    pub fn node_connection_list(&self) -> Result<Vec<NodeConnection>, ClientError> {
        self.get("/auth/node/nameList")?.into_result()
    }
}

#[cfg(test)]
mod tests {
    use crate::error::ClientError;
    use crate::http::HttpMethod;
    use crate::testing::stub_client;

    const NODES: &str = r#"{"code":200,"message":"ok","data":[{"nodeId":1,"name":"hk-1"},{"nodeId":2,"name":"sh-2"}]}"#;

    #[test]
    fn node_token_sends_body_on_get() {
        let (client, stub) = stub_client();
        stub.push_json(200, r#"{"code":200,"message":"ok","data":{"token":"node-secret"}}"#);
        let token = client.node_token(42).unwrap();
        assert_eq!(token.get("token"), Some(&serde_json::Value::from("node-secret")));

        let req = stub.last_request();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "http://localhost:3000/auth/node/secret");
        assert_eq!(req.body.as_deref(), Some(r#"{"nodeId":42}"#));
        assert_eq!(req.header("content-type"), Some("application/json"));
    }

    #[test]
    fn node_list_is_idempotent() {
        let (client, stub) = stub_client();
        stub.push_json(200, NODES);
        stub.push_json(200, NODES);
        let first = client.node_list().unwrap();
        let second = client.node_list().unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
        assert_eq!(first[1].node_id, 2);
        assert_eq!(first[1].fields["name"], "sh-2");
        assert_eq!(stub.requests().len(), 2);
    }

    #[test]
    fn node_list_error_is_not_retried() {
        let (client, stub) = stub_client();
        stub.push_json(200, r#"{"code":401,"message":"token expired"}"#);
        stub.push_json(200, NODES);
        let err = client.node_list().unwrap_err();
        assert!(matches!(err, ClientError::Api { code: 401, .. }));
        assert_eq!(stub.requests().len(), 1);
    }

    #[test]
    fn node_status_and_connections_use_get() {
        let (client, stub) = stub_client();
        stub.push_json(200, r#"{"code":200,"message":"ok","data":[{"nodeId":1,"online":true}]}"#);
        stub.push_json(200, r#"{"code":200,"message":"ok","data":[]}"#);
        assert_eq!(client.node_status().unwrap().len(), 1);
        assert!(client.node_connection_list().unwrap().is_empty());
        let requests = stub.requests();
        assert_eq!(requests[0].url, "http://localhost:3000/auth/node/status");
        assert_eq!(requests[1].url, "http://localhost:3000/auth/node/nameList");
        assert!(requests.iter().all(|r| r.method == HttpMethod::Get && r.body.is_none()));
    }
}
