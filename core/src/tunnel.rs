//! Tunnel (proxy) endpoints.

use crate::client::Client;
use crate::envelope::Empty;
use crate::error::ClientError;
use crate::types::{
    ProxyIdRequest, ToggleTunnelRequest, Tunnel, TunnelConfig, TunnelConfigRequest, TunnelConfigsRequest,
    TunnelDefinition,
};

impl Client {
    pub fn tunnel_list(&self) -> Result<Vec<Tunnel>, ClientError> {
        self.get("/auth/proxy/list")?.into_result()
    }

    pub fn create_tunnel(&self, def: &TunnelDefinition) -> Result<(), ClientError> {
        self.post::<_, Empty>("/auth/proxy/create", def)?.into_result()?;
        Ok(())
    }

    /// Update an existing tunnel. Posts to `ClientConfig::tunnel_update_path`.
    pub fn update_tunnel(&self, def: &TunnelDefinition) -> Result<(), ClientError> {
        let path = self.config().tunnel_update_path.as_str();
        self.post::<_, Empty>(path, def)?.into_result()?;
        Ok(())
    }

    pub fn delete_tunnel(&self, proxy_id: i64) -> Result<(), ClientError> {
        self.post::<_, Empty>("/auth/proxy/delete", &ProxyIdRequest { proxy_id })?.into_result()?;
        Ok(())
    }

    /// Force a tunnel's frpc session offline.
    pub fn kick_tunnel(&self, proxy_id: i64) -> Result<(), ClientError> {
        self.post::<_, Empty>("/auth/proxy/kick", &ProxyIdRequest { proxy_id })?.into_result()?;
        Ok(())
    }

    pub fn toggle_tunnel(&self, proxy_id: i64, is_disabled: bool) -> Result<(), ClientError> {
        let req = ToggleTunnelRequest { proxy_id, is_disabled };
        self.post::<_, Empty>("/auth/proxy/toggle", &req)?.into_result()?;
        Ok(())
    }

    /// frpc configuration for one tunnel in `format` (e.g. `toml`, `ini`).
    pub fn tunnel_config(&self, proxy_id: i64, format: &str) -> Result<TunnelConfig, ClientError> {
        let req = TunnelConfigRequest {
            proxy_id,
            format: format.to_string(),
        };
        self.post("/auth/proxy/config", &req)?.into_result()
    }

    /// A single frpc configuration covering several tunnels.
    pub fn tunnel_configs(&self, proxy_ids: &[i64], format: &str) -> Result<TunnelConfig, ClientError> {
        let req = TunnelConfigsRequest {
            proxy_ids: proxy_ids.to_vec(),
            format: format.to_string(),
        };
        self.post("/auth/proxy/config/multiple", &req)?.into_result()
    }
}
