//! Account endpoints for the logged-in user.

use crate::client::Client;
use crate::envelope::Empty;
use crate::error::ClientError;
use crate::types::{
    CaptchaRequest, LogQuery, NewTokenResponse, OperationLogList, OperationLogPage, TokenResponse, UserGroup,
    UserGroupsResponse, UserInfo, UserLogStats,
};

impl Client {
    pub fn user_info(&self) -> Result<UserInfo, ClientError> {
        self.get("/auth/user/info")?.into_result()
    }

    /// Daily sign-in.
    pub fn sign(&self, captcha_token: &str) -> Result<(), ClientError> {
        let req = CaptchaRequest {
            captcha_token: captcha_token.to_string(),
        };
        self.post::<_, Empty>("/auth/user/sign", &req)?.into_result()?;
        Ok(())
    }

    /// The token frpc authenticates with. Distinct from the session token.
    pub fn frp_token(&self) -> Result<String, ClientError> {
        let TokenResponse { token } = self.get::<TokenResponse>("/auth/user/frpToken")?.into_required()?;
        Ok(token)
    }

    pub fn user_groups(&self) -> Result<Vec<UserGroup>, ClientError> {
        let resp = self.get::<UserGroupsResponse>("/auth/user/groups")?.into_result()?;
        Ok(resp.groups)
    }

    /// Reset the access key. The service issues a new token, which replaces
    /// the session token on this client.
    pub fn reset_access_key(&self, captcha_token: &str) -> Result<String, ClientError> {
        let req = CaptchaRequest {
            captcha_token: captcha_token.to_string(),
        };
        let NewTokenResponse { new_token } =
            self.post::<_, NewTokenResponse>("/auth/user/tokenReset", &req)?.into_required()?;
        self.store_token(&new_token);
        Ok(new_token)
    }

    pub fn operation_logs(&self, query: &LogQuery) -> Result<OperationLogList, ClientError> {
        let path = format!("/auth/operationLog/list?{}", query.to_query());
        let page = self.get::<OperationLogPage>(&path)?.into_result()?;
        Ok(page.data)
    }

    pub fn operation_log_stats(&self) -> Result<UserLogStats, ClientError> {
        self.get("/auth/operationLog/stats")?.into_result()
    }
}
