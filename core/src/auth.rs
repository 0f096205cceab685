//! Registration, login and credential endpoints.
//!
//! `login` and `recover_and_login`/`register_and_login` are the only calls
//! in this module that replace the session token.

use crate::client::Client;
use crate::envelope::Empty;
use crate::error::ClientError;
use crate::types::{
    ChangePasswordRequest, EmailCodeRequest, LoginRequest, RecoverAccountRequest, RegisterRequest, TokenResponse,
};

impl Client {
    /// Ask the service to email a registration code. Requires a captcha token.
    pub fn request_register_email_code(&self, email: &str, captcha_token: &str) -> Result<(), ClientError> {
        let req = EmailCodeRequest {
            email: email.to_string(),
            captcha_token: captcha_token.to_string(),
        };
        self.post::<_, Empty>("/public/register/emailCode", &req)?.into_result()?;
        Ok(())
    }

    pub fn register(&self, req: &RegisterRequest) -> Result<(), ClientError> {
        self.post::<_, Empty>("/public/register", req)?.into_result()?;
        Ok(())
    }

    /// Authenticate and keep the returned token for subsequent calls.
    pub fn login(&self, req: &LoginRequest) -> Result<String, ClientError> {
        let TokenResponse { token } = self.post::<_, TokenResponse>("/public/login", req)?.into_required()?;
        self.store_token(&token);
        Ok(token)
    }

    pub fn recover_account(&self, req: &RecoverAccountRequest) -> Result<(), ClientError> {
        self.post::<_, Empty>("/public/iforgot", req)?.into_result()?;
        Ok(())
    }

    /// Change the account password.
    ///
    /// The service resets the frp token and access key as a side effect. The
    /// session token held by this client is left as it was; call `login`
    /// again if the service rejects it afterwards.
    pub fn change_password(&self, req: &ChangePasswordRequest) -> Result<(), ClientError> {
        self.post::<_, Empty>("/auth/user/passwordReset", req)?.into_result()?;
        Ok(())
    }

    /// Register, then log in with the new account.
    pub fn register_and_login(&self, req: &RegisterRequest, captcha_token: &str) -> Result<String, ClientError> {
        self.register(req)?;
        self.login(&LoginRequest {
            username: req.username.clone(),
            password: req.password.clone(),
            captcha_token: captcha_token.to_string(),
        })
    }

    /// Reset the password of an account, then log in with the new password.
    pub fn recover_and_login(&self, req: &RecoverAccountRequest, captcha_token: &str) -> Result<String, ClientError> {
        self.recover_account(req)?;
        self.login(&LoginRequest {
            username: req.username.clone(),
            password: req.password.clone(),
            captcha_token: captcha_token.to_string(),
        })
    }
}
