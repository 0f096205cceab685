//! Endpoints that need no token.

use crate::client::Client;
use crate::error::ClientError;
use crate::types::{Statistics, StoreItem};

impl Client {
    pub fn statistics(&self) -> Result<Statistics, ClientError> {
        self.get("/public/statistics")?.into_result()
    }

    pub fn store_items(&self) -> Result<Vec<StoreItem>, ClientError> {
        self.get("/public/store/products")?.into_result()
    }
}
