mod login;
mod payout_flow;
mod place_order;

use std::boxed::Box;
use std::result::Result as DefaultResult;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use storefront::error::AppError;
use storefront::AbstractMailGateway;

// counts submissions instead of reaching any network
pub(crate) struct MockMailGateway {
    num_submitted: AtomicU32,
}

impl MockMailGateway {
    pub(crate) fn new() -> Arc<Box<dyn AbstractMailGateway>> {
        let obj: Box<dyn AbstractMailGateway> = Box::new(Self {
            num_submitted: AtomicU32::new(0),
        });
        Arc::new(obj)
    }
}

#[async_trait]
impl AbstractMailGateway for MockMailGateway {
    async fn submit(&self, _serial_body: Vec<u8>) -> DefaultResult<(), AppError> {
        let _prev = self.num_submitted.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}
