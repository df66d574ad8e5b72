use std::sync::Arc;
use x402::{Facilitator, PaymentRequirements, RandomnessOracle};

use crate::config::SellerConfig;
use crate::routes::RANDOM_WORD_PATH;

/// Shared application state
pub struct AppState<F, O> {
    pub config: Arc<SellerConfig>,
    /// Requirement for the paid endpoint, fixed at startup
    pub requirements: Arc<PaymentRequirements>,
    pub facilitator: Arc<F>,
    pub oracle: Arc<O>,
}

impl<F, O> Clone for AppState<F, O> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            requirements: self.requirements.clone(),
            facilitator: self.facilitator.clone(),
            oracle: self.oracle.clone(),
        }
    }
}

impl<F: Facilitator, O: RandomnessOracle> AppState<F, O> {
    pub fn new(config: SellerConfig, facilitator: F, oracle: O) -> Self {
        let requirements = config.payment_requirements(RANDOM_WORD_PATH);
        Self {
            config: Arc::new(config),
            requirements: Arc::new(requirements),
            facilitator: Arc::new(facilitator),
            oracle: Arc::new(oracle),
        }
    }
}
