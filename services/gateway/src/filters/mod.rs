//! Order admission filters
//!
//! Five independent stages run in a fixed order against every incoming
//! order: proof-of-work, base eligibility, signature, token support,
//! cutoff. The pipeline is strictly sequential and short-circuits on the
//! first rejection; the rejecting stage's reason reaches the submitter
//! verbatim.

mod base;
mod cutoff;
mod pow;
mod sign;
mod token;

pub use base::BaseFilter;
pub use cutoff::CutoffFilter;
pub use pow::{proof_of_work, PowFilter};
pub use sign::SignFilter;
pub use token::TokenFilter;

use crate::config::FiltersConfig;
use crate::error::{ConfigError, FilterError};
use async_trait::async_trait;
use std::sync::Arc;
use types::order::Order;
use types::provider::{AccountStateProvider, OrderViewer, TokenRegistry};

/// One admission stage.
#[async_trait]
pub trait Filter: Send + Sync {
    /// Stage name for logs.
    fn name(&self) -> &'static str;

    /// Accept or reject the order. Stages may canonicalize derived fields
    /// (the signature stage rewrites the hash) but never touch signed ones.
    async fn filter(&self, order: &mut Order) -> Result<(), FilterError>;
}

/// The ordered stage list applied to every incoming order.
///
/// Constructed once from configuration and passed by reference into the
/// admission entry point. The stage order is part of the observable
/// contract: clients rely on receiving the first applicable rejection.
pub struct ValidationPipeline {
    stages: Vec<Box<dyn Filter>>,
}

impl ValidationPipeline {
    /// Wire the standard five stages from configuration.
    pub fn from_config(
        config: &FiltersConfig,
        registry: Arc<dyn TokenRegistry>,
        accounts: Arc<dyn AccountStateProvider>,
        viewer: Arc<dyn OrderViewer>,
    ) -> Result<Self, ConfigError> {
        let pow = PowFilter::from_config(&config.pow)?;
        let base = BaseFilter::from_config(&config.base, registry.clone(), accounts)?;

        Ok(Self::new(vec![
            Box::new(pow),
            Box::new(base),
            Box::new(SignFilter),
            Box::new(TokenFilter::new(registry)),
            Box::new(CutoffFilter::new(viewer)),
        ]))
    }

    /// Build from an explicit stage list.
    pub fn new(stages: Vec<Box<dyn Filter>>) -> Self {
        Self { stages }
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Run the stages in order, stopping at the first rejection.
    pub async fn validate(&self, order: &mut Order) -> Result<(), FilterError> {
        for stage in &self.stages {
            if let Err(reason) = stage.filter(order).await {
                tracing::error!(stage = stage.name(), %reason, "order rejected");
                return Err(reason);
            }
        }
        Ok(())
    }
}
