use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::cashier::Cashier;
use crate::config::CashierConfig;
use crate::error::CashierError;
use crate::logging::Logger;
use crate::model::HostContext;
use crate::vendor::Vendor;

/// Assembles a [`Cashier`].
///
/// A vendor is mandatory and its absence is reported by [`build`](Self::build), not at
/// first use. The optional logger is installed on the vendor before the cashier
/// takes ownership of it.
///
/// ```rust,ignore
/// let cashier = Cashier::builder(HostContext::new("com.example.game")?)
///     .vendor(my_vendor)
///     .logger(Arc::new(TracingLogger::default()))
///     .init_timeout(Duration::from_secs(5))
///     .build()?;
/// ```
pub struct CashierBuilder {
    host: HostContext,
    vendor: Option<Box<dyn Vendor>>,
    logger: Option<Arc<dyn Logger>>,
    config: CashierConfig,
}

impl CashierBuilder {
    pub fn new(host: HostContext) -> Self {
        Self {
            host,
            vendor: None,
            logger: None,
            config: CashierConfig::default(),
        }
    }

    pub fn vendor(mut self, vendor: impl Vendor) -> Self {
        self.vendor = Some(Box::new(vendor));
        self
    }

    pub fn logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Replaces the whole configuration. Apply before the individual overrides.
    pub fn config(mut self, config: CashierConfig) -> Self {
        self.config = config;
        self
    }

    pub fn init_timeout(mut self, timeout: Duration) -> Self {
        self.config.init_timeout = timeout;
        self
    }

    /// # Errors
    /// - [`CashierError::VendorNotSet`] when no vendor was supplied.
    /// - [`CashierError::InvalidArgument`] when the configuration is unusable.
    pub fn build(self) -> Result<Cashier, CashierError> {
        let mut vendor = self.vendor.ok_or(CashierError::VendorNotSet)?;
        self.config.validate()?;
        if let Some(logger) = self.logger {
            vendor.set_logger(logger);
        }

        info!(vendor = vendor.id(), app_id = self.host.app_id(), "Cashier built");
        Ok(Cashier::new(self.host, vendor, self.config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::TracingLogger;
    use crate::mock::MockVendor;

    fn host() -> HostContext {
        HostContext::new("com.example.game").unwrap()
    }

    #[test]
    fn build_without_vendor_fails() {
        let result = CashierBuilder::new(host()).build();
        assert!(matches!(result, Err(CashierError::VendorNotSet)));
    }

    #[test]
    fn logger_is_installed_on_vendor_before_build() {
        let mock = MockVendor::new();
        let cashier = CashierBuilder::new(host())
            .vendor(mock.clone())
            .logger(Arc::new(TracingLogger::default()))
            .build()
            .unwrap();

        assert!(mock.has_logger());
        assert_eq!(cashier.vendor_id(), "mock");
    }

    #[test]
    fn zero_router_buffer_is_rejected() {
        let config = CashierConfig {
            router_buffer: 0,
            ..CashierConfig::default()
        };
        let result = CashierBuilder::new(host())
            .vendor(MockVendor::new())
            .config(config)
            .build();

        assert!(matches!(result, Err(CashierError::InvalidArgument(_))));
    }

    #[test]
    fn overrides_apply_on_top_of_config() {
        let config = CashierConfig {
            router_buffer: 4,
            ..CashierConfig::default()
        };
        let cashier = CashierBuilder::new(host())
            .vendor(MockVendor::new())
            .config(config)
            .init_timeout(Duration::from_millis(50))
            .build()
            .unwrap();

        assert_eq!(cashier.config().router_buffer, 4);
        assert_eq!(cashier.config().init_timeout, Duration::from_millis(50));
    }
}
