use std::sync::Arc;

use sift_config::Config;
use sift_service::SiftService;

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<SiftService>,
}
impl AppState {
	pub fn new(config: Config) -> color_eyre::Result<Self> {
		Ok(Self::from_service(SiftService::new(config)?))
	}

	pub fn from_service(service: SiftService) -> Self {
		Self { service: Arc::new(service) }
	}

	/// Inbound bearer token, if the deployment requires one.
	pub fn api_auth_token(&self) -> Option<&str> {
		self.service.cfg.security.api_auth_token.as_deref()
	}

	pub fn expose_upstream_detail(&self) -> bool {
		self.service.cfg.security.expose_upstream_detail
	}
}
