//! Client state shared by every command.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use cartwheel_client::models::BearerToken;
use cartwheel_client::{
    CartStore, Checkout, ClientConfig, HttpApiClient, MirroredStore, SessionStore,
};
use tracing::{debug, info};

use crate::commands::CliError;

/// Backend client plus hydrated session and cart stores.
pub struct App {
    pub api: Arc<HttpApiClient>,
    pub storage: MirroredStore,
    pub session: SessionStore,
    pub cart: CartStore,
}

impl App {
    /// Build the stores and restore their persisted state.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub async fn load(mut config: ClientConfig) -> Result<Self, CliError> {
        if config.browser_state_dir.is_none() {
            config.browser_state_dir = Some(browser_dir_for(&config.device_state_dir));
        }

        let api = Arc::new(HttpApiClient::new(&config)?);
        let storage = MirroredStore::from_config(&config);
        let session = SessionStore::new(api.clone(), storage.clone(), config.refresh_policy);
        let cart = CartStore::new(storage.clone());

        info!(api = %config.api_base_url, "Restoring session and cart");
        tokio::join!(session.hydrate(), cart.hydrate());
        debug!(
            loading = session.is_loading(),
            signed_in = session.is_authenticated(),
            cart_lines = cart.lines().len(),
            "Client state ready"
        );

        Ok(Self {
            api,
            storage,
            session,
            cart,
        })
    }

    /// Token of the signed-in session.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::NotSignedIn`] without a session.
    pub fn token(&self) -> Result<BearerToken, CliError> {
        self.session.token().ok_or(CliError::NotSignedIn)
    }

    /// Token of a signed-in admin.
    ///
    /// # Errors
    ///
    /// Returns an error without a session or for a non-admin account.
    pub fn admin_token(&self) -> Result<BearerToken, CliError> {
        let token = self.token()?;
        if !self.session.is_admin() {
            return Err(CliError::NotAdmin);
        }
        Ok(token)
    }

    pub fn checkout(&self) -> Checkout<'_> {
        Checkout::new(self.api.as_ref(), &self.session, &self.cart, &self.storage)
    }
}

/// Default browser mirror: the device directory's name with a `-browser`
/// suffix, or a `browser` child when the path has no final component.
fn browser_dir_for(device_dir: &Path) -> PathBuf {
    match device_dir.file_name() {
        Some(name) => {
            let mut suffixed = name.to_os_string();
            suffixed.push("-browser");
            device_dir.with_file_name(suffixed)
        }
        None => device_dir.join("browser"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_browser_dir_is_suffixed_device_dir() {
        assert_eq!(
            browser_dir_for(Path::new(".cartwheel/device")),
            PathBuf::from(".cartwheel/device-browser")
        );
        assert_eq!(
            browser_dir_for(Path::new("/home/u/state")),
            PathBuf::from("/home/u/state-browser")
        );
        assert_eq!(browser_dir_for(Path::new("/")), PathBuf::from("/browser"));
    }
}
