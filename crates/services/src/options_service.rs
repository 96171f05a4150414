use std::sync::Arc;

use backend::OptionsGateway;
use vocab_core::model::GameOptions;

use crate::error::OptionsServiceError;

/// Read/write facade over the settings collaborator.
///
/// Sessions never read these options ambiently; a configuration screen loads
/// them once and bakes the choices into an explicit drill config.
#[derive(Clone)]
pub struct GameOptionsService {
    gateway: Arc<dyn OptionsGateway>,
}

impl GameOptionsService {
    #[must_use]
    pub fn new(gateway: Arc<dyn OptionsGateway>) -> Self {
        Self { gateway }
    }

    /// Load the configured option sets.
    ///
    /// # Errors
    ///
    /// Returns `OptionsServiceError` on gateway failures.
    pub async fn load(&self) -> Result<GameOptions, OptionsServiceError> {
        Ok(self.gateway.game_options().await?)
    }

    /// Replace the configured option sets.
    ///
    /// # Errors
    ///
    /// Returns `OptionsServiceError` on gateway failures.
    pub async fn save(&self, options: &GameOptions) -> Result<GameOptions, OptionsServiceError> {
        self.gateway.save_game_options(options).await?;
        Ok(options.clone())
    }
}
