use crate::domain::model::Passenger;
use crate::domain::ports::SessionStore;
use crate::utils::error::{Result, SimError};

/// The logged-in identity, passed explicitly to whatever needs it.
///
/// Storage is touched only at three points: [`load`](Self::load) at startup,
/// [`login_success`](Self::login_success) and [`logout`](Self::logout).
pub struct SessionContext<S: SessionStore> {
    store: S,
    current: Option<Passenger>,
}

impl<S: SessionStore> SessionContext<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            current: None,
        }
    }

    pub async fn load(&mut self) -> Result<Option<&Passenger>> {
        self.current = self.store.load().await?;
        match &self.current {
            Some(p) => tracing::debug!("Restored session for passenger {}", p.passenger_id),
            None => tracing::debug!("No stored session"),
        }
        Ok(self.current.as_ref())
    }

    pub async fn login_success(&mut self, passenger: Passenger) -> Result<()> {
        self.store.save(&passenger).await?;
        tracing::info!("Logged in as {} <{}>", passenger.full_name, passenger.email);
        self.current = Some(passenger);
        Ok(())
    }

    pub async fn logout(&mut self) -> Result<()> {
        self.store.clear().await?;
        if let Some(p) = self.current.take() {
            tracing::info!("Logged out passenger {}", p.passenger_id);
        }
        Ok(())
    }

    pub fn current(&self) -> Option<&Passenger> {
        self.current.as_ref()
    }

    pub fn require(&self) -> Result<&Passenger> {
        self.current.as_ref().ok_or(SimError::NotLoggedIn)
    }
}
