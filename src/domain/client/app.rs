use std::sync::Arc;

use crate::domain::client::outbound::{ControlPort, InitPort, QueryPort, TitlePort};

/// Entrance to the domain logic, providing ports for external adapters.
pub struct ApplicationCore {
    pub init: Arc<dyn InitPort>,
    pub control: Arc<dyn ControlPort>,
    pub query: Arc<dyn QueryPort>,
    pub title: Arc<dyn TitlePort>,
}

impl ApplicationCore {
    /// Create and initialize a new [`ApplicationCore`] by injecting external
    /// repositories and adapters.
    pub fn setup(
        init: Arc<dyn InitPort>,
        control: Arc<dyn ControlPort>,
        query: Arc<dyn QueryPort>,
        title: Arc<dyn TitlePort>,
    ) -> ApplicationCore {
        Self {
            init,
            control,
            query,
            title,
        }
    }
}
