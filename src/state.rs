use std::sync::Arc;
use crate::rate_limit::ClientRegistry;
use crate::reasons::ReasonStore;
// app's shared state

pub struct AppState {
    pub reasons: ReasonStore,
    pub clients: Arc<ClientRegistry>, // shared with the background sweeper
    pub rate_limit: u32,              // surfaced in the 429 message
}
