use std::sync::Arc;

use crate::config::Config;
use crate::reset::ResetService;

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub config: Config,
    pub reset: ResetService,
}
