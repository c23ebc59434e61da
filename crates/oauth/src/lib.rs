pub mod authorize;
pub mod clock;
pub mod exchange;
pub mod state;
pub mod types;

pub use authorize::authorize_url;
pub use clock::{Clock, ManualClock, ProcessClock};
pub use exchange::{ExchangeError, TokenExchangeClient};
pub use state::{STATE_TTL, StateCheck, StateError, StateToken, StateValidator};
pub use types::AccessToken;
