use relay_codec::CodecError;
use relay_dispatch::DispatchError;
use relay_envelope::{EnvelopeError, KeyError};
use relay_types::{ActionError, Address, QueryIdError};
use thiserror::Error;

use crate::config::ConfigError;
use crate::state::StateError;

pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("key error: {0}")]
    Key(#[from] KeyError),

    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("envelope error: {0}")]
    Envelope(#[from] EnvelopeError),

    #[error("dispatch error: {0}")]
    Dispatch(#[from] DispatchError),

    #[error("invalid action: {0}")]
    Action(#[from] ActionError),

    #[error("query id error: {0}")]
    QueryId(#[from] QueryIdError),

    #[error("state error: {0}")]
    State(#[from] StateError),

    #[error("{address} is not a {role} of this multisig")]
    NotAuthorized { address: Address, role: &'static str },

    #[error("wallet carries at most {limit} transfers, got {count}")]
    TooManyTransfers { count: usize, limit: usize },

    #[error("{kind} actions cannot be sent from a seqno wallet")]
    UnsupportedAction { kind: &'static str },
}
