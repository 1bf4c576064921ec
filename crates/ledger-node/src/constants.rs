pub(crate) const MSG_BLOCK_MINED: &str = "Block mined";
pub(crate) const MSG_BLOCK_ADDED: &str = "Block added";
pub(crate) const MSG_CHAIN_UPDATED: &str = "Chain updated";
pub(crate) const MSG_NOT_BEHIND: &str = "Chain is not behind";
pub(crate) const MSG_PEERS_ADDED: &str = "Peers added";
pub(crate) const MSG_PEERS_UPDATED: &str = "Peers updated";
