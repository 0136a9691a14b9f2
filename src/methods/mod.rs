pub mod dex;
pub mod eth;
pub mod net;
pub mod params;
pub mod web3;
