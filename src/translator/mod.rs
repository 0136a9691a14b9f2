pub mod address;
pub mod certificate;
pub mod principal;

pub use address::{
    eth_address_to_principal, format_eth_address, hex_to_decimal, parse_hex_amount,
    principal_text_to_eth_address,
};
pub use certificate::decode_certificate_height;
pub use principal::Principal;
