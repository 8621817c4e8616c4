//! Minimal ABI codec for the tile contract.
//!
//! Every argument is a `uint256` and every return value is a sequence of
//! static 32-byte words, so no dynamic-type encoding is needed.

use alloy_primitives::{Address, B256, Bytes, U256, keccak256};

use crate::error::ChainError;
use crate::model::{Listing, TileId};

pub const OWNER_OF_IF_MINTED: &str = "ownerOfIfMinted(uint256)";
pub const GRID_SIZE: &str = "GRID_SIZE()";
pub const LISTINGS: &str = "listings(uint256)";
pub const CLAIM: &str = "claim(uint256)";
pub const LIST_FOR_SALE: &str = "listForSale(uint256,uint256)";
pub const CANCEL_LISTING: &str = "cancelListing(uint256)";
pub const BUY: &str = "buy(uint256)";
pub const TRANSFER_EVENT: &str = "Transfer(address,address,uint256)";

const WORD: usize = 32;

pub fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

pub fn event_topic(signature: &str) -> B256 {
    keccak256(signature.as_bytes())
}

pub fn encode_call(signature: &str, args: &[U256]) -> Bytes {
    let mut data = Vec::with_capacity(4 + WORD * args.len());
    data.extend_from_slice(&selector(signature));
    for arg in args {
        data.extend_from_slice(&arg.to_be_bytes::<WORD>());
    }
    data.into()
}

pub fn tile_arg(tile: TileId) -> U256 {
    U256::from(tile)
}

fn word(data: &[u8], index: usize) -> Result<&[u8], ChainError> {
    data.get(index * WORD..(index + 1) * WORD).ok_or_else(|| {
        ChainError::Decode(format!(
            "return data has {} bytes, need word {}",
            data.len(),
            index
        ))
    })
}

pub fn decode_uint(data: &[u8], index: usize) -> Result<U256, ChainError> {
    Ok(U256::from_be_slice(word(data, index)?))
}

pub fn decode_address(data: &[u8], index: usize) -> Result<Address, ChainError> {
    Ok(Address::from_word(B256::from_slice(word(data, index)?)))
}

/// `listings(uint256)` returns `(address seller, uint256 price)`.
pub fn decode_listing(data: &[u8]) -> Result<Listing, ChainError> {
    Ok(Listing {
        seller: decode_address(data, 0)?,
        price_wei: decode_uint(data, 1)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::hex;

    #[test]
    fn well_known_selectors() {
        assert_eq!(selector("transfer(address,uint256)"), hex!("a9059cbb"));
        assert_eq!(selector("ownerOf(uint256)"), hex!("6352211e"));
        assert_eq!(
            event_topic(TRANSFER_EVENT),
            B256::from(hex!(
                "ddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef"
            ))
        );
    }

    #[test]
    fn call_data_is_selector_then_words() {
        let data = encode_call(LIST_FOR_SALE, &[tile_arg(34), U256::from(1000u64)]);
        assert_eq!(data.len(), 4 + 64);
        assert_eq!(&data[..4], &selector(LIST_FOR_SALE));
        assert_eq!(data[4 + 31], 34);
        assert_eq!(decode_uint(&data[4..], 1).unwrap(), U256::from(1000u64));
    }

    #[test]
    fn listing_decodes_seller_and_price() {
        let seller = Address::repeat_byte(0x42);
        let mut data = Vec::new();
        data.extend_from_slice(seller.into_word().as_slice());
        data.extend_from_slice(&U256::from(7u64).to_be_bytes::<32>());
        let listing = decode_listing(&data).unwrap();
        assert_eq!(listing.seller, seller);
        assert_eq!(listing.price_wei, U256::from(7u64));
        assert!(listing.is_active());
    }

    #[test]
    fn short_return_data_is_a_decode_error() {
        assert!(matches!(
            decode_listing(&[0u8; 40]),
            Err(ChainError::Decode(_))
        ));
    }
}
