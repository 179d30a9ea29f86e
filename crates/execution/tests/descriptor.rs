use periphery_execution::prelude::*;

#[test]
fn test_native_token_rendered_with_label() {
    let mut fixture = CompleteFixture::new().unwrap();
    let token0 = fixture.tokens[0];
    fixture.create_pool_wsei(token0).unwrap();

    let metadata = fixture.periphery.token_metadata(1).unwrap();
    assert_eq!(
        metadata.name,
        "Concentrated Liquidity - 0.3% - TEST/SEI - MIN<>MAX"
    );
    assert!(metadata.description.contains("TEST-SEI pool"));
    assert!(metadata.description.contains("\nSEI Address: "));
    assert!(metadata.description.contains("\nFee Tier: 0.3%"));
    assert!(metadata.description.ends_with("Token ID: 1"));
}

#[test]
fn test_plain_tokens_use_their_symbols() {
    let mut fixture = CompleteFixture::new().unwrap();
    let [token0, token1, _] = fixture.tokens;
    let pool = fixture.create_pool(token0, token1).unwrap();

    let metadata = fixture.periphery.token_metadata(1).unwrap();
    assert!(metadata.name.contains("TEST/TEST"));
    assert!(metadata.description.contains("TEST-TEST"));
    assert!(metadata.description.contains(&format!("Pool Address: {pool:?}")));
    assert!(metadata.description.contains(&format!("TEST Address: {token1:?}")));
}

#[test]
fn test_custom_native_label() {
    let mut fixture = CompleteFixture::with_native_label("FUNNYMONEY").unwrap();
    let token0 = fixture.tokens[0];
    fixture.create_pool_wsei(token0).unwrap();

    let metadata = fixture.periphery.token_metadata(1).unwrap();
    assert!(metadata.name.contains("TEST/FUNNYMONEY"));
    assert!(metadata.description.contains("TEST-FUNNYMONEY"));
    assert!(metadata.description.contains("\nFUNNYMONEY Address: "));
}

#[test]
fn test_token_uri_is_json() {
    let mut fixture = CompleteFixture::new().unwrap();
    let [token0, token1, _] = fixture.tokens;
    fixture.create_pool(token0, token1).unwrap();

    let uri = fixture.periphery.token_uri(1).unwrap();
    let parsed: TokenMetadata = serde_json::from_str(&uri).unwrap();
    assert_eq!(parsed, fixture.periphery.token_metadata(1).unwrap());
    assert_eq!(
        fixture.periphery.token_uri(2),
        Err(PeripheryError::InvalidTokenId)
    );
}

#[test]
fn test_ratio_priority() {
    let fixture = CompleteFixture::new().unwrap();
    let descriptor = fixture.periphery.descriptor();
    let wsei = fixture.wsei();
    let [token0, _, token2] = fixture.tokens;

    assert_eq!(descriptor.token_ratio_priority(wsei), WSEI_PRIORITY);
    assert_eq!(descriptor.token_ratio_priority(token0), 0);
    assert!(!descriptor.flip_ratio(token0, token2));
    assert!(descriptor.flip_ratio(
        periphery_domain::token::Address::from_low_u64_be(1),
        wsei
    ));
}
